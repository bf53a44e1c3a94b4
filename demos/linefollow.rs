use qtab::ValueTable;
use rand::{rngs::StdRng, Rng, SeedableRng};

const NUM_EPISODES: u32 = 500;
const STEPS_PER_EPISODE: u32 = 100;

/// Minimal line-follower simulation: the state is the line's offset under
/// the sensor and the agent steers to keep it centered
struct LineFollow {
    offset: i8,
    rng: StdRng,
}

impl LineFollow {
    fn new() -> Self {
        Self {
            offset: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn reset(&mut self) -> i8 {
        self.offset = self.rng.gen_range(-2..=2);
        self.offset
    }

    fn step(&mut self, action: &str) -> (i8, f64) {
        let steer: i8 = match action {
            "left" => -1,
            "right" => 1,
            _ => 0,
        };
        let drift = self.rng.gen_range(-1i8..=1);
        self.offset = (self.offset + steer + drift).clamp(-2, 2);
        let reward = if self.offset == 0 {
            1.0
        } else {
            -f64::from(self.offset.abs())
        };
        (self.offset, reward)
    }
}

fn main() {
    let mut env = LineFollow::new();
    let mut table = ValueTable::new(vec!["left", "forward", "right"], 1.0, 0.2, 0.9);

    for episode in 0..NUM_EPISODES {
        let mut state = env.reset();
        let mut total = 0.0;
        for _ in 0..STEPS_PER_EPISODE {
            let action = table.choose(&state);
            let (next_state, reward) = env.step(action);
            table.learn(state, action, reward, &next_state);
            state = next_state;
            total += reward;
        }
        // anneal exploration toward mostly greedy behavior
        table.set_epsilon((table.epsilon() * 0.99).max(0.05));
        if episode % 100 == 0 {
            println!("episode {episode}: total reward {total}");
        }
    }

    table.save("linefollow_q").expect("failed to save table");
    println!(
        "saved {} entries to linefollow_q.msgpack / linefollow_q.csv",
        table.len()
    );
}
