/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```
/// use qtab::assert_interval;
///
/// let epsilon = 0.1;
/// assert_interval!(epsilon, 0.0, 1.0);
/// ```
/// On failure this panics with the message
/// "Invalid value for \`epsilon\`. Must be in the interval \[0.0, 1.0\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}
