//! Versioned on-disk format for learned tables
//!
//! A save produces two sibling artifacts addressed by one base path:
//! `<base>.msgpack`, the binary snapshot that [`Snapshot::read`] loads back,
//! and `<base>.csv`, a human-readable export of the same entries. The csv
//! file is write-only; loading always goes through the binary snapshot.

use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

const VERSION: u32 = 1;

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(suffix);
    PathBuf::from(path)
}

/// Snapshot envelope holding every stored (state, action, value) entry
///
/// The version field lets a load reject snapshots written by an incompatible
/// release instead of misreading them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<S, A> {
    version: u32,
    entries: Vec<(S, A, f64)>,
}

impl<S, A> Snapshot<S, A> {
    pub fn new(entries: Vec<(S, A, f64)>) -> Self {
        Self {
            version: VERSION,
            entries,
        }
    }

    /// Consume the snapshot, yielding its entries
    pub fn into_entries(self) -> Vec<(S, A, f64)> {
        self.entries
    }
}

impl<S, A> Snapshot<S, A>
where
    S: Serialize + Debug,
    A: Serialize + Debug,
{
    /// Write both artifacts for this snapshot next to `base`
    pub fn write(&self, base: &Path) -> Result<()> {
        let binary = with_suffix(base, ".msgpack");
        let file = File::create(&binary).map_err(|source| Error::Io {
            operation: format!("create snapshot file {}", binary.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write(&mut writer, self)?;
        info!("wrote snapshot to {}", binary.display());

        let export = with_suffix(base, ".csv");
        self.write_csv(&export)?;
        info!("wrote csv export to {}", export.display());

        Ok(())
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["State-Action", "Value"])?;
        for (state, action, value) in &self.entries {
            writer.write_record([format!("{:?}", (state, action)), value.to_string()])?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush csv export {}", path.display()),
            source,
        })?;
        Ok(())
    }
}

impl<S, A> Snapshot<S, A>
where
    S: DeserializeOwned,
    A: DeserializeOwned,
{
    /// Read the binary snapshot stored at `<base>.msgpack`
    pub fn read(base: &Path) -> Result<Self> {
        let binary = with_suffix(base, ".msgpack");
        let file = File::open(&binary).map_err(|source| Error::Io {
            operation: format!("open snapshot file {}", binary.display()),
            source,
        })?;
        let snapshot: Self = rmp_serde::decode::from_read(BufReader::new(file))?;
        if snapshot.version != VERSION {
            return Err(Error::UnsupportedVersion {
                found: snapshot.version,
                expected: VERSION,
            });
        }
        info!("loaded snapshot from {}", binary.display());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use tempfile::TempDir;

    use super::*;

    fn entries() -> Vec<(String, String, f64)> {
        vec![
            ("s1".to_owned(), "left".to_owned(), 0.5),
            ("s1".to_owned(), "right".to_owned(), -0.25),
            ("s2".to_owned(), "left".to_owned(), 1.0),
        ]
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("table");

        Snapshot::new(entries()).write(&base).unwrap();
        let loaded: Snapshot<String, String> = Snapshot::read(&base).unwrap();

        assert_eq!(loaded.into_entries(), entries());
    }

    #[test]
    fn read_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nonexistent");

        let result: Result<Snapshot<String, String>> = Snapshot::read(&base);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn read_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("table");
        let mut file = File::create(with_suffix(&base, ".msgpack")).unwrap();
        file.write_all(b"not a snapshot").unwrap();

        let result: Result<Snapshot<String, String>> = Snapshot::read(&base);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn read_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("table");
        let snapshot = Snapshot {
            version: VERSION + 1,
            entries: entries(),
        };
        snapshot.write(&base).unwrap();

        let result: Result<Snapshot<String, String>> = Snapshot::read(&base);
        assert!(matches!(
            result,
            Err(Error::UnsupportedVersion { found, expected })
                if found == VERSION + 1 && expected == VERSION
        ));
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("table");
        Snapshot::new(entries()).write(&base).unwrap();

        let export = fs::read_to_string(with_suffix(&base, ".csv")).unwrap();
        let mut lines = export.lines();
        assert_eq!(lines.next(), Some("State-Action,Value"));
        assert_eq!(lines.clone().count(), entries().len());
        assert!(lines.any(|line| line.contains(r#"(""s1"", ""left"")"#) && line.contains("0.5")));
    }
}
