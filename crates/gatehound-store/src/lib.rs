use gatehound_core::TagRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-file JSON persistence for the tag event log.
///
/// Every write replaces the entire file; every read parses the entire file.
/// There is no incremental append and no crash-atomicity: a crash between
/// load and save loses the in-flight write but leaves the prior file intact.
/// Callers are expected to serialize load-modify-save cycles themselves.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full log. A file that does not exist yet is an empty log.
    pub fn load(&self) -> Result<Vec<TagRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the full log, creating parent directories as needed.
    pub fn save(&self, records: &[TagRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Load, push, save. Returns the record as stored.
    pub fn append(&self, record: TagRecord) -> Result<TagRecord, StoreError> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }

    /// Replace the log with an empty one. Idempotent.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(tag: &str) -> TagRecord {
        TagRecord {
            string: tag.to_string(),
            timestamp: Some("Friday 10:00:00".to_string()),
            device: Some("GateA".to_string()),
        }
    }

    fn log_in(dir: &TempDir) -> EventLog {
        EventLog::new(dir.path().join("events.json"))
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let log = log_in(&dir);
        assert!(log.load().expect("load").is_empty());
    }

    #[test]
    fn append_persists_and_reloads() {
        let dir = TempDir::new().expect("tempdir");
        let log = log_in(&dir);

        log.append(record("112233445566778899")).expect("append");
        log.append(record("aabbccddeeff001122")).expect("append");

        let records = log.load().expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].string, "112233445566778899");
        assert_eq!(records[1].string, "aabbccddeeff001122");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().expect("tempdir");
        let log = EventLog::new(dir.path().join("nested").join("events.json"));
        log.append(record("112233445566778899")).expect("append");
        assert_eq!(log.load().expect("load").len(), 1);
    }

    #[test]
    fn clear_empties_and_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let log = log_in(&dir);

        log.append(record("112233445566778899")).expect("append");
        log.clear().expect("clear");
        assert!(log.load().expect("load").is_empty());

        log.clear().expect("clear again");
        assert!(log.load().expect("load").is_empty());
    }

    #[test]
    fn corrupt_file_surfaces_a_json_error() {
        let dir = TempDir::new().expect("tempdir");
        let log = log_in(&dir);
        fs::write(log.path(), "not json").expect("write");
        assert!(matches!(log.load(), Err(StoreError::Json(_))));
    }
}
