//! Keyword history store
//!
//! Flat CSV file with header `keyword_text,last_used_time`. Every mutation
//! rewrites the whole file; the store is meant for a single local process.

#![allow(clippy::uninlined_format_args)]

use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::KeywordEntry;

#[derive(Error, Debug)]
pub enum KeywordStoreError {
    #[error("Keyword not found: {0}")]
    NotFound(String),

    #[error("Keyword file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyword file CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type KeywordStoreResult<T> = Result<T, KeywordStoreError>;

/// CSV-backed keyword history
#[derive(Debug, Clone)]
pub struct KeywordStore {
    path: PathBuf,
}

impl KeywordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows; a missing file is an empty store
    pub fn load_all(&self) -> KeywordStoreResult<Vec<KeywordEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let entries = reader
            .deserialize::<KeywordEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn save_all(&self, entries: &[KeywordEntry]) -> KeywordStoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        if entries.is_empty() {
            writer.write_record(["keyword_text", "last_used_time"])?;
        }
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Find an entry by exact text
    pub fn lookup(&self, keyword_text: &str) -> KeywordStoreResult<Option<KeywordEntry>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|entry| entry.keyword_text == keyword_text))
    }

    /// Return the existing entry's last-used time, or append a new never-used row
    pub fn check_and_add(&self, keyword_text: &str) -> KeywordStoreResult<(String, Option<String>)> {
        let mut entries = self.load_all()?;

        if let Some(existing) = entries.iter().find(|e| e.keyword_text == keyword_text) {
            info!(
                "Existing keyword: '{}' (last used: {})",
                keyword_text,
                existing.last_used_time.as_deref().unwrap_or("N/A")
            );
            return Ok((existing.keyword_text.clone(), existing.last_used_time.clone()));
        }

        info!("New keyword: '{}', adding to {:?}", keyword_text, self.path);
        entries.push(KeywordEntry::new(keyword_text));
        self.save_all(&entries)?;
        Ok((keyword_text.to_string(), None))
    }

    /// Stamp the keyword with the current UTC time, returning the timestamp
    pub fn touch(&self, keyword_text: &str) -> KeywordStoreResult<String> {
        let mut entries = self.load_all()?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);

        let Some(entry) = entries.iter_mut().find(|e| e.keyword_text == keyword_text) else {
            warn!("Keyword '{}' not found in {:?}", keyword_text, self.path);
            return Err(KeywordStoreError::NotFound(keyword_text.to_string()));
        };
        entry.last_used_time = Some(now.clone());

        self.save_all(&entries)?;
        info!("Updated last_used_time of '{}' to {}", keyword_text, now);
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, KeywordStore) {
        let dir = TempDir::new().unwrap();
        let store = KeywordStore::new(dir.path().join("data").join("keywords.csv"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.lookup("rust").unwrap(), None);
    }

    #[test]
    fn test_check_and_add_then_existing() {
        let (_dir, store) = store();

        assert_eq!(store.check_and_add("먹방").unwrap(), ("먹방".to_string(), None));
        assert_eq!(store.check_and_add("먹방").unwrap(), ("먹방".to_string(), None));
        assert_eq!(store.load_all().unwrap().len(), 1);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("keyword_text,last_used_time"));
    }

    #[test]
    fn test_touch_sets_timestamp() {
        let (_dir, store) = store();
        store.check_and_add("rust").unwrap();

        let stamped = store.touch("rust").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamped).is_ok());

        let (_, last_used) = store.check_and_add("rust").unwrap();
        assert_eq!(last_used, Some(stamped));
    }

    #[test]
    fn test_touch_unknown_keyword() {
        let (_dir, store) = store();
        store.check_and_add("known").unwrap();
        assert!(matches!(
            store.touch("unknown"),
            Err(KeywordStoreError::NotFound(k)) if k == "unknown"
        ));
    }

    #[test]
    fn test_reads_file_with_empty_column() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            "keyword_text,last_used_time\nalpha,\nbeta,2024-01-01T00:00:00+00:00\n",
        )
        .unwrap();

        let entries = store.load_all().unwrap();
        assert_eq!(entries[0].last_used_time, None);
        assert_eq!(entries[1].last_used_time.as_deref(), Some("2024-01-01T00:00:00+00:00"));
    }
}
