//! Comment records and the per-snapshot extraction batch
//!
//! `ExtractionBatch` owns the dedup invariant: a record whose `id` was already
//! accepted is rejected, so no two records in a batch ever share an identity.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// One top-level comment extracted from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Stable identifier taken from the permalink `lc` parameter
    pub id: String,
    /// PII-masked author display text
    pub author: String,
    /// PII-masked comment body
    pub content: String,
    /// Raw like-count display text ("0" when the page shows none)
    pub likes: String,
}

/// Ordered, identity-unique comments from a single snapshot
#[derive(Debug, Clone, Default)]
pub struct ExtractionBatch {
    records: Vec<CommentRecord>,
    seen: HashSet<String>,
}

impl ExtractionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record unless its id is already present. Returns whether it was kept.
    pub fn push(&mut self, record: CommentRecord) -> bool {
        if self.seen.contains(&record.id) {
            return false;
        }
        self.seen.insert(record.id.clone());
        self.records.push(record);
        true
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommentRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<CommentRecord> {
        self.records
    }
}

impl FromIterator<CommentRecord> for ExtractionBatch {
    fn from_iter<I: IntoIterator<Item = CommentRecord>>(iter: I) -> Self {
        let mut batch = Self::new();
        for record in iter {
            batch.push(record);
        }
        batch
    }
}

impl<'a> IntoIterator for &'a ExtractionBatch {
    type Item = &'a CommentRecord;
    type IntoIter = std::slice::Iter<'a, CommentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl PartialEq for ExtractionBatch {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for ExtractionBatch {}

impl Serialize for ExtractionBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

impl<'de> Deserialize<'de> for ExtractionBatch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<CommentRecord>::deserialize(deserializer)?;
        Ok(records.into_iter().collect())
    }
}

/// Why a comment thread produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingCommentView,
    MissingPermalink,
    MissingCommentId,
    DuplicateId(String),
    MissingAuthor,
    MissingContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommentView => write!(f, "comment view element not found"),
            Self::MissingPermalink => write!(f, "permalink anchor missing or has no href"),
            Self::MissingCommentId => write!(f, "permalink carries no comment id"),
            Self::DuplicateId(id) => write!(f, "comment id {id} already emitted"),
            Self::MissingAuthor => write!(f, "author text not found"),
            Self::MissingContent => write!(f, "content text not found"),
        }
    }
}

/// Result of parsing one comment thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadOutcome {
    Parsed(CommentRecord),
    Skipped(SkipReason),
}

impl ThreadOutcome {
    pub fn into_record(self) -> Option<CommentRecord> {
        match self {
            Self::Parsed(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Parsed(_) => None,
            Self::Skipped(reason) => Some(reason),
        }
    }
}
