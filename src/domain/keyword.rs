use serde::{Deserialize, Serialize};

/// A row of the keyword-history file (`keyword_text,last_used_time`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword_text: String,
    /// UTC ISO-8601 timestamp, empty column when the keyword was never used
    #[serde(default, deserialize_with = "empty_as_none")]
    pub last_used_time: Option<String>,
}

impl KeywordEntry {
    pub fn new(keyword_text: impl Into<String>) -> Self {
        Self {
            keyword_text: keyword_text.into(),
            last_used_time: None,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
