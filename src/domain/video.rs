use serde::{Deserialize, Serialize};

/// Metadata derived once from a captured watch page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// ISO-8601 value passed through verbatim, empty when the page exposes none
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
    #[serde(rename = "viewCount")]
    pub view_count: u64,
    #[serde(rename = "commentCount")]
    pub comment_count: u64,
}

impl VideoMetadata {
    /// Whether the video is popular enough to be worth collecting comments from
    pub fn meets_thresholds(&self, min_views: u64, min_comments: u64) -> bool {
        self.view_count >= min_views && self.comment_count >= min_comments
    }
}

/// A single immutable capture of the rendered page markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSnapshot(String);

impl MarkupSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn html(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for MarkupSnapshot {
    fn from(html: String) -> Self {
        Self(html)
    }
}
