//! Parsing error types
//!
//! Absent fields are never errors in this crate; they degrade to defaults.
//! What remains is construction-time failure: a selector or pattern that
//! does not compile.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid regex pattern error
    pub fn invalid_pattern(name: &str, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParsingError::invalid_selector("div[", "unexpected end");
        assert_eq!(err.to_string(), "Invalid CSS selector: div[ - unexpected end");

        let err = ParsingError::invalid_pattern("comment_id", "unclosed group");
        assert!(err.to_string().contains("comment_id"));
    }
}
