//! Locale-aware count parsing
//!
//! Turns display strings such as `"1,234 views"`, `"3.5K"`, `"2만"` or
//! `"댓글 1.2천개"` into integers. Absence of a number is a valid "unknown"
//! state and yields 0; this function never fails.

use once_cell::sync::Lazy;
use regex::Regex;

static LABEL_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(views?|comments?|조회수|댓글)\s*").expect("label pattern is valid")
});

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d.]*").expect("number pattern is valid"));

/// Magnitude multiplier resolved from a count label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    TenThousand,
    Thousand,
    Million,
    Unit,
}

impl Magnitude {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::TenThousand => 10_000.0,
            Self::Thousand => 1_000.0,
            Self::Million => 1_000_000.0,
            Self::Unit => 1.0,
        }
    }

    /// Resolve against normalized text. Precedence is fixed:
    /// ten-thousand, then thousand, then million.
    pub fn detect(normalized: &str) -> Self {
        if has_standalone_man(normalized) {
            Self::TenThousand
        } else if normalized.contains('k') || normalized.contains('천') {
            Self::Thousand
        } else if normalized.contains('m') || normalized.contains("백만") {
            Self::Million
        } else {
            Self::Unit
        }
    }
}

// 만 on its own means ten-thousand; as the tail of 백만 it belongs to million.
fn has_standalone_man(text: &str) -> bool {
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c == '만' && prev != Some('백') {
            return true;
        }
        prev = Some(c);
    }
    false
}

/// Lowercase, drop thousands separators and strip label words
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace(',', "");
    LABEL_WORDS.replace_all(&lowered, "").into_owned()
}

/// Parse a free-text count into a non-negative integer
pub fn parse_count(text: &str) -> u64 {
    let normalized = normalize(text);

    let Some(found) = NUMBER.find(&normalized) else {
        return 0;
    };

    let Ok(value) = found.as_str().parse::<f64>() else {
        return 0;
    };

    let scaled = (value * Magnitude::detect(&normalized).multiplier()).floor();
    if scaled.is_finite() && scaled > 0.0 {
        // saturating float-to-int cast
        scaled as u64
    } else {
        0
    }
}
