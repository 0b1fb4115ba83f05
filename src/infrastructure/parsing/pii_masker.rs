//! PII masking for extracted comment text
//!
//! Emails are replaced first, then phone numbers. Both passes are
//! leftmost-first and non-overlapping; the placeholders contain neither `@`
//! nor digits, so masking already-masked text changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::constants::extraction::{EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2,3}-\d{3,4}-\d{4}").expect("phone pattern is valid"));

/// Replace every email address and phone number with a fixed placeholder
pub fn mask(text: &str) -> String {
    let without_emails = EMAIL_RE.replace_all(text, EMAIL_PLACEHOLDER);
    PHONE_RE
        .replace_all(&without_emails, PHONE_PLACEHOLDER)
        .into_owned()
}

/// Whether the text still contains something `mask` would replace
pub fn contains_pii(text: &str) -> bool {
    EMAIL_RE.is_match(text) || PHONE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_masks_email() {
        assert_eq!(mask("a@b.com"), "[EMAIL_MASKED]");
        assert_eq!(
            mask("문의는 user.name+tag@example.co.kr 로 주세요"),
            "문의는 [EMAIL_MASKED] 로 주세요"
        );
    }

    #[test]
    fn test_masks_phone() {
        assert_eq!(mask("010-1234-5678"), "[PHONE_MASKED]");
        assert_eq!(mask("call 02-123-4567 now"), "call [PHONE_MASKED] now");
    }

    #[test]
    fn test_one_placeholder_per_match() {
        let masked = mask("x@y.io, z@w.org / 010-1111-2222 and 031-222-3333");
        assert_eq!(masked.matches(EMAIL_PLACEHOLDER).count(), 2);
        assert_eq!(masked.matches(PHONE_PLACEHOLDER).count(), 2);
        assert!(!contains_pii(&masked));
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "좋은 영상 감사합니다! 12:34 부분 최고";
        assert_eq!(mask(text), text);
        assert!(!contains_pii(text));
    }

    proptest! {
        #[test]
        fn prop_mask_is_idempotent(text in "[a-z0-9@. -]{0,40}") {
            let once = mask(&text);
            prop_assert_eq!(mask(&once), once);
        }

        #[test]
        fn prop_masked_phone_leaves_no_phone(
            a in "[0-9]{2,3}", b in "[0-9]{3,4}", c in "[0-9]{4}", prefix in "[a-z ]{0,10}"
        ) {
            let text = format!("{prefix}{a}-{b}-{c}");
            let masked = mask(&text);
            prop_assert!(!PHONE_RE.is_match(&masked));
            prop_assert_eq!(masked.matches(PHONE_PLACEHOLDER).count(), 1);
        }
    }
}
