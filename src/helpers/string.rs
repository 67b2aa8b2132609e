//! Text helpers shared by cell coercion, prefix search and header matching.

use std::borrow::Cow;

/// Removes every whitespace character, including thousands separators such as "1 000".
/// Borrows the input when there is nothing to remove.
pub(crate) fn strip_whitespace(value: &str) -> Cow<'_, str> {
    if value.chars().any(char::is_whitespace) {
        Cow::Owned(value.chars().filter(|char| !char.is_whitespace()).collect())
    } else {
        Cow::Borrowed(value)
    }
}

/// Returns true if the string is empty or consists of whitespace only.
#[inline]
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lowercases each character on its own, without the context rules of
/// [`str::to_lowercase`] (a final sigma stays `σ`).
pub(crate) fn to_lowercase_chars(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive "starts with", ignoring leading whitespace of `text`.
/// The prefix must already be trimmed and lowercased with [`to_lowercase_chars`].
pub(crate) fn starts_with_ignore_case(text: &str, lowercase_prefix: &str) -> bool {
    let text = text.trim_start();
    if text.is_empty() {
        return false;
    }
    let mut chars = text.chars().flat_map(char::to_lowercase);
    lowercase_prefix
        .chars()
        .all(|expected| chars.next() == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_whitespace_borrows_clean_input() {
        assert!(matches!(strip_whitespace("1000.1"), Cow::Borrowed(_)));
        assert_eq!(strip_whitespace(" 1 000.1\t"), "1000.1");
        assert_eq!(strip_whitespace("1\u{a0}000"), "1000");
    }

    #[test]
    fn blank_strings() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn prefix_ignores_case_and_leading_spaces() {
        assert!(starts_with_ignore_case("  Table Name", "table"));
        assert!(starts_with_ignore_case("ИТОГО по счету", "итого"));
        assert!(starts_with_ignore_case("abc", ""));
        assert!(!starts_with_ignore_case("   ", ""));
        assert!(!starts_with_ignore_case("tab", "table"));
        assert!(!starts_with_ignore_case("x table", "table"));
        assert!(starts_with_ignore_case("ΟΔΟΣ report", &to_lowercase_chars("ΟΔΟΣ")));
    }

    #[test]
    fn lowercase_keeps_sigma_form() {
        assert_eq!(to_lowercase_chars("ΟΔΟΣ"), "οδοσ");
        assert_eq!(to_lowercase_chars("Table"), "table");
    }
}
