//! Text normalization
//!
//! Two policies live here:
//! - storage: every textual material field is trimmed and uppercased before
//!   it reaches the database
//! - search: filter input and record fields are compared after Unicode
//!   canonical decomposition with combining marks removed, lowercased

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a field for persistence (trim + Unicode uppercase)
///
/// # Examples
///
/// ```
/// use stockroom_common::text::normalize_field;
///
/// assert_eq!(normalize_field("  disjuntor 10a "), "DISJUNTOR 10A");
/// assert_eq!(normalize_field("elétrica"), "ELÉTRICA");
/// ```
pub fn normalize_field(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Fold text for accent- and case-insensitive comparison
///
/// # Examples
///
/// ```
/// use stockroom_common::text::fold_for_search;
///
/// assert_eq!(fold_for_search("ELÉTRICA"), "eletrica");
/// assert_eq!(fold_for_search("Refrigeração"), "refrigeracao");
/// ```
pub fn fold_for_search(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// True when `needle` occurs in `haystack` after folding both
///
/// An empty needle matches everything.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_for_search(haystack).contains(&fold_for_search(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_field_uppercases_and_trims() {
        assert_eq!(normalize_field("ele-001"), "ELE-001");
        assert_eq!(normalize_field("\tcabo flexível\n"), "CABO FLEXÍVEL");
        assert_eq!(normalize_field(""), "");
    }

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold_for_search("HIDRÁULICA"), "hidraulica");
        assert_eq!(fold_for_search("ELETRÔNICA"), "eletronica");
        assert_eq!(fold_for_search("Mobiliário"), "mobiliario");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("ELÉTRICA", "eletrica"));
        assert!(contains_folded("ELÉTRICA", "ELÉT"));
        assert!(contains_folded("ELE-001", "ele"));
        assert!(!contains_folded("HID-002", "ele"));
    }

    #[test]
    fn test_empty_needle_matches() {
        assert!(contains_folded("ANYTHING", ""));
        assert!(contains_folded("", ""));
    }
}
