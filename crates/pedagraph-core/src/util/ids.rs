//! Node identifier normalization.
//!
//! Graph extraction emits entity names wrapped in stray quotes and with
//! inconsistent casing (`"\"Logistic Regression\""`). Every node lookup goes
//! through [`normalize_id`] so that identifiers compare case-insensitively.

const QUOTES: &[char] = &['"', '\''];

/// Strip surrounding whitespace and quote characters, preserving case.
///
/// Used for text handed to the reasoning service.
pub fn clean_label(raw: &str) -> String {
    raw.trim().trim_matches(QUOTES).trim().to_string()
}

/// Canonical comparable form of a node identifier: surrounding quotes and
/// whitespace stripped, upper-cased.
///
/// # Examples
///
/// ```
/// use pedagraph_core::normalize_id;
///
/// assert_eq!(normalize_id("  \"logistic regression\" "), "LOGISTIC REGRESSION");
/// ```
pub fn normalize_id(raw: &str) -> String {
    clean_label(raw).to_uppercase()
}
