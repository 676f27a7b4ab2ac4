// src/selector/dynamic_id.rs
//! Dynamic-ID detection
//!
//! Framework-generated ids (React `:r1:`, Google `_ngcontent`, hashes, counters)
//! change between renders and make useless selectors. This is a heuristic:
//! short generated ids slip through and long hand-written ids get rejected.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest id still considered hand-written
pub const MAX_STABLE_ID_LEN: usize = 20;

static LEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[_:]").expect("valid regex"));

static CAMEL_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]{2,}[a-z]+[A-Z]").expect("valid regex"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{3,}").expect("valid regex"));

static HASH_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-f0-9]{8,}$").expect("valid regex"));

/// Whether an id looks machine-generated
///
/// Empty ids count as dynamic.
pub fn is_dynamic_id(id: &str) -> bool {
    if id.is_empty() {
        return true;
    }

    id.chars().count() > MAX_STABLE_ID_LEN
        || LEADING_MARKER.is_match(id)
        || CAMEL_NOISE.is_match(id)
        || DIGIT_RUN.is_match(id)
        || HASH_LIKE.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_ids() {
        assert!(!is_dynamic_id("a"));
        assert!(!is_dynamic_id("submit-button"));
        assert!(!is_dynamic_id("login_form"));
        assert!(!is_dynamic_id("nav2"));
        assert!(!is_dynamic_id("step-12"));
    }

    #[test]
    fn test_empty_is_dynamic() {
        assert!(is_dynamic_id(""));
    }

    #[test]
    fn test_length_boundary() {
        // 20 characters, nothing else suspicious
        assert!(!is_dynamic_id("primary-navigation-x"));
        assert!(is_dynamic_id("primary-navigation-xy"));
        assert!(is_dynamic_id("ab12345678901234567890"));
    }

    #[test]
    fn test_leading_markers() {
        assert!(is_dynamic_id("_foo"));
        assert!(is_dynamic_id(":r1:"));
        assert!(!is_dynamic_id("foo_"));
    }

    #[test]
    fn test_camel_case_noise() {
        assert!(is_dynamic_id("xyKLmnoP"));
        assert!(is_dynamic_id("ABcD"));
        // ordinary camelCase has a single capital before the lowercase run
        assert!(!is_dynamic_id("searchInput"));
        assert!(!is_dynamic_id("mainNavBar"));
    }

    #[test]
    fn test_digit_runs() {
        assert!(is_dynamic_id("item123"));
        assert!(is_dynamic_id("submit-42892001"));
        assert!(!is_dynamic_id("item12"));
        assert!(!is_dynamic_id("a1b2c3"));
    }

    #[test]
    fn test_hash_shaped() {
        assert!(is_dynamic_id("deadbeef12"));
        assert!(is_dynamic_id("DEADBEEF"));
        assert!(!is_dynamic_id("deadbee"));
        assert!(!is_dynamic_id("cafe-babe"));
    }

    #[test]
    fn test_documented_false_positive() {
        // genuinely stable but long ids are rejected
        assert!(is_dynamic_id("checkout-shipping-address-form"));
    }

    #[test]
    fn test_documented_false_negative() {
        // short generated ids pass as stable
        assert!(!is_dynamic_id("x7k2"));
    }
}
