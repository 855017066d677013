//! crates/itinerary_planner_core/src/validation.rs
//!
//! Checks applied to free-text answers before the conversation advances.

use regex::Regex;
use std::sync::LazyLock;

pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 10;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone pattern is valid"));

/// Parses a trip length in whole days. Anything that is not an integer in
/// `1..=10` is rejected.
pub fn parse_duration(input: &str) -> Option<u32> {
    let days: i64 = input.trim().parse().ok()?;
    let days = u32::try_from(days).ok()?;
    (MIN_DURATION_DAYS..=MAX_DURATION_DAYS)
        .contains(&days)
        .then_some(days)
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input.trim())
}

/// E.164-style number: optional `+`, no leading zero, 2 to 15 digits.
pub fn is_valid_phone(input: &str) -> bool {
    PHONE_PATTERN.is_match(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accepts_every_day_count_in_range() {
        for days in 1..=10 {
            assert_eq!(parse_duration(&days.to_string()), Some(days));
        }
        assert_eq!(parse_duration(" 7 "), Some(7));
    }

    #[test]
    fn duration_rejects_out_of_range_and_non_integers() {
        for input in ["0", "11", "15", "-3", "2.5", "three", "", "3 days"] {
            assert_eq!(parse_duration(input), None, "input {input:?}");
        }
    }

    #[test]
    fn email_requires_at_and_dot() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana.example.com"));
        assert!(!is_valid_email("@."));
    }

    #[test]
    fn phone_follows_e164_shape() {
        assert!(is_valid_phone("+14155552671"));
        assert!(is_valid_phone("447911123456"));
        assert!(!is_valid_phone("+0123456"));
        assert!(!is_valid_phone("1"));
        assert!(!is_valid_phone("+1 415 555 2671"));
        assert!(!is_valid_phone("+1234567890123456"));
    }
}
