//! Input rules shared by the signup, profile, and admin edit paths.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim and lower-case an email address for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

/// At least eight characters with an upper-case letter, a lower-case letter and a digit.
pub fn is_strong_password(s: &str) -> bool {
    s.chars().count() >= MIN_PASSWORD_LEN
        && s.chars().any(|c| c.is_ascii_uppercase())
        && s.chars().any(|c| c.is_ascii_lowercase())
        && s.chars().any(|c| c.is_ascii_digit())
}

/// Parse a date of birth sent as `YYYY-MM-DD` or a full RFC 3339 timestamp.
///
/// Anything else yields `None`; callers drop the field rather than fail.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Phone numbers arrive either pre-composed or split into country code and number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PhoneInput {
    Full(String),
    Split {
        #[serde(rename = "countryCode")]
        country_code: String,
        number: String,
    },
}

impl PhoneInput {
    /// The stored form: the full string as given, or the country code
    /// followed by the digits of the number. Empty parts yield `None`.
    pub fn compose(&self) -> Option<String> {
        match self {
            PhoneInput::Full(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            PhoneInput::Full(_) => None,
            PhoneInput::Split { country_code, number } => {
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                if country_code.trim().is_empty() || digits.is_empty() {
                    None
                } else {
                    Some(format!("{}{}", country_code.trim(), digits))
                }
            }
        }
    }
}
