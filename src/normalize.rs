//! Canonical lookup keys for free-form request and dataset strings

use crate::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health class spellings accepted from clients and their canonical keys
const HEALTH_CLASS_ALIASES: &[(&str, &str)] = &[
    ("preferred plus", "preferred_plus"),
    ("preferred+", "preferred_plus"),
    ("preferred plus non-tobacco", "preferred_plus"),
    ("preferred", "preferred"),
    ("standard plus", "standard_plus"),
    ("standard+", "standard_plus"),
    ("standard", "standard"),
    ("table a", "table_a"),
    ("table b", "table_b"),
];

/// Trim, lowercase and collapse internal whitespace runs to a single space
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical health class key
///
/// Keeps only lowercase letters, `+`, `_` and spaces, then resolves the alias
/// table. Unknown classes fall back to the stripped key with spaces replaced by
/// underscores, so this never fails and already-canonical keys map to
/// themselves.
pub fn normalize_health_class(value: &str) -> String {
    let key: String = normalize_key(value)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || matches!(c, '+' | '_' | ' '))
        .collect();

    // Hyphenated aliases only match before stripping
    let unstripped = normalize_key(value);
    HEALTH_CLASS_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key || *alias == unstripped)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| key.replace(' ', "_"))
}

/// State codes are upper-cased with no alias table
pub fn normalize_state(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Canonical modality key (`"Semi-Annual"` and `"semiannual"` become `semi_annual`)
pub fn normalize_modality(value: &str) -> String {
    let key = normalize_key(value).replace(['-', ' '], "_");
    match key.as_str() {
        "semiannual" => "semi_annual".to_string(),
        _ => key,
    }
}

/// Gender supported by rate tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Rate-table key for this gender
    pub fn as_key(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Normalize and validate; anything other than male/female is a hard error
    pub fn parse(value: &str) -> Result<Self, QuoteError> {
        match normalize_key(value).as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(QuoteError::UnsupportedGender(value.to_string())),
        }
    }
}

impl FromStr for Gender {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::parse(s)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}
