//! Client quote request and its validated, normalized form

use crate::defaults;
use crate::error::QuoteError;
use crate::normalize::{normalize_health_class, normalize_key, normalize_modality, normalize_state, Gender};
use serde::{Deserialize, Serialize};

/// Client profile and billing preferences for a quote run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub age: f64,

    pub coverage_amount: f64,

    /// Free-form; must normalize to male or female
    pub gender: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub health_class: Option<String>,

    #[serde(default)]
    pub nicotine_use: bool,

    #[serde(default)]
    pub modality: Option<String>,

    /// Only quote products of this normalized type
    #[serde(default)]
    pub product_type: Option<String>,

    /// Only quote products declaring exactly this term
    #[serde(default)]
    pub term_years: Option<u32>,

    #[serde(default)]
    pub link_url: Option<String>,

    #[serde(default)]
    pub button_text: Option<String>,
}

impl QuoteRequest {
    /// Request with the required fields and every optional field unset
    pub fn new(age: f64, coverage_amount: f64, gender: &str, state: &str) -> Self {
        Self {
            age,
            coverage_amount,
            gender: gender.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    /// Validate and normalize; fails before any product is examined
    pub fn resolve(&self) -> Result<ResolvedRequest, QuoteError> {
        let age = finite("age", self.age)?;
        let coverage_amount = finite("coverageAmount", self.coverage_amount)?;
        if coverage_amount <= 0.0 {
            return Err(QuoteError::NonPositiveCoverage(coverage_amount));
        }
        let gender = Gender::parse(&self.gender)?;

        let non_empty = |value: &Option<String>| value.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        Ok(ResolvedRequest {
            age,
            coverage_amount,
            gender,
            state: normalize_state(&self.state),
            health_class: normalize_health_class(
                self.health_class
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or(defaults::HEALTH_CLASS),
            ),
            nicotine_use: self.nicotine_use,
            modality: non_empty(&self.modality)
                .map(|m| normalize_modality(&m))
                .unwrap_or_else(|| defaults::MODALITY.to_string()),
            product_type: non_empty(&self.product_type).map(|t| normalize_key(&t)),
            term_years: self.term_years,
            link_url: non_empty(&self.link_url).unwrap_or_else(|| defaults::LINK_URL.to_string()),
            button_text: non_empty(&self.button_text)
                .unwrap_or_else(|| defaults::BUTTON_TEXT.to_string()),
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, QuoteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuoteError::NonFinite { field, value })
    }
}

/// Request after validation, with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub age: f64,
    pub coverage_amount: f64,
    pub gender: Gender,
    pub state: String,
    pub health_class: String,
    pub nicotine_use: bool,
    pub modality: String,
    pub product_type: Option<String>,
    pub term_years: Option<u32>,
    pub link_url: String,
    pub button_text: String,
}

impl ResolvedRequest {
    /// Nicotine factor lookup key
    pub fn nicotine_key(&self) -> &'static str {
        if self.nicotine_use {
            "true"
        } else {
            "false"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let resolved = QuoteRequest::new(45.0, 100_000.0, " Female ", "ca").resolve().unwrap();
        assert_eq!(resolved.gender, Gender::Female);
        assert_eq!(resolved.state, "CA");
        assert_eq!(resolved.health_class, "standard");
        assert_eq!(resolved.modality, "monthly");
        assert_eq!(resolved.product_type, None);
        assert_eq!(resolved.link_url, "#");
        assert_eq!(resolved.button_text, "Book now");
        assert_eq!(resolved.nicotine_key(), "false");
    }

    #[test]
    fn test_resolve_normalizes_fields() {
        let request = QuoteRequest {
            health_class: Some("Preferred Plus".into()),
            modality: Some("Semi-Annual".into()),
            product_type: Some(" Term ".into()),
            term_years: Some(20),
            nicotine_use: true,
            ..QuoteRequest::new(35.0, 250_000.0, "male", "TX")
        };
        let resolved = request.resolve().unwrap();
        assert_eq!(resolved.health_class, "preferred_plus");
        assert_eq!(resolved.modality, "semi_annual");
        assert_eq!(resolved.product_type.as_deref(), Some("term"));
        assert_eq!(resolved.term_years, Some(20));
        assert_eq!(resolved.nicotine_key(), "true");
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        assert!(matches!(
            QuoteRequest::new(f64::NAN, 1000.0, "male", "TX").resolve(),
            Err(QuoteError::NonFinite { field: "age", .. })
        ));
        assert!(matches!(
            QuoteRequest::new(40.0, f64::INFINITY, "male", "TX").resolve(),
            Err(QuoteError::NonFinite { field: "coverageAmount", .. })
        ));
        assert!(matches!(
            QuoteRequest::new(40.0, 0.0, "male", "TX").resolve(),
            Err(QuoteError::NonPositiveCoverage(_))
        ));
        assert!(matches!(
            QuoteRequest::new(40.0, -5.0, "male", "TX").resolve(),
            Err(QuoteError::NonPositiveCoverage(_))
        ));
        assert!(matches!(
            QuoteRequest::new(40.0, 1000.0, "alien", "TX").resolve(),
            Err(QuoteError::UnsupportedGender(_))
        ));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{"age": 78, "coverageAmount": 10000, "gender": "male", "state": "TX",
                "productType": "fe", "nicotineUse": false, "termYears": 10}"#,
        )
        .unwrap();
        assert_eq!(request.age, 78.0);
        assert_eq!(request.coverage_amount, 10_000.0);
        assert_eq!(request.product_type.as_deref(), Some("fe"));
        assert_eq!(request.term_years, Some(10));
    }
}
