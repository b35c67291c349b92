//! Error types for dataset loading and quote calculation
//!
//! Two classes of failure exist. Input and shape errors (`QuoteError`) abort a
//! whole quote run; products that merely fail eligibility are skipped by the
//! engine and never surface here. Loader failures (`LoadError`) are reported
//! once to the caller with no retry.

use thiserror::Error;

/// Failure of engine construction or of a `calculate_quotes` call
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Dataset is absent, not a JSON object, or does not match the dataset shape
    #[error("underwriting data is invalid: {0}")]
    InvalidDataset(String),

    /// A numeric request field is NaN or infinite
    #[error("{field} must be a finite number")]
    NonFinite {
        field: &'static str,
        value: f64,
    },

    #[error("coverageAmount must be greater than zero (got {0})")]
    NonPositiveCoverage(f64),

    #[error("Unsupported gender \"{0}\". Expected: male, female")]
    UnsupportedGender(String),

    /// A matched rate band has no entry for a supported gender
    #[error("No rate available for gender \"{gender}\" within the selected band of {carrier} / {product}")]
    MissingGenderRate {
        gender: String,
        carrier: String,
        product: String,
    },

    #[error("Unsupported payment modality \"{0}\"")]
    UnsupportedModality(String),
}

/// Failure to obtain an underwriting dataset from its source
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot find underwriting file at {0}")]
    NotFound(String),

    #[error("failed to read underwriting data: {0}")]
    Io(#[from] std::io::Error),

    #[error("underwriting data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request for underwriting data failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote source answered with a non-success status
    #[error("Unable to load underwriting data: {status} {reason}")]
    Status {
        status: u16,
        reason: String,
    },

    #[error(transparent)]
    Dataset(#[from] QuoteError),
}

/// Failure to render a quote list
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("A render target is required to render quotes.")]
    MissingTarget,

    #[error("failed to write rendered quotes: {0}")]
    Io(#[from] std::io::Error),
}
