//! Premium Quote - insurance premium quotes from carrier underwriting data
//!
//! This library provides:
//! - Underwriting dataset model and loaders (file, URL, inline JSON)
//! - Normalization of client inputs (health class, gender, state, modality)
//! - Quote engine: banded rate lookup, factor composition, modal conversion
//! - Auditable per-quote breakdowns, ranked cheapest first
//! - HTML/console rendering and parallel batch quoting

pub mod batch;
pub mod dataset;
pub mod defaults;
pub mod error;
pub mod normalize;
pub mod quote;
pub mod render;

// Re-export commonly used types
pub use batch::BatchQuoter;
pub use dataset::{Dataset, DatasetSource, RateTablePeriod};
pub use error::{LoadError, QuoteError, RenderError};
pub use normalize::Gender;
pub use quote::{Quote, QuoteBreakdown, QuoteEngine, QuoteRequest};
pub use render::{format_currency, render_quote_list, RenderOptions};
