//! Quote engine: request validation, premium composition and modal conversion

mod engine;
mod modal;
mod output;
mod request;

pub use engine::QuoteEngine;
pub use modal::ModalFactors;
pub use output::{round_to_cents, AppliedFactors, Quote, QuoteBreakdown};
pub use request::{QuoteRequest, ResolvedRequest};
