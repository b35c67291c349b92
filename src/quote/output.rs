//! Quote output structures and their derivation breakdown

use crate::dataset::{RateBand, RateTablePeriod};
use crate::normalize::Gender;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Round to cents, half away from zero
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Multipliers applied on top of `base_rate_per_unit * coverage_units`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedFactors {
    pub health: f64,
    pub nicotine: f64,
    pub state: f64,
    pub product: f64,
}

impl AppliedFactors {
    pub fn combined(&self) -> f64 {
        self.health * self.nicotine * self.state * self.product
    }
}

/// Every intermediate value behind a quote's premium
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    // Rating inputs
    pub base_rate_per_unit: f64,
    pub base_coverage_unit: f64,
    pub coverage_amount: f64,
    pub coverage_units: f64,
    pub age: f64,
    pub gender: Gender,
    pub rate_band: RateBand,
    pub health_class: String,
    pub nicotine_use: bool,
    pub applied_factors: AppliedFactors,

    // Period and modal conversion
    pub rate_table_period: RateTablePeriod,
    pub raw_period_premium: f64,
    pub modal_factors: BTreeMap<String, f64>,
    pub modality: String,
    pub modal_factor: f64,

    // Fees
    pub policy_fee_annual: f64,
    pub monthly_fee_portion: f64,

    // Monthly baseline and final
    pub monthly_premium_before_fees: f64,
    pub monthly_premium_after_fees: f64,
    /// Unrounded per-payment premium for the requested modality
    pub modal_premium: f64,
}

/// A priced product for one client request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub carrier: String,
    pub product: String,
    pub product_type: String,
    pub term_years: Option<u32>,
    pub coverage_amount: f64,
    /// Per-payment premium rounded to cents
    pub premium: f64,
    pub currency: String,
    pub currency_symbol: String,
    pub modality: String,
    pub link_url: String,
    pub button_text: String,
    pub breakdown: QuoteBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(119.9249), 119.92);
        assert_eq!(round_to_cents(0.375), 0.38);
        assert_eq!(round_to_cents(10.004), 10.0);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(-0.125), -0.13);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_combined_factors() {
        let factors = AppliedFactors { health: 1.2, nicotine: 1.5, state: 1.0, product: 0.9 };
        assert!((factors.combined() - 1.62).abs() < 1e-12);
    }
}
