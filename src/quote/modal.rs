//! Modal factors and conversion between rate-table periods and the monthly baseline
//!
//! Internally every modal factor is the per-payment multiple of one monthly
//! premium, so `monthly` is always exactly 1. Dataset values may be written
//! relative to any base (the engine defaults are relative to annual); the map
//! is normalized by dividing through by its own `monthly` entry.

use crate::dataset::RateTablePeriod;
use crate::defaults;
use crate::error::QuoteError;
use crate::normalize::normalize_modality;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

const MONTHLY: &str = "monthly";
const ANNUAL: &str = "annual";

fn is_usable(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}

/// Normalized modality → factor map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModalFactors(BTreeMap<String, f64>);

impl ModalFactors {
    /// Engine defaults, overlaid by each map in `overlays` in order (later wins), then normalized
    pub fn resolve<'a, I>(overlays: I) -> Self
    where
        I: IntoIterator<Item = &'a BTreeMap<String, f64>>,
    {
        Self::normalized(Self::merge(overlays))
    }

    /// Merged entries that `resolve` would drop as unusable
    pub fn unusable_entries<'a, I>(overlays: I) -> Vec<(String, f64)>
    where
        I: IntoIterator<Item = &'a BTreeMap<String, f64>>,
    {
        Self::split(Self::merge(overlays)).1
    }

    /// Divide by the monthly entry, drop unusable entries, pin monthly to 1
    pub fn normalized(raw: BTreeMap<String, f64>) -> Self {
        let (factors, dropped) = Self::split(raw);
        for (name, factor) in dropped {
            debug!("Dropping unusable modal factor {}={}", name, factor);
        }
        factors
    }

    fn merge<'a, I>(overlays: I) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = &'a BTreeMap<String, f64>>,
    {
        let mut merged: BTreeMap<String, f64> = defaults::MODAL_FACTORS
            .iter()
            .map(|(name, factor)| (name.to_string(), *factor))
            .collect();

        for overlay in overlays {
            for (name, factor) in overlay {
                merged.insert(normalize_modality(name), *factor);
            }
        }
        merged
    }

    fn split(raw: BTreeMap<String, f64>) -> (Self, Vec<(String, f64)>) {
        let divisor = raw
            .get(MONTHLY)
            .copied()
            .filter(|f| is_usable(*f))
            .unwrap_or(1.0);

        let mut factors = BTreeMap::new();
        let mut dropped = Vec::new();
        for (name, factor) in raw {
            let scaled = factor / divisor;
            if is_usable(scaled) {
                factors.insert(name, scaled);
            } else if name != MONTHLY {
                dropped.push((name, factor));
            }
        }
        factors.insert(MONTHLY.to_string(), 1.0);

        (Self(factors), dropped)
    }

    pub fn get(&self, modality: &str) -> Option<f64> {
        self.0.get(modality).copied()
    }

    /// Factor for a requested modality; unknown modalities are an error
    pub fn factor_for(&self, modality: &str) -> Result<f64, QuoteError> {
        self.get(modality)
            .ok_or_else(|| QuoteError::UnsupportedModality(modality.to_string()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }

    /// Convert an amount expressed per `period` into an amount per month
    ///
    /// Annual amounts divide by the annual factor (12 when absent). Other named
    /// periods scale by `monthly / period`; periods with no factor pass through.
    pub fn convert_to_monthly(&self, amount: f64, period: &RateTablePeriod) -> f64 {
        match period {
            RateTablePeriod::Monthly => amount,
            RateTablePeriod::Annual => {
                let annual = self
                    .get(ANNUAL)
                    .filter(|f| is_usable(*f))
                    .unwrap_or(defaults::MONTHS_PER_YEAR);
                amount / annual
            }
            RateTablePeriod::Named(name) => match self.get(name) {
                Some(period_factor) => {
                    let monthly = self
                        .get(MONTHLY)
                        .filter(|f| is_usable(*f))
                        .unwrap_or(1.0);
                    amount * (monthly / period_factor)
                }
                None => amount,
            },
        }
    }
}
