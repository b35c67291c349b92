//! Core quote engine: filter, rate, compose factors, convert to the requested modality

use super::modal::ModalFactors;
use super::output::{round_to_cents, AppliedFactors, Quote, QuoteBreakdown};
use super::request::{QuoteRequest, ResolvedRequest};
use crate::dataset::{Carrier, Dataset, Metadata, Product, RateTablePeriod};
use crate::defaults;
use crate::error::QuoteError;
use crate::normalize::normalize_health_class;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Why a product produced no quote for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    ProductType,
    Term,
    StateExcluded,
    NoRateBand,
    CoverageUnits,
    InvalidPremium,
}

/// Factor lookup trying the normalized key first, then the raw key
fn lookup_factor(factors: &BTreeMap<String, f64>, key: &str, default: f64) -> f64 {
    factors
        .get(&normalize_health_class(key))
        .or_else(|| factors.get(key))
        .copied()
        .unwrap_or(default)
}

/// Quote engine over one immutable underwriting dataset
///
/// Construction captures the dataset once; `calculate_quotes` takes `&self`,
/// performs no I/O and never mutates carrier data, so an engine can be shared
/// across threads for independent requests.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    metadata: Metadata,
    carriers: Vec<Carrier>,
}

impl QuoteEngine {
    /// Create an engine from a typed dataset
    pub fn new(dataset: Dataset) -> Self {
        let metadata = dataset.metadata.resolve();

        for carrier in &dataset.carriers {
            for product in &carrier.products {
                for (name, factor) in
                    ModalFactors::unusable_entries([&metadata.modal_factors, &product.modal_factors])
                {
                    warn!(
                        "{} / {}: ignoring unusable modal factor {}={}",
                        carrier.display_name(),
                        product.name.as_deref().unwrap_or(""),
                        name,
                        factor
                    );
                }
            }
        }

        Self {
            metadata,
            carriers: dataset.carriers,
        }
    }

    /// Create an engine from raw JSON; the value must be an object of dataset shape
    pub fn from_value(value: Value) -> Result<Self, QuoteError> {
        if !value.is_object() {
            return Err(QuoteError::InvalidDataset(
                "underwriting data must be an object".to_string(),
            ));
        }
        let dataset: Dataset = serde_json::from_value(value)
            .map_err(|e| QuoteError::InvalidDataset(e.to_string()))?;
        Ok(Self::new(dataset))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Carrier names in dataset order
    pub fn list_carriers(&self) -> Vec<String> {
        self.carriers
            .iter()
            .map(|carrier| carrier.display_name().to_string())
            .collect()
    }

    /// Price every eligible product, cheapest first
    ///
    /// Validation happens before any product is examined, so an invalid
    /// request never yields a partial list. Ineligible products are skipped.
    pub fn calculate_quotes(&self, request: &QuoteRequest) -> Result<Vec<Quote>, QuoteError> {
        let request = request.resolve()?;
        let mut quotes = Vec::new();

        for carrier in &self.carriers {
            for product in &carrier.products {
                match self.quote_product(carrier, product, &request)? {
                    Ok(quote) => quotes.push(quote),
                    Err(reason) => debug!(
                        "Skipping {} / {}: {:?}",
                        carrier.display_name(),
                        product.name.as_deref().unwrap_or(""),
                        reason
                    ),
                }
            }
        }

        // Vec::sort_by is stable: equal premiums keep carrier/product order
        quotes.sort_by(|a, b| a.premium.total_cmp(&b.premium));

        info!(
            "Priced {} quotes for age {} {} in {}",
            quotes.len(),
            request.age,
            request.gender,
            request.state
        );
        Ok(quotes)
    }

    /// Price one product; the outer error aborts the run, the inner one skips the product
    fn quote_product(
        &self,
        carrier: &Carrier,
        product: &Product,
        request: &ResolvedRequest,
    ) -> Result<Result<Quote, SkipReason>, QuoteError> {
        let product_type = product.normalized_type();

        // Filters
        if let Some(filter) = &request.product_type {
            if &product_type != filter {
                return Ok(Err(SkipReason::ProductType));
            }
        }
        if let Some(term) = request.term_years {
            if product.term_years != Some(term) {
                return Ok(Err(SkipReason::Term));
            }
        }

        let state_factor = product.state_factor(&request.state);
        if state_factor == 0.0 {
            return Ok(Err(SkipReason::StateExcluded));
        }

        let Some(rate_band) = product.find_rate_band(request.age) else {
            return Ok(Err(SkipReason::NoRateBand));
        };
        let base_rate_per_unit = rate_band
            .rates
            .get(request.gender.as_key())
            .copied()
            .ok_or_else(|| QuoteError::MissingGenderRate {
                gender: request.gender.to_string(),
                carrier: carrier.display_name().to_string(),
                product: product.name.clone().unwrap_or_default(),
            })?;

        let base_coverage_unit = product.coverage_unit(self.metadata.base_coverage_unit);
        let coverage_units = request.coverage_amount / base_coverage_unit;
        if !coverage_units.is_finite() || coverage_units <= 0.0 {
            return Ok(Err(SkipReason::CoverageUnits));
        }

        // Factor composition
        let nicotine_default = if request.nicotine_use {
            defaults::NICOTINE_USER_FACTOR
        } else {
            1.0
        };
        let applied_factors = AppliedFactors {
            health: lookup_factor(&product.health_factors, &request.health_class, 1.0),
            nicotine: lookup_factor(&product.nicotine_factors, request.nicotine_key(), nicotine_default),
            state: state_factor,
            product: product.product_factor(),
        };
        let raw_period_premium = base_rate_per_unit * coverage_units * applied_factors.combined();

        // Monthly baseline, then requested modality
        let modal_factors = ModalFactors::resolve([&self.metadata.modal_factors, &product.modal_factors]);
        let modal_factor = modal_factors.factor_for(&request.modality)?;
        let rate_table_period = product.rate_table_period(&self.metadata.rate_table_period);
        let policy_fee_annual = product.policy_fee_annual();

        let monthly_premium_before_fees =
            modal_factors.convert_to_monthly(raw_period_premium, &rate_table_period);
        let monthly_fee_portion =
            modal_factors.convert_to_monthly(policy_fee_annual, &RateTablePeriod::Annual);
        let monthly_premium_after_fees = monthly_premium_before_fees + monthly_fee_portion;
        let modal_premium = monthly_premium_after_fees * modal_factor;
        // Adding zero turns a rounded -0.0 into 0.0
        let premium = round_to_cents(modal_premium) + 0.0;

        if !premium.is_finite() || premium < 0.0 {
            return Ok(Err(SkipReason::InvalidPremium));
        }

        let carrier_name = carrier.display_name().to_string();
        Ok(Ok(Quote {
            product: product
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| carrier_name.clone()),
            carrier: carrier_name,
            product_type,
            term_years: product.term_years,
            coverage_amount: request.coverage_amount,
            premium,
            currency: self.metadata.currency.clone(),
            currency_symbol: self.metadata.currency_symbol.clone(),
            modality: request.modality.clone(),
            link_url: request.link_url.clone(),
            button_text: request.button_text.clone(),
            breakdown: QuoteBreakdown {
                base_rate_per_unit,
                base_coverage_unit,
                coverage_amount: request.coverage_amount,
                coverage_units,
                age: request.age,
                gender: request.gender,
                rate_band: rate_band.clone(),
                health_class: request.health_class.clone(),
                nicotine_use: request.nicotine_use,
                applied_factors,
                rate_table_period,
                raw_period_premium,
                modal_factors: modal_factors.as_map().clone(),
                modality: request.modality.clone(),
                modal_factor,
                policy_fee_annual,
                monthly_fee_portion,
                monthly_premium_before_fees,
                monthly_premium_after_fees,
                modal_premium,
            },
        }))
    }
}
