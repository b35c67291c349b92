//! Underwriting dataset structures matching the carrier JSON format

use crate::defaults;
use crate::normalize::{normalize_key, normalize_modality};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Time period the values of a rate table are expressed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RateTablePeriod {
    #[default]
    Monthly,
    Annual,
    /// Any other modality name, resolved against the product's modal factors
    Named(String),
}

impl RateTablePeriod {
    pub fn parse(value: &str) -> Self {
        match normalize_modality(value).as_str() {
            "monthly" => RateTablePeriod::Monthly,
            "annual" => RateTablePeriod::Annual,
            other => RateTablePeriod::Named(other.to_string()),
        }
    }

    /// Resolve an explicit period string, else the boolean annual flag
    fn declared(period: Option<&RateTablePeriod>, annual_flag: Option<bool>) -> Option<Self> {
        match (period, annual_flag) {
            (Some(period), _) => Some(period.clone()),
            (None, Some(true)) => Some(RateTablePeriod::Annual),
            (None, Some(false)) => Some(RateTablePeriod::Monthly),
            (None, None) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RateTablePeriod::Monthly => "monthly",
            RateTablePeriod::Annual => "annual",
            RateTablePeriod::Named(name) => name,
        }
    }
}

impl fmt::Display for RateTablePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RateTablePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RateTablePeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RateTablePeriod::parse(&raw))
    }
}

/// Sequence that tolerates a non-array value (empty) and skips non-object entries
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    items
        .into_iter()
        .filter(|item| item.is_object())
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}

/// Missing and `null` both read as the type's default
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rate table that treats `null` as empty but rejects any other non-array value
fn rate_table<'de, D>(deserializer: D) -> Result<Vec<RateBand>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = Option::<serde_json::Value>::deserialize(deserializer)?;
    match table {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(bands)) => bands
            .into_iter()
            .map(|band| serde_json::from_value(band).map_err(D::Error::custom))
            .collect(),
        Some(_) => Err(D::Error::custom(
            "Product rate_table must be an array of age bands.",
        )),
    }
}

/// Dataset-level metadata as declared in the JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub currency_symbol: Option<String>,

    #[serde(default)]
    pub base_coverage_unit: Option<f64>,

    /// Explicit period of every rate table in the dataset
    #[serde(default)]
    pub rate_table_period: Option<RateTablePeriod>,

    /// Boolean form of `rate_table_period` (`true` = annual)
    #[serde(default)]
    pub rate_table_annual: Option<bool>,

    /// Overlay on the engine's default modal factors
    #[serde(default, deserialize_with = "null_default")]
    pub modal_factors: BTreeMap<String, f64>,
}

/// Metadata with every default applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub currency: String,
    pub currency_symbol: String,
    pub base_coverage_unit: f64,
    pub rate_table_period: RateTablePeriod,
    pub modal_factors: BTreeMap<String, f64>,
}

impl DatasetMetadata {
    /// Apply defaults; empty strings and non-positive units count as unset
    pub fn resolve(&self) -> Metadata {
        let non_empty = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        Metadata {
            currency: non_empty(&self.currency, defaults::CURRENCY),
            currency_symbol: non_empty(&self.currency_symbol, defaults::CURRENCY_SYMBOL),
            base_coverage_unit: self
                .base_coverage_unit
                .filter(|unit| unit.is_finite() && *unit > 0.0)
                .unwrap_or(defaults::BASE_COVERAGE_UNIT),
            rate_table_period: RateTablePeriod::declared(
                self.rate_table_period.as_ref(),
                self.rate_table_annual,
            )
            .unwrap_or_default(),
            modal_factors: self.modal_factors.clone(),
        }
    }
}

/// Age band within a product's rate table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    #[serde(default)]
    pub min_age: Option<f64>,

    #[serde(default)]
    pub max_age: Option<f64>,

    /// Per-unit base rate keyed by gender
    #[serde(default, deserialize_with = "null_default")]
    pub rates: BTreeMap<String, f64>,
}

impl RateBand {
    /// Inclusive age check; a missing bound is open
    pub fn contains(&self, age: f64) -> bool {
        let min = self.min_age.filter(|a| a.is_finite()).unwrap_or(0.0);
        let max = self.max_age.filter(|a| a.is_finite()).unwrap_or(f64::INFINITY);
        age >= min && age <= max
    }
}

/// A carrier product with its rate table and rating factors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub term_years: Option<u32>,

    /// Override of the dataset coverage unit
    #[serde(default)]
    pub base_coverage_unit: Option<f64>,

    #[serde(default, deserialize_with = "rate_table")]
    pub rate_table: Vec<RateBand>,

    #[serde(default, deserialize_with = "null_default")]
    pub state_factors: BTreeMap<String, f64>,

    #[serde(default, deserialize_with = "null_default")]
    pub state_exclusions: Vec<String>,

    #[serde(default, deserialize_with = "null_default")]
    pub health_factors: BTreeMap<String, f64>,

    /// Keyed by `"true"` / `"false"`
    #[serde(default, deserialize_with = "null_default")]
    pub nicotine_factors: BTreeMap<String, f64>,

    #[serde(default)]
    pub product_factor: Option<f64>,

    #[serde(default)]
    pub policy_fee_annual: Option<f64>,

    /// Overlay on the dataset's modal factors (product wins)
    #[serde(default, deserialize_with = "null_default")]
    pub modal_factors: BTreeMap<String, f64>,

    #[serde(default)]
    pub rate_table_period: Option<RateTablePeriod>,

    #[serde(default)]
    pub rate_table_annual: Option<bool>,
}

impl Product {
    /// Normalized lookup key from `type`, else `product_type`, else the name
    pub fn normalized_type(&self) -> String {
        let raw = [&self.kind, &self.product_type, &self.name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("");
        normalize_key(raw)
    }

    /// Product-level period override, else the dataset period
    pub fn rate_table_period(&self, dataset_period: &RateTablePeriod) -> RateTablePeriod {
        RateTablePeriod::declared(self.rate_table_period.as_ref(), self.rate_table_annual)
            .unwrap_or_else(|| dataset_period.clone())
    }

    /// Own coverage unit if set and non-zero, else the dataset default
    pub fn coverage_unit(&self, dataset_unit: f64) -> f64 {
        self.base_coverage_unit
            .filter(|unit| *unit != 0.0 && !unit.is_nan())
            .unwrap_or(dataset_unit)
    }

    pub fn product_factor(&self) -> f64 {
        self.product_factor.filter(|f| f.is_finite()).unwrap_or(1.0)
    }

    pub fn policy_fee_annual(&self) -> f64 {
        self.policy_fee_annual.filter(|f| f.is_finite()).unwrap_or(0.0)
    }

    /// First band in table order containing `age`
    pub fn find_rate_band(&self, age: f64) -> Option<&RateBand> {
        self.rate_table.iter().find(|band| band.contains(age))
    }

    /// State multiplier; zero when the state is excluded, one when unlisted
    pub fn state_factor(&self, state: &str) -> f64 {
        if self.state_exclusions.iter().any(|s| s == state) {
            return 0.0;
        }
        self.state_factors.get(state).copied().unwrap_or(1.0)
    }
}

/// Insurance carrier and its products in dataset order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Carrier {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub products: Vec<Product>,
}

impl Carrier {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unnamed Carrier")
    }
}

/// Full underwriting dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: DatasetMetadata,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub carriers: Vec<Carrier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_defaults() {
        let meta = DatasetMetadata::default().resolve();
        assert_eq!(meta.currency, "USD");
        assert_eq!(meta.currency_symbol, "$");
        assert_eq!(meta.base_coverage_unit, 1000.0);
        assert_eq!(meta.rate_table_period, RateTablePeriod::Monthly);
    }

    #[test]
    fn test_metadata_period_declarations() {
        let explicit: DatasetMetadata =
            serde_json::from_value(json!({ "rate_table_period": "Annual", "rate_table_annual": false })).unwrap();
        assert_eq!(explicit.resolve().rate_table_period, RateTablePeriod::Annual);

        let flagged: DatasetMetadata = serde_json::from_value(json!({ "rate_table_annual": true })).unwrap();
        assert_eq!(flagged.resolve().rate_table_period, RateTablePeriod::Annual);

        let named: DatasetMetadata = serde_json::from_value(json!({ "rate_table_period": "quarterly" })).unwrap();
        assert_eq!(named.resolve().rate_table_period, RateTablePeriod::Named("quarterly".into()));
    }

    #[test]
    fn test_rate_band_contains() {
        let band: RateBand = serde_json::from_value(json!({ "min_age": 70, "max_age": 85, "rates": { "male": 1.0 } })).unwrap();
        assert!(band.contains(70.0));
        assert!(band.contains(85.0));
        assert!(!band.contains(69.9));
        assert!(!band.contains(86.0));

        let open: RateBand = serde_json::from_value(json!({ "rates": {} })).unwrap();
        assert!(open.contains(0.0));
        assert!(open.contains(120.0));
    }

    #[test]
    fn test_first_matching_band_wins() {
        let product: Product = serde_json::from_value(json!({
            "name": "Overlap",
            "rate_table": [
                { "min_age": 60, "max_age": 80, "rates": { "male": 2.0 } },
                { "min_age": 18, "max_age": 99, "rates": { "male": 1.0 } }
            ]
        }))
        .unwrap();
        assert_eq!(product.find_rate_band(70.0).unwrap().rates["male"], 2.0);
        assert_eq!(product.find_rate_band(40.0).unwrap().rates["male"], 1.0);
        assert!(product.find_rate_band(10.0).is_none());
    }

    #[test]
    fn test_product_type_and_state_factor() {
        let product: Product = serde_json::from_value(json!({
            "name": "Final Expense Plus",
            "product_type": " FE ",
            "state_factors": { "CA": 1.1 },
            "state_exclusions": ["NY"]
        }))
        .unwrap();
        assert_eq!(product.normalized_type(), "fe");
        assert_eq!(product.state_factor("CA"), 1.1);
        assert_eq!(product.state_factor("TX"), 1.0);
        assert_eq!(product.state_factor("NY"), 0.0);

        let unnamed = Product { name: Some("Whole  Life".into()), ..Default::default() };
        assert_eq!(unnamed.normalized_type(), "whole life");
    }

    #[test]
    fn test_non_array_rate_table_rejected() {
        let result: Result<Product, _> = serde_json::from_value(json!({ "rate_table": { "min_age": 1 } }));
        assert!(result.is_err());

        let null_table: Product = serde_json::from_value(json!({ "rate_table": null })).unwrap();
        assert!(null_table.rate_table.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let dataset: Dataset = serde_json::from_value(json!({
            "metadata": null,
            "carriers": [{
                "name": "Acme",
                "products": [{
                    "name": "Acme Term",
                    "state_factors": null,
                    "state_exclusions": null,
                    "health_factors": null,
                    "nicotine_factors": null,
                    "modal_factors": null,
                    "rate_table": [{ "min_age": 18, "max_age": 80, "rates": null }]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(dataset.metadata.resolve(), DatasetMetadata::default().resolve());
        let product = &dataset.carriers[0].products[0];
        assert!(product.health_factors.is_empty());
        assert!(product.nicotine_factors.is_empty());
        assert!(product.modal_factors.is_empty());
        assert!(product.rate_table[0].rates.is_empty());
        assert_eq!(product.state_factor("NY"), 1.0);

        let meta: DatasetMetadata = serde_json::from_value(json!({ "modal_factors": null })).unwrap();
        assert!(meta.modal_factors.is_empty());
    }

    #[test]
    fn test_lenient_carriers() {
        let dataset: Dataset = serde_json::from_value(json!({
            "carriers": [null, 7, { "name": "Acme", "products": "none" }]
        }))
        .unwrap();
        assert_eq!(dataset.carriers.len(), 1);
        assert!(dataset.carriers[0].products.is_empty());

        let empty: Dataset = serde_json::from_value(json!({ "carriers": "oops" })).unwrap();
        assert!(empty.carriers.is_empty());
    }

    #[test]
    fn test_product_period_override() {
        let product = Product { rate_table_annual: Some(true), ..Default::default() };
        assert_eq!(product.rate_table_period(&RateTablePeriod::Monthly), RateTablePeriod::Annual);
        assert_eq!(Product::default().rate_table_period(&RateTablePeriod::Annual), RateTablePeriod::Annual);
        assert_eq!(Product::default().coverage_unit(1000.0), 1000.0);
        assert_eq!(Product { base_coverage_unit: Some(0.0), ..Default::default() }.coverage_unit(500.0), 500.0);
    }
}
