//! Engine-wide defaults applied when the dataset or request leaves a field unset

/// Currency code when the dataset metadata declares none
pub const CURRENCY: &str = "USD";

/// Currency symbol when the dataset metadata declares none
pub const CURRENCY_SYMBOL: &str = "$";

/// Coverage denomination rate tables are quoted against
pub const BASE_COVERAGE_UNIT: f64 = 1000.0;

/// Billing frequency when the request names none
pub const MODALITY: &str = "monthly";

/// Health class assumed when the request names none
pub const HEALTH_CLASS: &str = "standard";

pub const BUTTON_TEXT: &str = "Book now";

pub const LINK_URL: &str = "#";

/// Nicotine multiplier for a nicotine user when the product lists no factor
pub const NICOTINE_USER_FACTOR: f64 = 1.5;

/// Months per year, used when an annual rate table has no usable annual modal factor
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Per-payment modal factors, expressed relative to the annual premium.
/// Normalization divides these by the monthly entry, giving an annual payment
/// of 1 / 0.09 ≈ 11.11 monthly premiums.
pub const MODAL_FACTORS: &[(&str, f64)] = &[
    ("annual", 1.0),
    ("semi_annual", 0.52),
    ("quarterly", 0.265),
    ("monthly", 0.09),
];
