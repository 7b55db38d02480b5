//! A single supplier's published price for a matched CUM code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of one supplier's published price. "Best price" is the row
/// with the most recent `published_at` for a given `cum_code` — see
/// [`crate::pricing::select_prices`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_code: Option<String>,
    pub unit_price: Option<f64>,
    pub min_unit_price: Option<f64>,
    pub box_price: Option<f64>,
    pub vat_fraction: Option<f64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub published_at: DateTime<Utc>,
}
