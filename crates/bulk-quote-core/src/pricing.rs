//! Best-price selection: a pure function over already-fetched price rows,
//! with no I/O of its own. [`crate::providers::PriceProvider::prices_for`]
//! does the fetching; this module only orders and caps what comes back.

use crate::model::PriceRow;

/// Order `rows` by `published_at` descending (most recent first) and cap
/// at `limit`. [`crate::model::QuoteResultRow::best_price`] always reads
/// index 0 of the result, so "best price" is simply "most recently
/// published" — there is no price-magnitude comparison here.
pub fn select_prices(mut rows: Vec<PriceRow>, limit: usize) -> Vec<PriceRow> {
    rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    rows.truncate(limit);
    rows
}
