//! Read-only price derivation over a product's quotes.
//!
//! The backends compute the same aggregate in SQL for listing views
//! (`ORDER BY price ASC, id ASC LIMIT 1`); this module is the in-process
//! equivalent used for detail views and anything already holding the
//! quotes in memory.

use std::cmp::Ordering;

use crate::product::ProductSummary;
use crate::quote::PriceQuote;

/// The quote with the minimum price. Ties go to the lowest quote id, i.e.
/// the first one recorded, so repeated reads are deterministic.
pub fn cheapest_quote(quotes: &[PriceQuote]) -> Option<&PriceQuote> {
    quotes.iter().min_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    })
}

/// Price per unit, rounded to 2 decimal places. `None` when the divisor
/// is not positive; callers render that as "unavailable" rather than
/// dividing by zero.
pub fn unit_price(price: f64, units_per_box: i32) -> Option<f64> {
    if units_per_box <= 0 {
        return None;
    }
    Some((price / f64::from(units_per_box) * 100.0).round() / 100.0)
}

/// Fills in `unit_price` on listing rows that already carry their cheapest
/// quote price from the aggregate query.
pub fn attach_unit_prices(summaries: &mut [ProductSummary]) {
    for summary in summaries.iter_mut() {
        summary.unit_price = summary
            .cheapest_price
            .and_then(|price| unit_price(price, summary.units_per_box));
    }
}
