use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A supplier's offered price for one product at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: i64,
    pub product_id: i64,
    pub supplier: String,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Input for adding or replacing a quote. The owning product id travels
/// separately so the same draft serves create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub supplier: String,
    pub price: f64,
}

impl QuoteDraft {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.supplier.trim().is_empty() {
            return Err(CatalogError::validation(
                "supplier",
                "supplier must not be empty",
            ));
        }
        if !(self.price > 0.0) {
            return Err(CatalogError::validation(
                "price",
                "price must be a positive number",
            ));
        }
        Ok(())
    }

    pub fn normalized_supplier(&self) -> &str {
        self.supplier.trim()
    }
}
