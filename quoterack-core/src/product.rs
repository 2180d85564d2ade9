use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A catalog item. Prices are never stored on the product itself; they are
/// derived from the cheapest of its supplier quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Box-to-unit conversion factor, always > 0 for stored products.
    pub units_per_box: i32,
}

/// Input for creating or fully replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
}

impl ProductDraft {
    /// Presence/type checks performed before any SQL is issued.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("name", "name must not be empty"));
        }
        if self.units_per_box <= 0 {
            return Err(CatalogError::validation(
                "units_per_box",
                "units per box must be a positive integer",
            ));
        }
        Ok(())
    }

    /// The name as stored: surrounding whitespace stripped.
    pub fn normalized_name(&self) -> &str {
        self.name.trim()
    }
}

/// A listing row: the product plus its cheapest known quote and the
/// derived unit price. `None` price fields mean "unavailable".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
    pub cheapest_price: Option<f64>,
    pub cheapest_supplier: Option<String>,
    pub unit_price: Option<f64>,
}
