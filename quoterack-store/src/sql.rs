//! Helpers shared by the two SQL backends.

use chrono::{DateTime, Utc};
use quoterack_core::{CatalogError, PriceQuote, Product, ProductSummary};

pub(crate) fn storage(err: sqlx::Error) -> CatalogError {
    CatalogError::Storage(err.into())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Escapes LIKE metacharacters so a search term is matched literally.
/// Both backends pass `\` as the escape character.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            units_per_box: row.units_per_box,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SummaryRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
    pub cheapest_price: Option<f64>,
    pub cheapest_supplier: Option<String>,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        ProductSummary {
            id: row.id,
            name: row.name,
            description: row.description,
            units_per_box: row.units_per_box,
            cheapest_price: row.cheapest_price,
            cheapest_supplier: row.cheapest_supplier,
            // Filled in by pricing::attach_unit_prices afterwards.
            unit_price: None,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct QuoteRow {
    pub id: i64,
    pub product_id: i64,
    pub supplier: String,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

impl From<QuoteRow> for PriceQuote {
    fn from(row: QuoteRow) -> Self {
        PriceQuote {
            id: row.id,
            product_id: row.product_id,
            supplier: row.supplier,
            price: row.price,
            recorded_at: row.recorded_at,
        }
    }
}
