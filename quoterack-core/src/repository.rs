use async_trait::async_trait;

use crate::error::CatalogError;
use crate::product::{Product, ProductDraft, ProductSummary};
use crate::quote::{PriceQuote, QuoteDraft};

/// Storage abstraction for the catalog. One concrete backend is selected
/// at startup from the connection URL; callers never see the dialect.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Products ordered by name ascending (case-insensitive). A non-empty
    /// search term filters to products whose name or description contains
    /// it, case-insensitive. Rows carry the cheapest quote from a single
    /// aggregate query plus the derived unit price.
    async fn list_products(&self, search: Option<&str>)
        -> Result<Vec<ProductSummary>, CatalogError>;

    async fn get_product(&self, id: i64) -> Result<Option<Product>, CatalogError>;

    /// Fails with `Validation` on an empty name or non-positive
    /// units_per_box, and with `DuplicateName` when the name is taken.
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError>;

    /// Full replace of name/description/units_per_box.
    async fn update_product(
        &self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogError>;

    /// Deletes the product and all of its quotes in one transaction.
    /// Idempotent: a missing id is a no-op.
    async fn delete_product(&self, id: i64) -> Result<(), CatalogError>;

    /// Quotes for a product, newest first.
    async fn quotes_for_product(&self, product_id: i64)
        -> Result<Vec<PriceQuote>, CatalogError>;

    /// Fails with `NotFound` when the product does not exist; the
    /// existence check and the insert share a transaction.
    async fn add_quote(
        &self,
        product_id: i64,
        draft: &QuoteDraft,
    ) -> Result<PriceQuote, CatalogError>;

    async fn get_quote(&self, id: i64) -> Result<Option<PriceQuote>, CatalogError>;

    async fn update_quote(&self, id: i64, draft: &QuoteDraft)
        -> Result<PriceQuote, CatalogError>;

    /// Idempotent, like `delete_product`.
    async fn delete_quote(&self, id: i64) -> Result<(), CatalogError>;
}
