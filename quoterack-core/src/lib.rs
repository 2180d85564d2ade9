pub mod error;
pub mod pricing;
pub mod product;
pub mod quote;
pub mod repository;

pub use error::CatalogError;
pub use product::{Product, ProductDraft, ProductSummary};
pub use quote::{PriceQuote, QuoteDraft};
pub use repository::CatalogRepository;

pub type CatalogResult<T> = Result<T, CatalogError>;
