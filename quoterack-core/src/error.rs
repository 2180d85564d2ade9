/// Catalog-level errors
///
/// The store and the pricing layer return these; the HTTP layer maps each
/// variant to a distinct user-visible outcome.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("a product named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl CatalogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn product_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "product",
            id,
        }
    }

    pub fn quote_not_found(id: i64) -> Self {
        Self::NotFound { entity: "quote", id }
    }
}
