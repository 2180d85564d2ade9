use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use quoterack_core::pricing;
use quoterack_core::{PriceQuote, Product, ProductDraft, ProductSummary, QuoteDraft};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Root path doubles as the listing view.
        .route("/", get(list_products))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/quotes", axum::routing::post(add_quote))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
}

impl ProductRequest {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            description: self.description,
            units_per_box: self.units_per_box,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub supplier: String,
    pub price: f64,
}

impl QuoteRequest {
    pub(crate) fn into_draft(self) -> QuoteDraft {
        QuoteDraft {
            supplier: self.supplier,
            price: self.price,
        }
    }
}

/// Product detail: the product itself, its full quote history (newest
/// first) and the derived cheapest/unit prices.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub units_per_box: i32,
    pub cheapest_price: Option<f64>,
    pub cheapest_supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub quotes: Vec<PriceQuote>,
}

/// GET /products?search=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let products = state.catalog.list_products(query.search.as_deref()).await?;
    Ok(Json(products))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog.create_product(&req.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetail>, ApiError> {
    let product = state
        .catalog
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id} not found")))?;
    let quotes = state.catalog.quotes_for_product(id).await?;

    let (cheapest_price, cheapest_supplier) = match pricing::cheapest_quote(&quotes) {
        Some(q) => (Some(q.price), Some(q.supplier.clone())),
        None => (None, None),
    };
    let unit_price =
        cheapest_price.and_then(|price| pricing::unit_price(price, product.units_per_box));

    Ok(Json(ProductDetail {
        id: product.id,
        name: product.name,
        description: product.description,
        units_per_box: product.units_per_box,
        cheapest_price,
        cheapest_supplier,
        unit_price,
        quotes,
    }))
}

/// PUT /products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.update_product(id, &req.into_draft()).await?;
    Ok(Json(product))
}

/// DELETE /products/{id} - idempotent
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/quotes
pub async fn add_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<QuoteRequest>,
) -> Result<(StatusCode, Json<PriceQuote>), ApiError> {
    let quote = state.catalog.add_quote(id, &req.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}
