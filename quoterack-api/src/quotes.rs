use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use quoterack_core::PriceQuote;

use crate::error::ApiError;
use crate::products::QuoteRequest;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/quotes/{id}",
        get(get_quote).put(update_quote).delete(delete_quote),
    )
}

/// GET /quotes/{id}
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PriceQuote>, ApiError> {
    let quote = state
        .catalog
        .get_quote(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("quote {id} not found")))?;
    Ok(Json(quote))
}

/// PUT /quotes/{id}
pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, ApiError> {
    let quote = state.catalog.update_quote(id, &req.into_draft()).await?;
    Ok(Json(quote))
}

/// DELETE /quotes/{id} - idempotent
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_quote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
