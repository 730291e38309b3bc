use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    content::{
        dto::{AlternativesQuery, AlternativesResponse, TipsResponse},
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/alternatives", get(alternatives))
        .route("/api/tips/food-waste", get(food_waste_tips))
}

#[instrument(skip(state, query))]
pub async fn alternatives(
    State(state): State<AppState>,
    query: Result<Query<AlternativesQuery>, QueryRejection>,
) -> Result<Json<AlternativesResponse>, ApiError> {
    let Query(query) = query?;
    let product = query
        .product
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::invalid("product is required"))?;

    let alternatives = services::eco_alternatives(state.completion.as_ref(), product).await?;
    info!(product, count = alternatives.len(), "alternatives generated");
    Ok(Json(AlternativesResponse { alternatives }))
}

#[instrument(skip(state))]
pub async fn food_waste_tips(
    State(state): State<AppState>,
) -> Result<Json<TipsResponse>, ApiError> {
    let tips = services::food_waste_tips(state.completion.as_ref()).await?;
    Ok(Json(TipsResponse { tips }))
}
