use anyhow::Context;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    images::services::image_payload,
    state::AppState,
    waste::{
        dto::{
            ClassifyResponse, HistoryItem, HistoryQuery, HistoryResponse, RecordEntryRequest,
            RecordedResponse,
        },
        services::{self, NewEntry},
    },
};

/// Multipart field carrying the photo to classify.
const IMAGE_FIELD: &str = "image";

pub fn waste_routes() -> Router<AppState> {
    Router::new()
        .route("/api/waste/classify", post(classify))
        .route("/api/waste/history", post(record_entry).get(history))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /api/waste/classify (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn classify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let mut mp = mp.map_err(|e| ApiError::invalid(e.body_text()))?;

    let mut image = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::invalid(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::invalid(e.body_text()))?;
        image = Some(image_payload(&body, content_type.as_deref())?);
        break;
    }
    let image = image.ok_or_else(|| ApiError::invalid("image file is required"))?;

    let category = services::classify(state.completion.as_ref(), &image).await?;
    info!(user_id, %category, "waste classified");
    Ok(Json(ClassifyResponse { category }))
}

#[instrument(skip(state, payload))]
pub async fn record_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<RecordEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordedResponse>), ApiError> {
    let Json(payload) = payload?;
    let entry = NewEntry::try_from(payload)?;
    auth.ensure_owner(entry.user_id)?;

    services::record(state.waste.as_ref(), entry).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordedResponse {
            message: "Waste entry recorded successfully",
        }),
    ))
}

#[instrument(skip(state, query))]
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(query) = query?;
    let (user_id, filter) = services::history_filter(&query)?;
    auth.ensure_owner(user_id)?;

    let entries = services::history(state.waste.as_ref(), user_id, &filter).await?;
    let history = entries
        .into_iter()
        .map(HistoryItem::try_from)
        .collect::<Result<Vec<_>, _>>()
        .context("format history timestamps")?;
    Ok(Json(HistoryResponse { history }))
}
