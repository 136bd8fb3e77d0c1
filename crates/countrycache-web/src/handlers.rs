use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use countrycache_core::{
    CountryQuery, CountryRecord, CountryStore, GdpSort, RegionSummary, StoreError, StoreStatus,
    SummaryReporter, UtcDateTime,
};

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub total_countries: u64,
    pub last_refreshed_at: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let report = state.refresher.refresh().await?;

    let (message, warning) = if report.is_degraded() {
        warn!("refresh committed without a summary image");
        (
            "Refresh complete with warnings",
            Some("Summary image generation failed"),
        )
    } else {
        ("Refresh complete", None)
    };

    Ok(Json(RefreshResponse {
        message,
        total_countries: report.total_countries,
        last_refreshed_at: report.last_refreshed_at,
        warning,
    }))
}

pub async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CountryRecord>>, ApiError> {
    let sort = non_blank(params.sort)
        .map(|raw| raw.parse::<GdpSort>())
        .transpose()
        .map_err(|e| ApiError::validation("sort", e))?;
    let query = CountryQuery {
        region: non_blank(params.region),
        currency: non_blank(params.currency),
        sort,
    };

    let countries = with_store(&state, move |store| store.list(&query)).await?;
    Ok(Json(countries))
}

pub async fn show_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CountryRecord>, ApiError> {
    let country = with_store(&state, move |store| store.get(&name)).await?;
    Ok(Json(country))
}

pub async fn delete_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    with_store(&state, move |store| store.delete(&name)).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

pub async fn status(State(state): State<AppState>) -> Result<Json<StoreStatus>, ApiError> {
    let status = with_store(&state, |store| store.status()).await?;
    Ok(Json(status))
}

pub async fn regions(State(state): State<AppState>) -> Result<Json<Vec<RegionSummary>>, ApiError> {
    let regions = with_store(&state, |store| store.region_summaries()).await?;
    Ok(Json(regions))
}

pub async fn summary_image(State(state): State<AppState>) -> Result<Response, ApiError> {
    let reporter: Arc<dyn SummaryReporter> = Arc::clone(state.refresher.reporter());
    let artifact = tokio::task::spawn_blocking(move || reporter.artifact())
        .await
        .map_err(|e| ApiError::Internal(format!("summary task failed: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::SummaryImageNotFound)?;

    Ok(([(header::CONTENT_TYPE, artifact.content_type)], artifact.bytes).into_response())
}

/// Run a store call on the blocking pool.
async fn with_store<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn CountryStore) -> Result<T, StoreError> + Send + 'static,
{
    let store: Arc<dyn CountryStore> = Arc::clone(state.refresher.store());
    tokio::task::spawn_blocking(move || call(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
