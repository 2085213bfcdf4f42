use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::error::ApiError,
    domain::{parse_slot_date, SourceSelection},
    pipeline::{AlignedRow, AppState, DateRange, ProcessRequest, ProcessResponse},
};

/// POST /api/v1/forecast/process - Align selected forecast series against
/// actuals and score them
pub async fn process_forecasts(
    State(st): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let response = st.pipeline.process(request).await?;
    Ok(Json(response))
}

/// Query parameters of the paged data endpoint. Dates use the upstream
/// 8-digit encoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct ForecastDataResponse {
    pub data: Vec<AlignedRow>,
    pub page: u32,
    pub limit: u32,
}

/// GET /api/v1/forecast - Baseline-aligned rows for all sources, paged,
/// without statistics
pub async fn get_forecast_data(
    State(st): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastDataResponse>, ApiError> {
    let from = parse_slot_date(&query.start_date).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let to = parse_slot_date(&query.end_date).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rows = st
        .pipeline
        .baseline_rows(DateRange { from, to }, &SourceSelection::all())
        .await?;

    let limit = query.limit.unwrap_or(st.cfg.forecast.fetch_limit as u32).max(1);
    let page = query.page.max(1);
    let data: Vec<AlignedRow> = rows
        .into_iter()
        .skip((page as usize - 1) * limit as usize)
        .take(limit as usize)
        .collect();

    Ok(Json(ForecastDataResponse { data, page, limit }))
}
