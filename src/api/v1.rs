use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::{api::forecast, pipeline::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forecast", get(forecast::get_forecast_data))
        .route("/forecast/process", post(forecast::process_forecasts))
        .route("/healthz", get(healthz))
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
