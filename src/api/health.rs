// Health endpoint: GET /api/ and GET /api/health

use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::json_response;
use super::types::HealthResponse;
use crate::config::AppState;

pub fn handle_health(state: &AppState) -> Response<Full<Bytes>> {
    let body = HealthResponse {
        message: &state.config.site.api_name,
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: &state.config.site.environment,
    };
    json_response(StatusCode::OK, &body)
}
