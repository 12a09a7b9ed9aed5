// API response utility functions module
// Every API response carries the same permissive CORS headers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::types::{ContactResponse, ErrorResponse};
use crate::logger;

/// CORS headers merged into every `/api/*` response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

fn with_cors(mut builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return internal_error();
        }
    };

    with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

/// Empty 200 answer to a CORS preflight
pub fn preflight() -> Response<Full<Bytes>> {
    with_cors(Response::builder())
        .status(StatusCode::OK)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build preflight response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

/// 404 for any unknown `/api/*` route
pub fn not_found() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: "API endpoint not found",
        },
    )
}

/// 400 with the validation failure reason
pub fn bad_request(reason: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::BAD_REQUEST, &ContactResponse::rejected(reason))
}

/// 413 when the contact body exceeds `http.max_body_size`
pub fn payload_too_large() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &ContactResponse::rejected("Payload too large"),
    )
}

/// 500 for bodies that cannot be read or decoded
pub fn internal_error() -> Response<Full<Bytes>> {
    with_cors(Response::builder())
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(
            r#"{"success":false,"error":"Internal server error"}"#,
        )))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal server error"))))
}
