// Contact form endpoint: POST /api/contact

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::response::{bad_request, internal_error, json_response};
use super::types::ContactResponse;
use crate::config::AppState;
use crate::contact::{self, notifier};
use crate::logger;

/// Validate a submission and hand it to the notifier without waiting.
///
/// The visitor gets the confirmation whether or not delivery later succeeds.
pub fn handle_contact(body: &[u8], state: &AppState) -> Response<Full<Bytes>> {
    let payload: Map<String, Value> = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            logger::log_error(&format!("Contact form body is not a JSON object: {e}"));
            return internal_error();
        }
    };

    let submission = match contact::validate(&payload) {
        Ok(s) => s,
        Err(e) => {
            let reason = e.to_string();
            logger::log_contact_rejected(&reason);
            return bad_request(&reason);
        }
    };

    notifier::dispatch(&state.background, Arc::clone(&state.notifier), submission);

    json_response(
        StatusCode::OK,
        &ContactResponse::accepted(&state.config.site.contact_confirmation),
    )
}
