//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. `/api/*` goes to the JSON API,
//! everything else to the asset store with single-page-app fallback.

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::api::{self, ApiRoute, API_PREFIX};
use crate::config::AppState;
use crate::handler::static_files;
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    /// Collected body; empty unless the route reads it
    pub body: &'a [u8],
}

/// Where a request goes, decided from method and path alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Api(ApiRoute),
    Asset,
}

impl Route {
    pub fn classify(method: &Method, path: &str) -> Self {
        if path.starts_with(API_PREFIX) {
            Self::Api(ApiRoute::classify(method, path))
        } else {
            Self::Asset
        }
    }
}

/// The response chosen for a request, tagged by the branch that produced it
#[derive(Debug)]
pub enum RouteDecision {
    Preflight(Response<Full<Bytes>>),
    Api(Response<Full<Bytes>>),
    Asset(Response<Full<Bytes>>),
    /// Diagnostic page served because the asset store is unavailable
    Fallback(Response<Full<Bytes>>),
}

impl RouteDecision {
    #[cfg(test)]
    pub const fn response(&self) -> &Response<Full<Bytes>> {
        match self {
            Self::Preflight(r) | Self::Api(r) | Self::Asset(r) | Self::Fallback(r) => r,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Preflight(r) | Self::Api(r) | Self::Asset(r) | Self::Fallback(r) => r,
        }
    }
}

/// Route one request. No state is carried between calls.
pub async fn route(ctx: &RequestContext<'_>, state: &AppState) -> RouteDecision {
    match Route::classify(ctx.method, ctx.path) {
        Route::Api(ApiRoute::Preflight) => {
            RouteDecision::Preflight(api::dispatch(ApiRoute::Preflight, ctx.body, state))
        }
        Route::Api(api_route) => RouteDecision::Api(api::dispatch(api_route, ctx.body, state)),
        Route::Asset => match static_files::serve(ctx, state).await {
            Ok(resp) => RouteDecision::Asset(resp),
            Err(e) => {
                logger::log_error(&format!("Serving {} degraded: {e}", ctx.path));
                RouteDecision::Fallback(static_files::status_page(ctx.path, ctx.is_head))
            }
        },
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    let if_none_match = header("if-none-match");

    let route_kind = Route::classify(&method, &path);

    // Only the contact form reads its body
    let body = if route_kind == Route::Api(ApiRoute::Contact) {
        match read_body(body, &parts.headers, state.config.http.max_body_size).await {
            Ok(bytes) => bytes,
            Err(resp) => {
                let resp = finish(resp, &state);
                log_access(&state, &method, &parts.uri, parts.version, &header, peer_addr, &resp, started);
                return Ok(resp);
            }
        }
    } else {
        Bytes::new()
    };

    let ctx = RequestContext {
        method: &method,
        path: &path,
        is_head: method == Method::HEAD,
        if_none_match: if_none_match.as_deref(),
        body: &body,
    };

    let resp = finish(route(&ctx, &state).await.into_response(), &state);
    log_access(&state, &method, &parts.uri, parts.version, &header, peer_addr, &resp, started);
    Ok(resp)
}

/// Collect the request body, enforcing `max_body_size`
async fn read_body<B>(
    body: B,
    headers: &hyper::HeaderMap,
    max_body_size: u64,
) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|size| size > max_body_size) {
        logger::log_warning(&format!(
            "Request body too large: {} bytes (max: {max_body_size})",
            declared.unwrap_or_default()
        ));
        return Err(api::response::payload_too_large());
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while streaming"
            ));
            Err(api::response::payload_too_large())
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(api::response::internal_error())
        }
    }
}

/// Headers common to every response
fn finish(mut resp: Response<Full<Bytes>>, state: &AppState) -> Response<Full<Bytes>> {
    if let Ok(value) = hyper::header::HeaderValue::from_str(&state.config.http.server_name) {
        resp.headers_mut().insert(hyper::header::SERVER, value);
    }
    resp
}

#[allow(clippy::too_many_arguments)]
fn log_access(
    state: &AppState,
    method: &Method,
    uri: &hyper::Uri,
    version: hyper::Version,
    header: &impl Fn(&str) -> Option<String>,
    peer_addr: SocketAddr,
    resp: &Response<Full<Bytes>>,
    started: Instant,
) {
    if !state.config.logging.access_log {
        return;
    }

    let remote = AccessLogEntry::client_addr(header("x-forwarded-for").as_deref(), &peer_addr);
    let mut entry = AccessLogEntry::new(remote, method.to_string(), uri.path().to_string());
    entry.query = uri.query().map(ToString::to_string);
    entry.http_version = match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = resp.status().as_u16();
    entry.body_bytes = body_len(resp);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn body_len(resp: &Response<Full<Bytes>>) -> usize {
    use hyper::body::Body;
    if resp.status() == StatusCode::NOT_MODIFIED {
        return 0;
    }
    resp.body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}
