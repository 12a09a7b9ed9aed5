// API module entry
// The public JSON API under /api/: preflight, health and the contact form

mod contact;
mod health;
pub mod response;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppState;

/// Path prefix owned by the API
pub const API_PREFIX: &str = "/api/";

/// API routes, resolved from method and path alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    Preflight,
    Contact,
    Health,
    NotFound,
}

impl ApiRoute {
    /// Classify an `/api/*` request. First match wins.
    pub fn classify(method: &Method, path: &str) -> Self {
        match (method, path) {
            (&Method::OPTIONS, _) => Self::Preflight,
            (&Method::POST, "/api/contact") => Self::Contact,
            (&Method::GET, "/api/" | "/api/health") => Self::Health,
            _ => Self::NotFound,
        }
    }
}

/// Produce the response for an API route
///
/// `body` is only read by the contact route.
pub fn dispatch(route: ApiRoute, body: &[u8], state: &AppState) -> Response<Full<Bytes>> {
    match route {
        ApiRoute::Preflight => response::preflight(),
        ApiRoute::Contact => contact::handle_contact(body, state),
        ApiRoute::Health => health::handle_health(state),
        ApiRoute::NotFound => response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            ApiRoute::classify(&Method::OPTIONS, "/api/anything"),
            ApiRoute::Preflight
        );
        assert_eq!(
            ApiRoute::classify(&Method::OPTIONS, "/api/contact"),
            ApiRoute::Preflight
        );
        assert_eq!(
            ApiRoute::classify(&Method::POST, "/api/contact"),
            ApiRoute::Contact
        );
        assert_eq!(ApiRoute::classify(&Method::GET, "/api/"), ApiRoute::Health);
        assert_eq!(
            ApiRoute::classify(&Method::GET, "/api/health"),
            ApiRoute::Health
        );
        assert_eq!(
            ApiRoute::classify(&Method::GET, "/api/contact"),
            ApiRoute::NotFound
        );
        assert_eq!(
            ApiRoute::classify(&Method::POST, "/api/health"),
            ApiRoute::NotFound
        );
        assert_eq!(
            ApiRoute::classify(&Method::DELETE, "/api/does-not-exist"),
            ApiRoute::NotFound
        );
    }
}
