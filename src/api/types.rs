// API response body types

use serde::Serialize;

/// `GET /api/` and `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub message: &'a str,
    pub status: &'static str,
    /// RFC 3339 time the response was produced
    pub timestamp: String,
    pub environment: &'a str,
}

/// `POST /api/contact` outcome
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContactResponse<'a> {
    Accepted { success: bool, message: &'a str },
    Rejected { success: bool, error: String },
}

impl<'a> ContactResponse<'a> {
    pub const fn accepted(message: &'a str) -> Self {
        Self::Accepted {
            success: true,
            message,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self::Rejected {
            success: false,
            error: error.into(),
        }
    }
}

/// Generic API error body, e.g. unknown endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub error: &'a str,
}
