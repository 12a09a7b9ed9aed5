//! Request handler module
//!
//! Responsible for request routing dispatch, the asset store boundary and
//! static file serving with single-page-app fallback.

pub mod assets;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
