//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from routing
//! and the contact API.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_404_response, build_asset_response, build_html_response,
    escape_html,
};
