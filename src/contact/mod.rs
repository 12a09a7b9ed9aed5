//! Contact form domain
//!
//! Validation of visitor submissions and best-effort email notification.

pub mod notifier;
pub mod validator;

pub use notifier::{Notifier, NotifyError};
pub use validator::{validate, ContactSubmission};
