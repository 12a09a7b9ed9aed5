//! Contact form validation
//!
//! Turns a decoded JSON object into a [`ContactSubmission`]. The schema fails
//! closed: required fields must be non-empty strings and unknown fields are
//! rejected.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// `local@domain.tld`: no whitespace or extra `@`, and a dot inside the domain
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const REQUIRED_FIELDS: [&str; 4] = ["name", "email", "subject", "message"];
const OPTIONAL_FIELDS: [&str; 1] = ["company"];

/// A validated contact form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Client-side mistakes in a contact payload (all map to 400)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingField(&'static str),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Unexpected field: {0}")]
    UnknownField(String),
}

/// Validate a decoded contact payload
pub fn validate(payload: &Map<String, Value>) -> Result<ContactSubmission, ValidationError> {
    let name = required(payload, "name")?;
    let email = required(payload, "email")?;
    let subject = required(payload, "subject")?;
    let message = required(payload, "message")?;
    let company = optional(payload, "company")?;

    if let Some(unknown) = payload
        .keys()
        .find(|k| !REQUIRED_FIELDS.contains(&k.as_str()) && !OPTIONAL_FIELDS.contains(&k.as_str()))
    {
        return Err(ValidationError::UnknownField(unknown.clone()));
    }

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ContactSubmission {
        name,
        email,
        company,
        subject,
        message,
    })
}

/// Check an address against the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn required(payload: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn optional(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        // Treated like a required field of the wrong type
        Some(_) => Err(ValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn valid() -> Map<String, Value> {
        object(json!({
            "name": "A",
            "email": "a@b.com",
            "subject": "S",
            "message": "M",
        }))
    }

    #[test]
    fn test_minimal_payload() {
        let submission = validate(&valid()).unwrap();
        assert_eq!(submission.name, "A");
        assert_eq!(submission.email, "a@b.com");
        assert_eq!(submission.company, None);
    }

    #[test]
    fn test_company_is_kept() {
        let mut payload = valid();
        payload.insert("company".into(), json!("Tech Solutions Inc"));
        let submission = validate(&payload).unwrap();
        assert_eq!(submission.company.as_deref(), Some("Tech Solutions Inc"));

        payload.insert("company".into(), json!(""));
        assert_eq!(validate(&payload).unwrap().company, None);

        payload.insert("company".into(), Value::Null);
        assert_eq!(validate(&payload).unwrap().company, None);
    }

    #[test]
    fn test_each_required_field() {
        for field in REQUIRED_FIELDS {
            let mut missing = valid();
            missing.remove(field);
            assert_eq!(
                validate(&missing),
                Err(ValidationError::MissingField(field)),
                "absent {field}"
            );

            let mut empty = valid();
            empty.insert(field.into(), json!(""));
            assert_eq!(
                validate(&empty),
                Err(ValidationError::MissingField(field)),
                "empty {field}"
            );

            let mut wrong_type = valid();
            wrong_type.insert(field.into(), json!(42));
            assert!(validate(&wrong_type).is_err(), "numeric {field}");
        }
    }

    #[test]
    fn test_missing_reported_before_bad_email() {
        let payload = object(json!({ "email": "foo", "subject": "S", "message": "M" }));
        assert_eq!(
            validate(&payload),
            Err(ValidationError::MissingField("name"))
        );
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["foo", "foo@bar", "@bar.com", "foo@.com", "foo@bar.", "a b@c.com", "a@b@c.com"] {
            let mut payload = valid();
            payload.insert("email".into(), json!(email));
            assert_eq!(
                validate(&payload),
                Err(ValidationError::InvalidEmail),
                "{email}"
            );
        }
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("john.smith@example.com"));
        assert!(is_valid_email("x@y.co.uk"));
        assert!(is_valid_email("first+tag@sub.domain.io"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut payload = valid();
        payload.insert("phone".into(), json!("123"));
        assert_eq!(
            validate(&payload),
            Err(ValidationError::UnknownField("phone".into()))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingField("name").to_string(),
            "Missing required fields"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Invalid email format"
        );
        assert_eq!(
            ValidationError::UnknownField("x".into()).to_string(),
            "Unexpected field: x"
        );
    }
}
