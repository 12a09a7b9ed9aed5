//! Contact notification delivery
//!
//! Forwards validated submissions to a transactional email API. Delivery is
//! best-effort: the router runs it as a detached task and only logs the result.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::task::TaskTracker;

use super::validator::ContactSubmission;
use crate::config::NotifierConfig;
use crate::http::escape_html;
use crate::logger;

/// Delivery failures. Never shown to the visitor.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier misconfigured: {0}")]
    Config(String),
    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &ContactSubmission) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// Build the notifier described by configuration.
///
/// Without an API key delivery is disabled and a [`NoopNotifier`] is returned.
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config.api_key.as_deref() {
        None | Some("") => Ok(Arc::new(NoopNotifier)),
        Some(_) => Ok(Arc::new(ResendNotifier::new(config)?)),
    }
}

/// Spawn delivery on `tasks`; the caller never waits on it.
///
/// Shutdown waits on the same tracker so in-flight deliveries can finish.
pub fn dispatch(
    tasks: &TaskTracker,
    notifier: Arc<dyn Notifier>,
    submission: ContactSubmission,
) {
    tasks.spawn(async move {
        match notifier.notify(&submission).await {
            Ok(()) => logger::log_notify_sent(notifier.name(), &submission.email),
            Err(e) => logger::log_notify_failed(notifier.name(), &e),
        }
    });
}

/// Used when no delivery credentials are configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _submission: &ContactSubmission) -> Result<(), NotifyError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Resend (<https://resend.com>) HTTP API client
pub struct ResendNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    to: String,
    from: String,
    subject_prefix: String,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: String,
    html: String,
}

impl ResendNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| NotifyError::Config("notifier.api_key is not set".into()))?;
        let to = config
            .to
            .clone()
            .ok_or_else(|| NotifyError::Config("notifier.to is required".into()))?;
        let from = config
            .from
            .clone()
            .ok_or_else(|| NotifyError::Config("notifier.from is required".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            to,
            from,
            subject_prefix: config.subject_prefix.clone(),
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        let email = EmailRequest {
            from: &self.from,
            to: &self.to,
            reply_to: &submission.email,
            subject: format!("{}{}", self.subject_prefix, submission.subject),
            html: render_email(submission, &chrono::Utc::now().to_rfc3339()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

/// Render the notification body. All submitted text is HTML-escaped.
fn render_email(submission: &ContactSubmission, submitted_at: &str) -> String {
    let company = submission
        .company
        .as_deref()
        .map_or_else(|| "Not provided".to_string(), escape_html);
    let message = escape_html(&submission.message).replace('\n', "<br>");

    format!(
        "<h2>New Portfolio Contact Form Submission</h2>\n\
         <p><strong>From:</strong> {name} ({email})</p>\n\
         <p><strong>Company:</strong> {company}</p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{message}</p>\n\
         <hr>\n\
         <p>Submitted at: {submitted_at}</p>\n",
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        subject = escape_html(&submission.subject),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "John <b>Smith</b>".into(),
            email: "john@example.com".into(),
            company: None,
            subject: "Partnership".into(),
            message: "line one\nline two".into(),
        }
    }

    fn resend_config(endpoint: String) -> NotifierConfig {
        NotifierConfig {
            api_key: Some("re_test".into()),
            endpoint,
            to: Some("me@example.com".into()),
            from: Some("noreply@example.com".into()),
            ..NotifierConfig::default()
        }
    }

    /// One-shot HTTP server answering with `status`; returns the raw request
    async fn serve_once(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let body = "{\"message\":\"nope\"}";
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{addr}/emails"), handle)
    }

    #[test]
    fn test_render_email_escapes_input() {
        let html = render_email(&submission(), "2026-01-01T00:00:00+00:00");
        assert!(html.contains("John &lt;b&gt;Smith&lt;/b&gt; (john@example.com)"));
        assert!(html.contains("<strong>Company:</strong> Not provided"));
        assert!(html.contains("line one<br>line two"));
        assert!(html.contains("Submitted at: 2026-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_from_config_without_key_is_noop() {
        let notifier = from_config(&NotifierConfig::default()).unwrap();
        assert_eq!(notifier.name(), "noop");

        let empty_key = NotifierConfig {
            api_key: Some(String::new()),
            ..NotifierConfig::default()
        };
        assert_eq!(from_config(&empty_key).unwrap().name(), "noop");
    }

    #[test]
    fn test_resend_requires_addresses() {
        let config = NotifierConfig {
            api_key: Some("re_test".into()),
            ..NotifierConfig::default()
        };
        assert!(matches!(
            ResendNotifier::new(&config),
            Err(NotifyError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_noop_always_succeeds() {
        assert!(NoopNotifier.notify(&submission()).await.is_ok());
    }

    #[tokio::test]
    async fn test_resend_sends_authorized_json() {
        let (endpoint, server) = serve_once("200 OK").await;
        let notifier = ResendNotifier::new(&resend_config(endpoint)).unwrap();

        notifier.notify(&submission()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /emails"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer re_test"));
        assert!(request.contains("\"subject\":\"Portfolio Contact: Partnership\""));
        assert!(request.contains("\"reply_to\":\"john@example.com\""));
    }

    #[tokio::test]
    async fn test_resend_rejection_is_reported() {
        let (endpoint, server) = serve_once("422 Unprocessable Entity").await;
        let notifier = ResendNotifier::new(&resend_config(endpoint)).unwrap();

        let err = notifier.notify(&submission()).await.unwrap_err();
        server.await.unwrap();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_resend_transport_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = ResendNotifier::new(&resend_config(format!("http://{addr}/emails"))).unwrap();
        assert!(matches!(
            notifier.notify(&submission()).await,
            Err(NotifyError::Transport(_))
        ));
    }
}
