//! Discord webhook delivery.
//!
//! A webhook can post under an arbitrary username, which is what lets the
//! bridge show IRC nicks as message authors without a bot account.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::common::error::DeliveryError;

/// One Discord webhook: an endpoint id and its secret token.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub id: String,
    pub token: String,
}

impl WebhookTarget {
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTarget")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// JSON body of an execute-webhook request.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// HTTP client for executing webhooks.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    api_base: String,
}

impl WebhookClient {
    /// Create a client posting to `api_base` (e.g. `https://discord.com/api`).
    pub fn new(api_base: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the execute endpoint for `target`.
    pub fn url(&self, target: &WebhookTarget) -> String {
        format!("{}/webhooks/{}/{}", self.api_base, target.id, target.token)
    }

    /// Post `content` to `target` under `username`.
    pub async fn execute(
        &self,
        target: &WebhookTarget,
        username: &str,
        content: &str,
    ) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(self.url(target))
            .json(&WebhookPayload { content, username })
            .send()
            .await
            .map_err(|source| DeliveryError::Request {
                webhook_id: target.id.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            webhook_id: target.id.clone(),
            status,
            body,
        })
    }
}

/// `User-Agent` sent with every webhook request.
pub fn user_agent() -> String {
    format!(
        "{} v{} (via webhooks)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one HTTP request, answer with `status_line` and return the raw request.
    async fn serve_once(listener: TcpListener, status_line: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!("{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8(raw).unwrap()
    }

    #[test]
    fn test_debug_redacts_token() {
        let target = WebhookTarget::new("1", "super-secret");
        let debug = format!("{:?}", target);
        assert!(debug.contains("\"1\""));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_url() {
        let client = WebhookClient::new("https://discord.com/api/").unwrap();
        let target = WebhookTarget::new("42", "tok");
        assert_eq!(client.url(&target), "https://discord.com/api/webhooks/42/tok");
    }

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload {
            content: "hello",
            username: "bob",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({ "content": "hello", "username": "bob" }));
    }

    #[test]
    fn test_user_agent() {
        assert!(user_agent().starts_with("ircwebhook v"));
        assert!(user_agent().ends_with("(via webhooks)"));
    }

    #[tokio::test]
    async fn test_execute_posts_json() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "HTTP/1.1 204 No Content"));

        let client = WebhookClient::new(&format!("http://{}", addr)).unwrap();
        let target = WebhookTarget::new("7", "abc");
        tokio_test::assert_ok!(client.execute(&target, "bob", "hello").await);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /webhooks/7/abc "));
        assert!(request.contains(r#""content":"hello""#));
        assert!(request.contains(r#""username":"bob""#));
        assert!(request.to_lowercase().contains("user-agent: ircwebhook v"));
    }

    #[tokio::test]
    async fn test_execute_reports_rejection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "HTTP/1.1 404 Not Found"));

        let client = WebhookClient::new(&format!("http://{}", addr)).unwrap();
        let result = client.execute(&WebhookTarget::new("7", "abc"), "bob", "hi").await;
        server.await.unwrap();

        match result {
            Err(DeliveryError::Rejected { webhook_id, status, .. }) => {
                assert_eq!(webhook_id, "7");
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_connection_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WebhookClient::new(&format!("http://{}", addr)).unwrap();
        let result = client.execute(&WebhookTarget::new("7", "abc"), "bob", "hi").await;
        assert!(matches!(result, Err(DeliveryError::Request { .. })));
    }
}
