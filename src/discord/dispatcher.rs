//! Relay dispatcher: fans an envelope out to every webhook of its room.
//!
//! Delivery is fire-and-forget. Each post runs as its own tokio task whose
//! only continuation logs a failure; nothing is awaited, retried or reported
//! back to the caller.

use std::sync::Arc;

use tracing::{debug, error};

use crate::common::RelayEnvelope;
use crate::discord::webhook::{WebhookClient, WebhookTarget};

/// Sink for envelopes routed by the bridge.
pub trait Dispatch {
    /// Deliver `envelope` to each of `targets`. Must not block.
    fn dispatch(&self, targets: &[WebhookTarget], envelope: RelayEnvelope);
}

/// Dispatcher posting through Discord webhooks.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: Arc<WebhookClient>,
}

impl WebhookDispatcher {
    pub fn new(client: WebhookClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Dispatch for WebhookDispatcher {
    fn dispatch(&self, targets: &[WebhookTarget], envelope: RelayEnvelope) {
        let envelope = Arc::new(envelope);

        for target in targets {
            let client = Arc::clone(&self.client);
            let target = target.clone();
            let envelope = Arc::clone(&envelope);

            tokio::spawn(async move {
                match client
                    .execute(&target, &envelope.display_name, &envelope.text)
                    .await
                {
                    Ok(()) => debug!(room = %envelope.room, webhook = %target.id, "Relayed message"),
                    Err(e) => error!(room = %envelope.room, "Failed to relay message: {}", e),
                }
            });
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use tokio::net::TcpListener;

    /// One recorded call to [`RecordingDispatcher`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct Delivery {
        pub room: String,
        pub display_name: String,
        pub text: String,
        pub targets: Vec<String>,
    }

    /// Test double that records envelopes instead of posting them.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingDispatcher {
        sent: Rc<RefCell<Vec<Delivery>>>,
    }

    impl RecordingDispatcher {
        pub(crate) fn deliveries(&self) -> Vec<Delivery> {
            self.sent.borrow().clone()
        }

        /// `(room, display_name, text)` triples in dispatch order.
        pub(crate) fn triples(&self) -> Vec<(String, String, String)> {
            self.sent
                .borrow()
                .iter()
                .map(|d| (d.room.clone(), d.display_name.clone(), d.text.clone()))
                .collect()
        }
    }

    impl Dispatch for RecordingDispatcher {
        fn dispatch(&self, targets: &[WebhookTarget], envelope: RelayEnvelope) {
            self.sent.borrow_mut().push(Delivery {
                room: envelope.room,
                display_name: envelope.display_name,
                text: envelope.text,
                targets: targets.iter().map(|t| t.id.clone()).collect(),
            });
        }
    }

    #[tokio::test]
    async fn test_dispatch_fans_out_on_one_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = WebhookDispatcher::new(WebhookClient::new(&format!("http://{}", addr)).unwrap());

        dispatcher.dispatch(
            &[WebhookTarget::new("1", "t1"), WebhookTarget::new("2", "t2")],
            RelayEnvelope::new("#a", "ChanServ", "bob joined."),
        );

        let mut paths = Vec::new();
        for _ in 0..2 {
            let request = serve_once_from(&listener).await;
            paths.push(request.split_whitespace().nth(1).unwrap().to_string());
        }
        paths.sort();
        assert_eq!(paths, vec!["/webhooks/1/t1", "/webhooks/2/t2"]);
    }

    async fn serve_once_from(listener: &TcpListener) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&raw).contains("}") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 204 No Content\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await
            .unwrap();
        String::from_utf8(raw).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_failure_does_not_propagate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher = WebhookDispatcher::new(WebhookClient::new(&format!("http://{}", addr)).unwrap());
        dispatcher.dispatch(&[WebhookTarget::new("1", "t1")], RelayEnvelope::new("#a", "bob", "hi"));

        // The failing task only logs; give it a moment to run to completion.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    #[test]
    fn test_recording_dispatcher_records_targets() {
        let recorder = RecordingDispatcher::default();
        recorder.dispatch(
            &[WebhookTarget::new("1", "t1"), WebhookTarget::new("2", "t2")],
            RelayEnvelope::new("#a", "bob", "hi"),
        );

        let deliveries = recorder.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].targets, vec!["1", "2"]);
    }
}
