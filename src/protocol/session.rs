//! A single IRC connection, from registration to disconnect.

use std::time::Duration;

use futures::StreamExt;
use irc::client::{Client, ClientStream};
use irc::proto::{Command, Message};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::common::error::ConnectionResult;
use crate::common::{IrcEvent, ProtocolAction};
use crate::discord::Dispatch;

use super::events::EventTranslator;
use super::format::ctcp_reply;
use super::sasl::SaslPlain;

/// How long to wait for the server to close the link after QUIT.
const QUIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the connection.
    Disconnected,
    /// We quit because of a shutdown signal.
    Shutdown,
}

pub struct Session {
    client: Client,
    stream: ClientStream,
    translator: EventTranslator,
    sasl: Option<SaslPlain>,
    /// Departure message for QUIT.
    leave: String,
    registered: bool,
}

impl Session {
    pub fn new(
        client: Client,
        stream: ClientStream,
        translator: EventTranslator,
        sasl: Option<SaslPlain>,
        leave: String,
    ) -> Self {
        Self {
            client,
            stream,
            translator,
            sasl,
            leave,
            registered: false,
        }
    }

    /// Whether the server accepted our registration during this session.
    pub fn registered(&self) -> bool {
        self.registered
    }

    /// Feed every message to the bridge until the connection ends or
    /// `shutdown_rx` turns true.
    pub async fn run<D: Dispatch>(
        &mut self,
        bridge: &mut Bridge<D>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> ConnectionResult<SessionEnd> {
        loop {
            tokio::select! {
                message = self.stream.next() => {
                    match message {
                        Some(Ok(message)) => self.handle_message(bridge, message)?,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(SessionEnd::Disconnected),
                    }
                }

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        self.quit().await;
                        return Ok(SessionEnd::Shutdown);
                    }
                }
            }
        }
    }

    fn handle_message<D: Dispatch>(
        &mut self,
        bridge: &mut Bridge<D>,
        message: Message,
    ) -> ConnectionResult<()> {
        if let Some(reply) = self.sasl.as_ref().and_then(|sasl| sasl.respond(&message.command)) {
            self.client.send(reply)?;
        }

        for event in self.translator.translate(&message) {
            let rejoin = match &event {
                IrcEvent::Registered { .. } => {
                    self.registered = true;
                    None
                }
                IrcEvent::Kick { channel, nick, .. } if nick == self.translator.nick() => {
                    Some(channel.clone())
                }
                _ => None,
            };

            if let Some(action) = bridge.handle(event) {
                self.perform(action)?;
            }

            if let Some(channel) = rejoin {
                info!("Rejoining {}...", channel);
                self.client.send(Command::JOIN(channel, None, None))?;
            }
        }

        Ok(())
    }

    fn perform(&self, action: ProtocolAction) -> ConnectionResult<()> {
        match action {
            ProtocolAction::CtcpVersionReply { to, version } => {
                debug!("Answering CTCP VERSION from {}", to);
                self.client
                    .send(Command::NOTICE(to, ctcp_reply("VERSION", &version)))?;
            }
        }
        Ok(())
    }

    /// Send QUIT and keep polling until the server closes the link, so the
    /// QUIT actually leaves the outgoing queue.
    async fn quit(&mut self) {
        info!("Disconnecting from IRC...");
        if let Err(e) = self.client.send(Command::QUIT(Some(self.leave.clone()))) {
            warn!("Failed to send QUIT: {}", e);
            return;
        }

        let stream = &mut self.stream;
        let drain = async { while let Some(Ok(_)) = stream.next().await {} };
        if tokio::time::timeout(QUIT_TIMEOUT, drain).await.is_err() {
            warn!("Server did not close the connection within {}s", QUIT_TIMEOUT.as_secs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::net::TcpListener;

    use crate::config::types::{make_test_config, Config};
    use crate::discord::dispatcher::tests::RecordingDispatcher;
    use crate::protocol::connect;

    /// Server side of one accepted connection.
    struct FakeServer {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
        received: Vec<String>,
    }

    impl FakeServer {
        async fn accept(listener: TcpListener) -> Self {
            let (socket, _) = listener.accept().await.unwrap();
            let (reader, writer) = socket.into_split();
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
                received: Vec::new(),
            }
        }

        /// Read client lines until one starts with `prefix`.
        async fn expect(&mut self, prefix: &str) {
            loop {
                let line = self
                    .lines
                    .next_line()
                    .await
                    .unwrap()
                    .unwrap_or_else(|| panic!("connection closed before {:?}", prefix));
                let found = line.starts_with(prefix);
                self.received.push(line);
                if found {
                    return;
                }
            }
        }

        async fn send(&mut self, lines: &[&str]) {
            for line in lines {
                self.writer
                    .write_all(format!("{}\r\n", line).as_bytes())
                    .await
                    .unwrap();
            }
        }
    }

    async fn local_config() -> (Config, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = make_test_config();
        config.host = "127.0.0.1".to_string();
        config.port = listener.local_addr().unwrap().port();
        config.secure = false;
        config.leave = "bye all".to_string();
        (config, listener)
    }

    #[tokio::test]
    async fn test_rejoin_after_kick_and_quit_on_shutdown() {
        let (config, listener) = local_config().await;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(listener).await;
            server.expect("USER").await;
            server
                .send(&[
                    ":irc.test 001 bridge :Welcome",
                    ":irc.test 376 bridge :End of MOTD",
                ])
                .await;
            server.expect("JOIN #a").await;
            server
                .send(&[":bridge!u@host JOIN #a", ":op!u@host KICK #a bridge :spam"])
                .await;
            server.expect("JOIN #a").await;
            shutdown_tx.send(true).unwrap();
            server.expect("QUIT").await;
            server.received
        });

        let recorder = RecordingDispatcher::default();
        let mut bridge = Bridge::new(&config, recorder.clone());
        let mut session = connect(&config, &["#a".to_string()]).await.unwrap();

        let end = tokio::time::timeout(
            Duration::from_secs(10),
            session.run(&mut bridge, &mut shutdown_rx),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(end, SessionEnd::Shutdown);
        assert!(session.registered());

        let received = server.await.unwrap();
        assert!(received.contains(&"NICK bridge".to_string()), "{:?}", received);
        assert_eq!(received.iter().filter(|line| *line == "JOIN #a").count(), 2);
        assert_eq!(received.last().map(String::as_str), Some("QUIT :bye all"));

        assert_eq!(
            recorder.triples(),
            vec![(
                "#a".to_string(),
                "ChanServ".to_string(),
                "op kick bridge: *spam*".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_sasl_exchange() {
        let (mut config, listener) = local_config().await;
        config.sasl = true;
        config.password = Some("hunter2".to_string());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(listener).await;
            server.expect("USER").await;
            server.send(&[":irc.test CAP * ACK :sasl"]).await;
            server.expect("AUTHENTICATE").await;
            server.send(&["AUTHENTICATE +"]).await;
            server.expect("AUTHENTICATE").await;
            server
                .send(&[":irc.test 903 bridge :SASL authentication successful"])
                .await;
            server.expect("CAP END").await;
            shutdown_tx.send(true).unwrap();
            server.expect("QUIT").await;
            server.received
        });

        let mut bridge = Bridge::new(&config, RecordingDispatcher::default());
        let mut session = connect(&config, &["#a".to_string()]).await.unwrap();

        let end = tokio::time::timeout(
            Duration::from_secs(10),
            session.run(&mut bridge, &mut shutdown_rx),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(end, SessionEnd::Shutdown);
        assert!(!session.registered());

        let received = server.await.unwrap();
        assert_eq!(received.first().map(String::as_str), Some("CAP REQ sasl"));
        assert!(!received.iter().any(|line| line.starts_with("PASS")));
        assert!(received.contains(&"AUTHENTICATE PLAIN".to_string()));
        assert!(received.contains(&"AUTHENTICATE YnJpZGdlAGJyaWRnZQBodW50ZXIy".to_string()));
        assert!(received.contains(&"CAP END".to_string()));
    }

    #[tokio::test]
    async fn test_server_close_ends_registered_session() {
        let (config, listener) = local_config().await;
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(listener).await;
            server.expect("USER").await;
            server.send(&[":irc.test 001 bridge :Welcome"]).await;
            // Dropping the server closes the connection.
        });

        let mut bridge = Bridge::new(&config, RecordingDispatcher::default());
        let mut session = connect(&config, &[]).await.unwrap();

        let end = tokio::time::timeout(
            Duration::from_secs(10),
            session.run(&mut bridge, &mut shutdown_rx),
        )
        .await
        .unwrap();
        server.await.unwrap();

        // Depending on timing the close surfaces as end-of-stream or a read error.
        assert_ne!(end.ok(), Some(SessionEnd::Shutdown));
        assert!(session.registered());
    }
}
