//! WebSocket push-notification feed.
//!
//! Owns the connection to the ledger's notification endpoint, decodes event
//! frames, and fans them out on a broadcast channel. Reconnects with capped
//! exponential backoff; subscribers simply see a gap, which the read-model
//! synchronizer tolerates (every refetch observes ledger state at-or-after
//! its trigger).

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::event::LedgerEvent;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// The ledger's push-notification channel.
pub struct EventFeed {
    ws_url: String,
    tx: broadcast::Sender<LedgerEvent>,
}

impl EventFeed {
    pub fn new(ws_url: impl Into<String>, tx: broadcast::Sender<LedgerEvent>) -> Self {
        Self {
            ws_url: ws_url.into(),
            tx,
        }
    }

    /// Run the feed until the task is dropped or aborted.
    ///
    /// Intended to be spawned: `tokio::spawn(feed.run())`.
    pub async fn run(self) {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match connect_async(self.ws_url.as_str()).await {
                Ok((stream, _)) => {
                    info!(url = %self.ws_url, "connected to ledger event feed");
                    backoff = INITIAL_BACKOFF;
                    self.pump(stream).await;
                    warn!(url = %self.ws_url, "ledger event feed disconnected");
                }
                Err(e) => {
                    warn!(url = %self.ws_url, "event feed connect failed: {e}");
                }
            }
            sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// Read frames off one connection until it drops.
    async fn pump(&self, stream: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        let (mut sink, mut source) = stream.split();

        while let Some(msg_result) = source.next().await {
            let msg = match msg_result {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("event feed receive error: {e}");
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<LedgerEvent>(&text) {
                    Ok(event) => {
                        debug!(kind = %event.kind(), "ledger event");
                        // Send only fails when no subscriber exists yet.
                        let _ = self.tx.send(event);
                    }
                    Err(e) => warn!("undecodable ledger event: {e}"),
                },
                Message::Ping(data) => {
                    if sink.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    debug!("ledger event feed sent close frame");
                    break;
                }
                _ => {}
            }
        }
    }
}
