//! Transport seam.
//!
//! The runtime speaks to a node through these traits so production can use
//! a real WebSocket while tests drive a scripted in-memory transport. The
//! traits model the one thing the protocol needs: an ordered, fallible
//! stream of text messages with an explicit close.

use std::io;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::debug;

/// Dialer for a node endpoint.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// The established connection type.
    type Connection: TransportConnection;

    /// Dial one endpoint and complete the protocol handshake.
    ///
    /// The caller bounds this with its own attempt timeout; implementations
    /// need not enforce one.
    async fn connect(&self, endpoint: &str) -> io::Result<Self::Connection>;
}

/// One live connection to a node.
#[async_trait]
pub trait TransportConnection: Send + 'static {
    /// Send one text message.
    async fn send(&mut self, text: String) -> io::Result<()>;

    /// Receive the next text message.
    ///
    /// Returns `None` once the connection is closed, by either side or by a
    /// transport fault. Non-text frames are consumed internally.
    async fn recv(&mut self) -> Option<String>;

    /// Close the connection. Safe to call on an already-dead connection.
    async fn close(&mut self);
}

/// Production WebSocket transport (TLS via rustls/webpki roots).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn connect(&self, endpoint: &str) -> io::Result<WebSocketConnection> {
        let (stream, _response) = connect_async(endpoint).await.map_err(io::Error::other)?;
        Ok(WebSocketConnection { stream })
    }
}

/// A live WebSocket session.
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TransportConnection for WebSocketConnection {
    async fn send(&mut self, text: String) -> io::Result<()> {
        self.stream.send(Message::Text(text.into())).await.map_err(io::Error::other)
    }

    async fn recv(&mut self) -> Option<String> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "peer closed the websocket");
                    return None;
                }
                // Pings are answered by the library; pongs and binary
                // frames carry nothing this protocol uses.
                Ok(_) => {}
                Err(error) => {
                    debug!(%error, "websocket read failed");
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
