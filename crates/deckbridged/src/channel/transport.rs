//! Text-message transports carrying the host protocol.

use std::net::TcpStream;

use tracing::{debug, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::errors::ChannelError;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Bidirectional stream of text messages.
///
/// Implementations hide framing: control and binary frames never reach the
/// session.
pub trait Transport {
    /// Sends one text message.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Transport`] when the write fails.
    fn send(&mut self, text: &str) -> Result<(), ChannelError>;

    /// Blocks until the next text message arrives.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Transport`] when the read fails.
    fn receive(&mut self) -> Result<Option<String>, ChannelError>;
}

/// WebSocket client connection to the host.
#[derive(Debug)]
pub struct WebSocketTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Performs the WebSocket handshake with `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Connect`] if the TCP connection or the
    /// handshake fails.
    pub fn connect(endpoint: &str) -> Result<Self, ChannelError> {
        let (socket, response) =
            tungstenite::connect(endpoint).map_err(|source| ChannelError::Connect {
                endpoint: endpoint.to_owned(),
                source: Box::new(source),
            })?;
        debug!(
            target: TRANSPORT_TARGET,
            endpoint,
            status = response.status().as_u16(),
            "websocket handshake completed"
        );
        Ok(Self { socket })
    }
}

fn transport_error(source: tungstenite::Error) -> ChannelError {
    ChannelError::Transport {
        source: Box::new(source),
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        self.socket.send(Message::text(text)).map_err(transport_error)
    }

    fn receive(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Close(frame)) => {
                    debug!(target: TRANSPORT_TARGET, ?frame, "host closed the channel");
                    return Ok(None);
                }
                Ok(other) => {
                    trace!(target: TRANSPORT_TARGET, len = other.len(), "ignoring non-text frame");
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(source) => return Err(transport_error(source)),
            }
        }
    }
}
