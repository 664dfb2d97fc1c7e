//! Fatal channel failures.

use thiserror::Error;

/// Errors that end the channel session.
///
/// Unlike action failures, which are reported to the host and swallowed,
/// these terminate the run loop and the process.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A channel is already open in this process.
    #[error("a host channel is already open in this process")]
    AlreadyOpen,

    /// The connection to the host could not be established.
    #[error("failed to connect to host at {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialled.
        endpoint: String,
        /// Transport failure.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// The open connection failed while reading or writing.
    #[error("host channel transport failed: {source}")]
    Transport {
        /// Transport failure.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// An outbound message could not be serialised.
    #[error("failed to serialise {event} message: {source}")]
    Serialize {
        /// Event name of the message.
        event: String,
        /// Serialiser error.
        #[source]
        source: serde_json::Error,
    },
}
