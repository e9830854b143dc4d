//! Client error types.

use std::time::Duration;

use thiserror::Error;

use zello_protocol::{ProtocolError, errors};

use crate::session::ConnectionState;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
///
/// `Clone` so that one session failure can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// A command was sent while the socket was not open.
    #[error("cannot send command: socket state is {state}")]
    NotConnected { state: ConnectionState },

    /// No response arrived within the caller's deadline.
    #[error("command `{command}` timed out after {}ms", timeout.as_millis())]
    CommandTimeout { command: String, timeout: Duration },

    /// No matching event arrived within the caller's deadline.
    #[error("no `{event}` event within {}ms", timeout.as_millis())]
    EventTimeout { event: String, timeout: Duration },

    /// The server answered with a named error.
    #[error("{0}")]
    Application(String),

    /// Socket failure or a close nobody asked for.
    #[error("{0}")]
    Transport(String),

    /// Malformed frame or header.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Credentials failed local validation.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Audio encoder or decoder failure.
    #[error("audio error: {0}")]
    Audio(String),

    /// Image resizer failure.
    #[error("image error: {0}")]
    Image(String),
}

impl ClientError {
    /// Creates an application error from a server error string.
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(message.into())
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// True for the one server error worth retrying.
    pub fn is_channel_busy(&self) -> bool {
        matches!(self, Self::Application(msg) if msg == errors::CHANNEL_BUSY)
    }

    /// True when the connection itself is gone.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::NotConnected { .. })
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("invalid JSON: {}", err))
    }
}
