//! Error types for client operations.

use thiserror::Error;

/// A boxed error produced by a [`Transport`](crate::Transport).
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Problem while performing a client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The outbound batch could not be serialized.
    #[error("encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The exchange with the server could not complete.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body was not a JSON array of messages.
    #[error("decoding error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The server answered, but the answer signals failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// `connect` was called while the poll loop is already running.
    #[error("connect loop already running")]
    AlreadyRunning,
}

impl ClientError {
    /// Whether the exchange itself failed, as opposed to a well-formed
    /// response reporting failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }

    /// The protocol failure, if this is one.
    #[must_use]
    pub const fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

/// A well-formed response that reports failure or lacks a required field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The server answered with an empty batch.
    #[error("empty response to {channel}")]
    EmptyResponse {
        /// Channel of the request.
        channel: String,
    },

    /// The handshake response carried no session id.
    #[error("no clientId in handshake response")]
    MissingClientId,

    /// `successful` was absent or `false`.
    #[error("{channel} failed: {}", .error.as_deref().unwrap_or("no error text"))]
    Unsuccessful {
        /// Channel of the request.
        channel: String,

        /// Server-supplied error text.
        error: Option<String>,
    },
}

impl ProtocolError {
    /// Server-supplied error text, when present.
    #[must_use]
    pub fn server_error(&self) -> Option<&str> {
        match self {
            Self::Unsuccessful { error, .. } => error.as_deref(),
            Self::EmptyResponse { .. } | Self::MissingClientId => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_running_displays() {
        assert_eq!(
            format!("{}", ClientError::AlreadyRunning),
            "connect loop already running"
        );
    }

    #[test]
    fn unsuccessful_includes_server_text() {
        let err = ClientError::from(ProtocolError::Unsuccessful {
            channel: "/foo".into(),
            error: Some("boom".into()),
        });
        assert_eq!(format!("{err}"), "protocol error: /foo failed: boom");
        assert_eq!(err.as_protocol().and_then(ProtocolError::server_error), Some("boom"));
        assert!(!err.is_transport());
    }

    #[test]
    fn unsuccessful_without_text_displays() {
        let err = ProtocolError::Unsuccessful {
            channel: "/meta/subscribe".into(),
            error: None,
        };
        assert_eq!(format!("{err}"), "/meta/subscribe failed: no error text");
    }

    #[test]
    fn transport_and_decode_are_transport_failures() {
        let io = std::io::Error::other("refused");
        assert!(ClientError::Transport(Box::new(io)).is_transport());

        let decode = serde_json::from_slice::<Vec<u8>>(b"nope");
        if let Err(e) = decode {
            assert!(ClientError::Decode(e).is_transport());
        }
    }
}
