//! Error types for the HTTP transport.

use thiserror::Error;

/// A failed HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpTransportError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code.
        status: u16,

        /// The response body, lossily decoded.
        body: String,
    },
}

impl HttpTransportError {
    /// The HTTP status, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::UnexpectedStatus { status, .. } => Some(*status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_display() {
        let err = HttpTransportError::UnexpectedStatus {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "unexpected status 503: overloaded");
        assert_eq!(err.status(), Some(503));
    }
}
