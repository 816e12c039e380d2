//! Session identity issued by the server.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The session identifier returned by a successful handshake.
///
/// The server chooses the format; the client treats it as an opaque token
/// and attaches it to every subsequent request.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Wrap a server-issued identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the server sent an empty identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_string() {
        let id = ClientId::new("abc");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc\""));
    }

    #[test]
    fn debug_wraps_display_does_not() {
        let id = ClientId::new("abc");
        assert_eq!(format!("{id:?}"), "ClientId(abc)");
        assert_eq!(format!("{id}"), "abc");
    }

    #[test]
    fn empty_is_detected() {
        assert!(ClientId::new("").is_empty());
        assert!(!ClientId::from("x").is_empty());
    }
}
