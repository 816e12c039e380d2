//! Reserved channel names.
//!
//! Channels under `/meta/` are protocol control channels. Every other
//! channel string is application-defined.

/// Establishes a session and yields a [`ClientId`](crate::ClientId).
pub const HANDSHAKE: &str = "/meta/handshake";

/// Registers interest in an application channel.
pub const SUBSCRIBE: &str = "/meta/subscribe";

/// The long-poll request used for message delivery.
pub const CONNECT: &str = "/meta/connect";

/// Ends the session.
pub const DISCONNECT: &str = "/meta/disconnect";

const META_PREFIX: &str = "/meta/";

/// Whether `channel` is a protocol control channel.
#[must_use]
pub fn is_meta(channel: &str) -> bool {
    channel.starts_with(META_PREFIX)
}
