//! # Bayeux Core
//!
//! Transport-agnostic client runtime for the Bayeux publish/subscribe
//! protocol.
//!
//! Bayeux emulates a server-push channel over repeated request/response
//! exchanges against a single endpoint. Every exchange carries a JSON array
//! of [`BayeuxMessage`]s in both directions:
//!
//! ```text
//! ┌──────────┐                                  ┌──────────┐
//! │  Client  │                                  │  Server  │
//! └────┬─────┘                                  └────┬─────┘
//!      │  [{channel: /meta/handshake}]               │
//!      │ ──────────────────────────────────────────► │
//!      │  [{clientId: "abc", successful: true}]      │
//!      │ ◄────────────────────────────────────────── │
//!      │                                             │
//!      │  [{channel: /meta/subscribe,                │
//!      │    subscription: /foo}]                     │
//!      │ ──────────────────────────────────────────► │
//!      │  [{successful: true}]                       │
//!      │ ◄────────────────────────────────────────── │
//!      │                                             │
//!      │  [{channel: /meta/connect}]                 │
//!      │ ──────────────────────────────────────────► │
//!      │           ... (held open) ...               │
//!      │  [{channel: /foo, data: {...}}, ...]        │
//!      │ ◄────────────────────────────────────────── │
//!      │                                             │
//!      │  [{channel: /meta/disconnect}]              │
//!      │ ──────────────────────────────────────────► │
//!      │  [{successful: true}]                       │
//!      │ ◄────────────────────────────────────────── │
//! ```
//!
//! The byte-level exchange is delegated to a [`Transport`]; this crate owns
//! the session, the subscription registry, and the background poll loop.

pub mod channel;
pub mod client;
pub mod client_id;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod registry;
pub mod retry;
pub mod transport;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use client::BayeuxClient;
pub use client_id::ClientId;
pub use config::ClientConfig;
pub use error::{ClientError, ProtocolError};
pub use message::BayeuxMessage;
pub use registry::{Callback, Subscription};
pub use retry::RetryPolicy;
pub use transport::Transport;

/// Content type of every request and response body.
pub const CONTENT_TYPE: &str = "application/json";
