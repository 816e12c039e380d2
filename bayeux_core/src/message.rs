//! The Bayeux wire message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{channel, client_id::ClientId};

/// Arbitrary key-value payload carried on the `data` field.
pub type Payload = Map<String, Value>;

/// A single record in a request or response batch.
///
/// Optional fields are omitted when serializing and may be absent when
/// decoding. Fields this client does not interpret (`id`, `advice`,
/// `version`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayeuxMessage {
    /// Target channel, always present.
    pub channel: String,

    /// Session id, present once a session exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,

    /// Application payload on publish and delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,

    /// Channel named by a subscribe request or response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,

    /// Outcome of a meta or publish request. Absent is distinct from `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,

    /// Server-supplied failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BayeuxMessage {
    /// A bare message on `channel` with every optional field absent.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Self::default()
        }
    }

    /// Handshake request. Carries no session id.
    #[must_use]
    pub fn handshake() -> Self {
        Self::new(channel::HANDSHAKE)
    }

    /// Subscribe request for `subscription`.
    #[must_use]
    pub fn subscribe(client_id: Option<ClientId>, subscription: impl Into<String>) -> Self {
        Self {
            client_id,
            subscription: Some(subscription.into()),
            ..Self::new(channel::SUBSCRIBE)
        }
    }

    /// Publish `data` on an application channel.
    #[must_use]
    pub fn publish(client_id: Option<ClientId>, channel: impl Into<String>, data: Payload) -> Self {
        Self {
            client_id,
            data: Some(data),
            ..Self::new(channel)
        }
    }

    /// Long-poll request.
    #[must_use]
    pub fn connect(client_id: Option<ClientId>) -> Self {
        Self {
            client_id,
            ..Self::new(channel::CONNECT)
        }
    }

    /// Disconnect request.
    #[must_use]
    pub fn disconnect(client_id: Option<ClientId>) -> Self {
        Self {
            client_id,
            ..Self::new(channel::DISCONNECT)
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: Payload) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a session id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Mark as a response with the given outcome.
    #[must_use]
    pub fn with_successful(mut self, successful: bool) -> Self {
        self.successful = Some(successful);
        self
    }

    /// Attach server error text.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// True only when `successful` is present and `true`.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.successful == Some(true)
    }

    /// Whether this message travels on a `/meta/` channel.
    #[must_use]
    pub fn is_meta(&self) -> bool {
        channel::is_meta(&self.channel)
    }
}

/// Encode a batch. Bayeux bodies are always arrays, even for one message.
///
/// # Errors
///
/// Returns the serializer error if a payload cannot be represented as JSON.
pub fn encode_batch(batch: &[BayeuxMessage]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(batch)
}

/// Decode a response body into a batch.
///
/// # Errors
///
/// Returns the deserializer error if `body` is not a JSON array of messages.
pub fn decode_batch(body: &[u8]) -> Result<Vec<BayeuxMessage>, serde_json::Error> {
    serde_json::from_slice(body)
}
