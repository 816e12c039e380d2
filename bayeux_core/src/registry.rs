//! Channel → handler registry.
//!
//! Handlers are stored per channel in subscription order. Each registration
//! gets a registry-unique [`HandlerId`] so that a specific entry can be
//! removed even when two registrations are otherwise indistinguishable.
//!
//! Reads (dispatch) take a shared lock and clone the channel's entries, so a
//! concurrent subscribe or unsubscribe never observes a half-updated list and
//! never blocks on a running handler.

use std::{collections::HashMap, fmt, sync::Arc};

use async_lock::RwLock;

use crate::message::BayeuxMessage;

/// A caller-supplied message handler.
pub type Callback = Arc<dyn Fn(Arc<BayeuxMessage>) + Send + Sync>;

/// Identifies one registration within a registry's lifetime.
pub type HandlerId = u64;

/// A registered handler.
#[derive(Clone)]
pub struct HandlerEntry {
    id: HandlerId,
    callback: Callback,
}

impl HandlerEntry {
    /// The registration id.
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    /// The handler.
    #[must_use]
    pub const fn callback(&self) -> &Callback {
        &self.callback
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry").field("id", &self.id).finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Handlers {
    channels: HashMap<String, Vec<HandlerEntry>>,
    next_id: HandlerId,
}

/// Thread-safe mapping from channel name to its ordered handlers.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    handlers: RwLock<Handlers>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to `channel`'s handlers and return its id.
    ///
    /// Id allocation and insertion happen under one write lock.
    pub async fn add(&self, channel: &str, callback: Callback) -> HandlerId {
        let mut handlers = self.handlers.write().await;
        handlers.next_id += 1;
        let id = handlers.next_id;
        handlers
            .channels
            .entry(channel.to_owned())
            .or_default()
            .push(HandlerEntry { id, callback });
        id
    }

    /// Remove the entry with `id` from `channel`.
    ///
    /// Returns `false` if no such entry exists; removing twice is harmless.
    pub async fn remove(&self, channel: &str, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().await;
        let Some(entries) = handlers.channels.get_mut(channel) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            handlers.channels.remove(channel);
        }

        removed
    }

    /// Remove every handler on `channel`, returning how many were dropped.
    pub async fn remove_channel(&self, channel: &str) -> usize {
        self.handlers
            .write()
            .await
            .channels
            .remove(channel)
            .map_or(0, |entries| entries.len())
    }

    /// A stable copy of `channel`'s handlers, in subscription order.
    pub async fn snapshot(&self, channel: &str) -> Vec<HandlerEntry> {
        self.handlers
            .read()
            .await
            .channels
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers registered on `channel`.
    pub async fn count(&self, channel: &str) -> usize {
        self.handlers
            .read()
            .await
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }
}

/// The capability to remove one registration.
///
/// Returned by [`BayeuxClient::subscribe`](crate::BayeuxClient::subscribe).
/// Unsubscribing is local: no request is sent to the server.
#[derive(Clone)]
pub struct Subscription {
    channel: String,
    id: HandlerId,
    registry: Arc<SubscriptionRegistry>,
}

impl Subscription {
    pub(crate) const fn new(
        channel: String,
        id: HandlerId,
        registry: Arc<SubscriptionRegistry>,
    ) -> Self {
        Self {
            channel,
            id,
            registry,
        }
    }

    /// The subscribed channel.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The registration id.
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    /// Remove exactly this registration.
    ///
    /// Safe to call any number of times; returns `true` only on the call
    /// that actually removed the handler.
    pub async fn unsubscribe(&self) -> bool {
        let removed = self.registry.remove(&self.channel, self.id).await;
        if removed {
            tracing::debug!(channel = %self.channel, handler_id = self.id, "unsubscribed");
        }
        removed
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
