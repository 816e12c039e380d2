//! The Bayeux client.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       BayeuxClient                         │
//! │                                                            │
//! │  handshake / subscribe / publish / disconnect              │
//! │      └──► one request batch ──► Transport ──► response     │
//! │                                                            │
//! │  connect ──► Lifecycle::start ──► spawn poll_loop          │
//! │                                      │                     │
//! │     /meta/connect ◄──────────────────┤ (repeat until       │
//! │     response batch ──► dispatch ─────┘  cancelled)         │
//! │                          │                                 │
//! │                          └──► SubscriptionRegistry         │
//! │                                 snapshot ──► handler tasks │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state is scoped to one client value; clones share it.

mod poll_loop;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_lock::RwLock;

use crate::{
    channel,
    client_id::ClientId,
    config::ClientConfig,
    error::{ClientError, ProtocolError},
    lifecycle::{Lifecycle, LoopState},
    message::{BayeuxMessage, Payload, decode_batch, encode_batch},
    registry::{Callback, Subscription, SubscriptionRegistry},
    transport::Transport,
};

use poll_loop::{PollLoop, poll_loop};

/// A client for one logical Bayeux connection.
pub struct BayeuxClient<T> {
    transport: Arc<T>,
    client_id: Arc<RwLock<Option<ClientId>>>,
    registry: Arc<SubscriptionRegistry>,
    lifecycle: Arc<Lifecycle>,
    config: ClientConfig,
}

impl<T> Clone for BayeuxClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            client_id: self.client_id.clone(),
            registry: self.registry.clone(),
            lifecycle: self.lifecycle.clone(),
            config: self.config,
        }
    }
}

impl<T> core::fmt::Debug for BayeuxClient<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BayeuxClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BayeuxClient<T> {
    /// Create a client with default options.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a client with custom options.
    #[must_use]
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            client_id: Arc::new(RwLock::new(None)),
            registry: Arc::new(SubscriptionRegistry::new()),
            lifecycle: Arc::new(Lifecycle::new()),
            config,
        }
    }

    /// Establish a session and store the server-issued id.
    ///
    /// Calling this again replaces the stored id; a running poll loop picks
    /// up the new id on its next exchange.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Transport`] / [`ClientError::Decode`] if the exchange fails.
    /// * [`ClientError::Protocol`] if the batch is empty, the server reports
    ///   failure, or no `clientId` is present.
    pub async fn handshake(&self) -> Result<ClientId, ClientError> {
        let batch = exchange(&*self.transport, BayeuxMessage::handshake()).await?;

        let Some(first) = batch.into_iter().next() else {
            return Err(ProtocolError::EmptyResponse {
                channel: channel::HANDSHAKE.into(),
            }
            .into());
        };

        if first.successful == Some(false) {
            tracing::warn!(error = ?first.error, "handshake rejected");
            return Err(ProtocolError::Unsuccessful {
                channel: channel::HANDSHAKE.into(),
                error: first.error,
            }
            .into());
        }

        let client_id = first
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or(ProtocolError::MissingClientId)?;

        tracing::info!(client_id = %client_id, "handshake completed");
        *self.client_id.write().await = Some(client_id.clone());
        Ok(client_id)
    }

    /// Register `handler` for `channel` and ask the server to subscribe.
    ///
    /// The handler is registered locally before the request is sent, so it
    /// may receive messages slightly ahead of the server's confirmation.
    ///
    /// If the server rejects the subscription the local handler stays
    /// registered unless [`ClientConfig::rollback_failed_subscriptions`] is
    /// set. [`remove_channel`](Self::remove_channel) clears it.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Encode`], [`ClientError::Transport`], [`ClientError::Decode`]
    ///   if the exchange fails.
    /// * [`ClientError::Protocol`] if the response is not explicitly successful.
    pub async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<Subscription, ClientError>
    where
        F: Fn(Arc<BayeuxMessage>) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(handler);
        let id = self.registry.add(channel, callback).await;
        tracing::debug!(channel, handler_id = id, "registered handler");

        let request = BayeuxMessage::subscribe(self.client_id().await, channel);
        let outcome = match exchange(&*self.transport, request).await {
            Ok(batch) => expect_success(channel::SUBSCRIBE, batch)
                .map(drop)
                .map_err(ClientError::from),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            tracing::warn!(channel, error = %e, "subscribe failed");
            if self.config.rollback_failed_subscriptions {
                self.registry.remove(channel, id).await;
            }
            return Err(e);
        }

        tracing::info!(channel, handler_id = id, "subscribed");
        Ok(Subscription::new(channel.to_owned(), id, self.registry.clone()))
    }

    /// Publish `data` on `channel`.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Encode`], [`ClientError::Transport`], [`ClientError::Decode`]
    ///   if the exchange fails.
    /// * [`ClientError::Protocol`] carrying the server's error text if the
    ///   publish is not acknowledged as successful.
    pub async fn publish(&self, channel: &str, data: Payload) -> Result<(), ClientError> {
        let request = BayeuxMessage::publish(self.client_id().await, channel, data);
        let batch = exchange(&*self.transport, request).await?;
        expect_success(channel, batch)?;
        tracing::debug!(channel, "published");
        Ok(())
    }

    /// Start the background long-poll loop and return immediately.
    ///
    /// Requires a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyRunning`] if a loop is active.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let cycle = self.lifecycle.start().await?;

        let ctx = PollLoop {
            transport: self.transport.clone(),
            client_id: self.client_id.clone(),
            registry: self.registry.clone(),
            lifecycle: self.lifecycle.clone(),
            retry: self.config.retry,
        };

        tokio::spawn(poll_loop(ctx, cycle));
        Ok(())
    }

    /// Stop the poll loop (if running) and tell the server the session ends.
    ///
    /// The disconnect request is sent even if the loop was never started. A
    /// poll exchange already in flight runs to completion, but no further
    /// exchange is started.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Encode`], [`ClientError::Transport`], [`ClientError::Decode`]
    ///   if the exchange fails.
    /// * [`ClientError::Protocol`] if the server does not confirm.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        let was_running = self.lifecycle.stop().await;
        tracing::info!(was_running, "disconnecting");

        let request = BayeuxMessage::disconnect(self.client_id().await);
        let batch = exchange(&*self.transport, request).await?;
        expect_success(channel::DISCONNECT, batch)?;
        Ok(())
    }

    /// The current session id, if a handshake has succeeded.
    pub async fn client_id(&self) -> Option<ClientId> {
        self.client_id.read().await.clone()
    }

    /// Whether the poll loop is active.
    pub async fn is_running(&self) -> bool {
        self.lifecycle.state().await == LoopState::Running
    }

    /// Number of local handlers on `channel`.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.registry.count(channel).await
    }

    /// Drop every local handler on `channel`. Nothing is sent to the server.
    pub async fn remove_channel(&self, channel: &str) -> usize {
        self.registry.remove_channel(channel).await
    }

    /// The options this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Encode `request` as a one-element batch, exchange it, decode the reply.
pub(crate) async fn exchange<T: Transport>(
    transport: &T,
    request: BayeuxMessage,
) -> Result<Vec<BayeuxMessage>, ClientError> {
    let body = encode_batch(core::slice::from_ref(&request)).map_err(ClientError::Encode)?;
    tracing::debug!(channel = %request.channel, bytes = body.len(), "sending request");

    let response = transport
        .exchange(body)
        .await
        .map_err(|e| ClientError::Transport(Box::new(e)))?;

    decode_batch(&response).map_err(ClientError::Decode)
}

/// Pick the reply to a request on `channel` and require `successful: true`.
///
/// Prefers the first message on the request's channel and falls back to the
/// first message in the batch.
fn expect_success(
    channel: &str,
    batch: Vec<BayeuxMessage>,
) -> Result<BayeuxMessage, ProtocolError> {
    let position = batch.iter().position(|m| m.channel == channel).unwrap_or(0);
    let Some(reply) = batch.into_iter().nth(position) else {
        return Err(ProtocolError::EmptyResponse {
            channel: channel.to_owned(),
        });
    };

    if reply.is_successful() {
        Ok(reply)
    } else {
        Err(ProtocolError::Unsuccessful {
            channel: channel.to_owned(),
            error: reply.error,
        })
    }
}
