//! Test utilities.
//!
//! [`MockTransport`] is an in-memory [`Transport`] that answers meta and
//! publish requests through a scripted responder and serves `/meta/connect`
//! from a queue of batches, holding the poll open for a short while when the
//! queue is empty.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_lock::Mutex;
use futures::{FutureExt, future::BoxFuture};
use thiserror::Error;

use crate::{
    channel,
    client_id::ClientId,
    message::{BayeuxMessage, decode_batch, encode_batch},
    transport::Transport,
};

/// Session id handed out by [`default_reply`].
pub const MOCK_CLIENT_ID: &str = "mock-client";

/// How long an empty long-poll is held by default.
pub const DEFAULT_POLL_HOLD: Duration = Duration::from_millis(10);

/// Failure produced by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockTransportError {
    /// Simulated network failure.
    #[error("connection refused")]
    Refused,

    /// The request body was not a message batch.
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Computes the response batch for a non-poll request.
pub type Responder =
    Arc<dyn Fn(&BayeuxMessage) -> Result<Vec<BayeuxMessage>, MockTransportError> + Send + Sync>;

/// The reply a well-behaved server gives to `request`.
///
/// Handshakes get [`MOCK_CLIENT_ID`]; subscribes echo their subscription;
/// everything is marked successful.
#[must_use]
pub fn default_reply(request: &BayeuxMessage) -> BayeuxMessage {
    let mut reply = BayeuxMessage::new(request.channel.clone()).with_successful(true);
    match request.channel.as_str() {
        channel::HANDSHAKE => reply.client_id = Some(ClientId::new(MOCK_CLIENT_ID)),
        channel::SUBSCRIBE => reply.subscription.clone_from(&request.subscription),
        _ => reply.client_id.clone_from(&request.client_id),
    }
    reply
}

/// Scriptable in-memory transport.
#[derive(Clone)]
pub struct MockTransport {
    responder: Responder,
    polls: Arc<Mutex<VecDeque<Result<Vec<BayeuxMessage>, MockTransportError>>>>,
    poll_hold: Duration,
    requests: Arc<Mutex<Vec<BayeuxMessage>>>,
    exchanges: Arc<AtomicUsize>,
    poll_exchanges: Arc<AtomicUsize>,
    in_flight_polls: Arc<AtomicUsize>,
    max_in_flight_polls: Arc<AtomicUsize>,
}

impl core::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockTransport")
            .field("poll_hold", &self.poll_hold)
            .field("exchanges", &self.exchange_count())
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    /// A transport that accepts everything via [`default_reply`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            responder: Arc::new(|request| Ok(vec![default_reply(request)])),
            polls: Arc::new(Mutex::new(VecDeque::new())),
            poll_hold: DEFAULT_POLL_HOLD,
            requests: Arc::new(Mutex::new(Vec::new())),
            exchanges: Arc::new(AtomicUsize::new(0)),
            poll_exchanges: Arc::new(AtomicUsize::new(0)),
            in_flight_polls: Arc::new(AtomicUsize::new(0)),
            max_in_flight_polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer non-poll requests with `responder`.
    #[must_use]
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&BayeuxMessage) -> Result<Vec<BayeuxMessage>, MockTransportError>
            + Send
            + Sync
            + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    /// Answer non-poll requests on `channel` with a fixed batch.
    #[must_use]
    pub fn with_reply(self, channel: &'static str, batch: Vec<BayeuxMessage>) -> Self {
        self.with_responder(move |request| {
            if request.channel == channel {
                Ok(batch.clone())
            } else {
                Ok(vec![default_reply(request)])
            }
        })
    }

    /// How long an empty long-poll is held before returning `[]`.
    #[must_use]
    pub const fn with_poll_hold(mut self, hold: Duration) -> Self {
        self.poll_hold = hold;
        self
    }

    /// Queue a batch for a future `/meta/connect`.
    pub async fn push_poll(&self, batch: Vec<BayeuxMessage>) {
        self.polls.lock().await.push_back(Ok(batch));
    }

    /// Make a future `/meta/connect` fail.
    pub async fn push_poll_failure(&self) {
        self.polls
            .lock()
            .await
            .push_back(Err(MockTransportError::Refused));
    }

    /// Every request message received so far, in order.
    pub async fn requests(&self) -> Vec<BayeuxMessage> {
        self.requests.lock().await.clone()
    }

    /// Requests received on `channel`.
    pub async fn requests_on(&self, channel: &str) -> Vec<BayeuxMessage> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    /// Total exchanges performed.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// `/meta/connect` exchanges started.
    #[must_use]
    pub fn poll_count(&self) -> usize {
        self.poll_exchanges.load(Ordering::SeqCst)
    }

    /// Highest number of `/meta/connect` exchanges observed in flight at once.
    #[must_use]
    pub fn max_concurrent_polls(&self) -> usize {
        self.max_in_flight_polls.load(Ordering::SeqCst)
    }

    async fn serve_poll(&self) -> Result<Vec<BayeuxMessage>, MockTransportError> {
        self.poll_exchanges.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight_polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_polls.fetch_max(in_flight, Ordering::SeqCst);

        let queued = self.polls.lock().await.pop_front();
        let result = if let Some(queued) = queued {
            tokio::task::yield_now().await;
            queued
        } else {
            tokio::time::sleep(self.poll_hold).await;
            Ok(Vec::new())
        };

        self.in_flight_polls.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    type Error = MockTransportError;

    fn exchange(&self, body: Vec<u8>) -> BoxFuture<'_, Result<Vec<u8>, Self::Error>> {
        async move {
            self.exchanges.fetch_add(1, Ordering::SeqCst);

            let batch =
                decode_batch(&body).map_err(|e| MockTransportError::BadRequest(e.to_string()))?;
            let Some(request) = batch.first().cloned() else {
                return Err(MockTransportError::BadRequest("empty batch".into()));
            };
            self.requests.lock().await.extend(batch);

            let reply = if request.channel == channel::CONNECT {
                self.serve_poll().await?
            } else {
                (self.responder)(&request)?
            };

            encode_batch(&reply).map_err(|e| MockTransportError::BadRequest(e.to_string()))
        }
        .boxed()
    }
}
