//! Delivery of inbound messages to registered handlers.
//!
//! Handlers are plain synchronous callbacks, so each invocation runs on
//! Tokio's blocking pool rather than on an async worker: a handler that
//! sleeps or blocks on I/O never stalls the poll loop. Every invocation is
//! wrapped in [`catch_unwind`](std::panic::catch_unwind); a panicking handler
//! is logged and the message still counts as delivered. Other handlers, and
//! later poll cycles, are unaffected.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use tokio::task::JoinHandle;

use crate::{
    message::BayeuxMessage,
    registry::{HandlerEntry, SubscriptionRegistry},
};

/// Dispatch every message in `batch`, in order, to its channel's handlers.
///
/// Handlers are spawned and not awaited. Returns the spawned invocations so
/// callers that care (tests) can wait for them.
pub async fn dispatch_batch(
    registry: &SubscriptionRegistry,
    batch: Vec<BayeuxMessage>,
) -> Vec<JoinHandle<()>> {
    let mut spawned = Vec::new();

    for message in batch {
        let handlers = registry.snapshot(&message.channel).await;
        if handlers.is_empty() {
            tracing::trace!(
                channel = %message.channel,
                meta = message.is_meta(),
                "no subscriber, dropping message"
            );
            continue;
        }

        let message = Arc::new(message);
        for entry in handlers {
            spawned.push(spawn_handler(entry, message.clone()));
        }
    }

    spawned
}

/// Run one handler on the blocking pool, reporting rather than propagating
/// panics.
pub fn spawn_handler(entry: HandlerEntry, message: Arc<BayeuxMessage>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let channel = message.channel.clone();
        let callback = entry.callback().clone();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(message))) {
            tracing::error!(
                channel = %channel,
                handler_id = entry.id(),
                panic = panic_message(payload.as_ref()),
                "handler panicked"
            );
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
