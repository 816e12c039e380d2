//! Background long-poll task.

use std::sync::Arc;

use async_lock::RwLock;
use tracing::{debug, error, info, warn};

use super::exchange;
use crate::{
    client_id::ClientId,
    dispatch::dispatch_batch,
    error::ClientError,
    lifecycle::{Cycle, Lifecycle},
    message::BayeuxMessage,
    registry::SubscriptionRegistry,
    retry::RetryPolicy,
    transport::Transport,
};

/// State shared between the client and its poll loop.
pub(super) struct PollLoop<T> {
    pub(super) transport: Arc<T>,
    pub(super) client_id: Arc<RwLock<Option<ClientId>>>,
    pub(super) registry: Arc<SubscriptionRegistry>,
    pub(super) lifecycle: Arc<Lifecycle>,
    pub(super) retry: RetryPolicy,
}

/// Poll until `cycle` is cancelled or the retry policy gives up.
///
/// Cancellation is checked between exchanges; an exchange in flight is never
/// interrupted. Only the pause after a failure is cut short.
pub(super) async fn poll_loop<T: Transport>(ctx: PollLoop<T>, cycle: Cycle) {
    info!(generation = cycle.generation, "starting poll loop");

    let mut attempts = ctx.retry.attempts();

    loop {
        if cycle.cancel.is_cancelled() {
            info!("poll loop: cancelled, exiting");
            break;
        }

        match poll_once(&ctx).await {
            Ok(count) => {
                attempts.reset();
                if count > 0 {
                    debug!(count, "poll received messages");
                }
            }
            Err(e) => {
                let Some(delay) = attempts.record_failure() else {
                    error!(
                        error = %e,
                        consecutive_failures = attempts.consecutive_failures(),
                        "poll loop: too many consecutive failures, stopping"
                    );
                    ctx.lifecycle.finish(cycle.generation).await;
                    break;
                };

                warn!(
                    error = %e,
                    consecutive_failures = attempts.consecutive_failures(),
                    "poll error"
                );

                tokio::select! {
                    () = cycle.cancel.cancelled() => {}
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    info!(generation = cycle.generation, "poll loop exited");
}

/// One `/meta/connect` exchange followed by dispatch of its batch.
async fn poll_once<T: Transport>(ctx: &PollLoop<T>) -> Result<usize, ClientError> {
    let client_id = ctx.client_id.read().await.clone();
    let batch = exchange(&*ctx.transport, BayeuxMessage::connect(client_id)).await?;
    let count = batch.len();

    // Handler tasks are detached; the next poll does not wait for them.
    drop(dispatch_batch(&ctx.registry, batch).await);

    Ok(count)
}
