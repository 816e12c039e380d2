//! Common test utilities and helpers.

use core::time::Duration;
use std::sync::{Arc, OnceLock};

use tokio::sync::mpsc;

use crate::{
    BayeuxClient, ClientConfig,
    message::{BayeuxMessage, Payload},
    test_utils::MockTransport,
};

static TRACING: OnceLock<()> = OnceLock::new();

pub(super) fn init_tracing() {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Retry delay short enough to keep failure tests fast.
pub(super) const FAST_RETRY: Duration = Duration::from_millis(5);

/// Upper bound on how long a test waits for background work.
pub(super) const WAIT: Duration = Duration::from_secs(2);

pub(super) fn fast_config() -> ClientConfig {
    ClientConfig::default().with_retry_delay(FAST_RETRY)
}

/// A client over `transport` that has already completed its handshake.
pub(super) async fn handshaken(
    transport: MockTransport,
    config: ClientConfig,
) -> Result<BayeuxClient<MockTransport>, crate::ClientError> {
    let client = BayeuxClient::with_config(transport, config);
    client.handshake().await?;
    Ok(client)
}

/// A handler that forwards every delivery into a channel.
pub(super) fn forwarder() -> (
    impl Fn(Arc<BayeuxMessage>) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Arc<BayeuxMessage>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = move |message: Arc<BayeuxMessage>| {
        let _ = tx.send(message);
    };
    (handler, rx)
}

pub(super) fn payload(value: serde_json::Value) -> Payload {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub(super) async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}
