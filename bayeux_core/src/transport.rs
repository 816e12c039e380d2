//! The request/response collaborator.

use std::sync::Arc;

use futures::future::BoxFuture;

/// Moves one encoded request batch to the server and returns the raw
/// response body.
///
/// Implementations perform exactly one exchange per call. Retries and
/// timeouts are not part of the contract; the long-poll loop retries on its
/// own and a transport may impose a timeout if it chooses to.
///
/// Implement this to plug in a different mechanism (HTTP, an in-process
/// server, a test double).
pub trait Transport: Send + Sync + 'static {
    /// A problem while performing the exchange.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Send `body` (a JSON array) and return the response body.
    fn exchange(&self, body: Vec<u8>) -> BoxFuture<'_, Result<Vec<u8>, Self::Error>>;
}

impl<T: Transport> Transport for Arc<T> {
    type Error = T::Error;

    fn exchange(&self, body: Vec<u8>) -> BoxFuture<'_, Result<Vec<u8>, Self::Error>> {
        (**self).exchange(body)
    }
}
