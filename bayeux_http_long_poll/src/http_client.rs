//! [`reqwest`]-backed implementation of [`Transport`].

use core::time::Duration;

use bayeux_core::{CONTENT_TYPE, Transport};
use futures::{FutureExt, future::BoxFuture};
use reqwest::header;
use url::Url;

use crate::error::HttpTransportError;

/// Posts each request batch to a fixed endpoint and returns the response body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with default client settings.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            inner: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Create a transport whose requests give up after `timeout`.
    ///
    /// The timeout must exceed the server's long-poll hold time, otherwise
    /// every idle `/meta/connect` is reported as a failure.
    #[must_use]
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Self {
        Self {
            inner: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint,
        }
    }

    /// Use a preconfigured [`reqwest::Client`].
    #[must_use]
    pub const fn with_client(endpoint: Url, client: reqwest::Client) -> Self {
        Self {
            inner: client,
            endpoint,
        }
    }

    /// The URL every batch is posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    type Error = HttpTransportError;

    fn exchange(&self, body: Vec<u8>) -> BoxFuture<'_, Result<Vec<u8>, Self::Error>> {
        let request = self
            .inner
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body);

        async move {
            let resp = request.send().await?;
            let status = resp.status();
            let bytes = resp.bytes().await?;

            if !status.is_success() {
                tracing::debug!(status = status.as_u16(), "bayeux endpoint returned error status");
                return Err(HttpTransportError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }

            Ok(bytes.to_vec())
        }
        .boxed()
    }
}
