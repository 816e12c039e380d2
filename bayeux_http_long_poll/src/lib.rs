//! # Bayeux HTTP Long-Poll Transport
//!
//! A [`Transport`](bayeux_core::Transport) that carries Bayeux message
//! batches as JSON over HTTP `POST`.
//!
//! Every client operation becomes one request to a single endpoint:
//!
//! ```text
//! ┌──────────┐                                  ┌──────────┐
//! │  Client  │                                  │  Server  │
//! └────┬─────┘                                  └────┬─────┘
//!      │  POST <endpoint>                            │
//!      │  Content-Type: application/json             │
//!      │  [{"channel":"/meta/connect", ...}]         │
//!      │ ──────────────────────────────────────────► │
//!      │            ... (held open) ...              │
//!      │  200 [{"channel":"/foo","data":{...}}]      │
//!      │ ◄────────────────────────────────────────── │
//! ```
//!
//! A non-2xx status is reported as a transport failure; the body is only
//! decoded by the client when the status is successful.
//!
//! # Example
//!
//! ```no_run
//! use bayeux_core::BayeuxClient;
//! use bayeux_http_long_poll::HttpTransport;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://localhost:8080/cometd".parse()?);
//! let client = BayeuxClient::new(transport);
//! client.handshake().await?;
//! client
//!     .subscribe("/chat", |message| println!("{:?}", message.data))
//!     .await?;
//! client.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http_client;

pub use error::HttpTransportError;
pub use http_client::HttpTransport;
