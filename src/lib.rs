//! Mailtrap sending-API transport.
//!
//! Translates a composed [`Email`] into the JSON payload expected by
//! `POST https://{endpoint}/api/send` and performs the call through an
//! injected [`reqwest::Client`]. Payload construction is pure and tested in
//! isolation; HTTP failures propagate verbatim from the client.

pub mod config;
pub mod error;
pub mod message;
pub mod payload;
pub mod transport;

pub use config::{register_transport, ConfigError, HttpClientOptions, TransportConfig};
pub use error::{Result, TransportError};
pub use message::{Address, Attachment, Disposition, Email, Envelope, Header, OutgoingMessage};
pub use payload::{build_payload, SendPayload};
pub use transport::{Delivery, MailtrapTransport, Transport, DEFAULT_ENDPOINT, TRANSPORT_NAME};
