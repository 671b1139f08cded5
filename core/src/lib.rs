//! Client library for the messaging platform's HTTP API.
//!
//! # Overview
//! Push or reply with one or more messages, fetch user profiles and message
//! content, and decode the platform's responses, including structured error
//! bodies and binary content streams.
//!
//! # Design
//! - `Message` is a closed enum; every variant serializes with its `type`
//!   discriminator first and its fields in a fixed order.
//! - `Client` builds inert `Call` values. `Call::request` renders the wire
//!   request as plain data; `Call::execute` performs exactly one round trip.
//! - An optional `Context` bounds a call with cancellation and a deadline.
//! - The response decoder splits on status: 200 decodes the success shape,
//!   anything else becomes `ApiError` with the parsed body when it parses.
//! - `Transport` is the only I/O seam; `ReqwestTransport` is the default.
//!
//! ```no_run
//! # async fn demo() -> Result<(), linebot_core::Error> {
//! use linebot_core::{Client, Message};
//!
//! let client = Client::new("channel-access-token")?;
//! client
//!     .push("U0cc15697597f61dd8b01cea8b027050e", [Message::text("Hello, world")])
//!     .execute()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http;
pub mod message;
pub mod response;

pub use call::Call;
pub use client::Client;
pub use config::ClientConfig;
pub use context::Context;
pub use envelope::Envelope;
pub use error::{ApiError, Error, TransportError};
pub use http::{Body, HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use message::Message;
pub use response::{BasicResponse, ErrorDetail, ErrorResponse, MessageContentResponse, UserProfileResponse};
