//! Error types for the messaging API client.
//!
//! # Design
//! Three failure families reach the caller:
//! - `TransportError`: the round trip itself failed or was cancelled. It is
//!   passed through unchanged.
//! - `Error::Decode` / `Error::ContentDisposition`: the platform answered 200
//!   but the body or headers did not have the expected shape.
//! - `ApiError`: any non-200 status. `response` holds the parsed error body
//!   when it decoded, and is `None` when it did not.

use std::fmt;

use crate::response::ErrorResponse;

/// Network-level failure, including context cancellation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call's context was cancelled before the round trip completed.
    #[error("context canceled")]
    Canceled,

    /// The call's context deadline elapsed before the round trip completed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Failure reported by a custom `Transport` implementation.
    #[error("http transport: {0}")]
    Other(String),
}

/// A non-200 response from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: u16,
    pub response: Option<ErrorResponse>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linebot: APIError {}", self.code)?;
        if let Some(response) = &self.response {
            write!(f, " {}", response.message)?;
            for detail in &response.details {
                write!(f, "\n[{}] {}", detail.property, detail.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors returned by `Call::execute` and client construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 200 response whose body did not match the expected shape.
    #[error("linebot: failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A content response without a usable `Content-Disposition` header.
    #[error("linebot: invalid Content-Disposition header: {0}")]
    ContentDisposition(String),

    #[error("linebot: failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("linebot: invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The platform's rejection, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Canceled))
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Error::Transport(TransportError::DeadlineExceeded))
    }
}
