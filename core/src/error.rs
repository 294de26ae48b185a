//! Error types for the fitness API client.
//!
//! # Design
//! `RawApiError` is the transport-level failure as received: an optional
//! response (status plus JSON body) and an optional low-level message. It is
//! never shown to users directly. The normalization layer turns it into an
//! `ApiError`, whose `Display` is the user-facing Spanish message.
//!
//! `ApiError::Raw` exists for the one call site that deliberately passes an
//! unrecognized failure through untouched (AI routine generation).

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The response part of a failed HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` when the body was empty or not JSON.
    pub data: Value,
}

/// A failed HTTP call before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawApiError {
    pub response: Option<ErrorResponse>,
    pub message: Option<String>,
}

impl RawApiError {
    /// A failure that carries a response from the server.
    pub fn with_response(status: u16, data: Value) -> Self {
        Self {
            response: Some(ErrorResponse { status, data }),
            message: None,
        }
    }

    /// A failure where no response was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            response: None,
            message: Some(message.into()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// Response body as sent by the server, if there was one.
    pub fn data(&self) -> Option<&Value> {
        self.response.as_ref().map(|r| &r.data)
    }
}

impl fmt::Display for RawApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.response, &self.message) {
            (_, Some(message)) => write!(f, "{message}"),
            (Some(response), None) => write!(f, "HTTP {}: {}", response.status, response.data),
            (None, None) => write!(f, "request failed without a response"),
        }
    }
}

impl std::error::Error for RawApiError {}

impl From<TransportError> for RawApiError {
    fn from(err: TransportError) -> Self {
        RawApiError::network(err.to_string())
    }
}

/// Failure of the transport itself: nothing came back from the server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to build HTTP client: {0}")]
    Builder(String),
}

/// Errors returned by the service layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// A normalized failure. `message` is the text shown to the user.
    #[error("{message}")]
    Normalized { status: Option<u16>, message: String },

    /// A failure passed through without normalization.
    #[error("{0}")]
    Raw(RawApiError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A successful response body did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn normalized(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Normalized {
            status,
            message: message.into(),
        }
    }

    /// HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Normalized { status, .. } => *status,
            ApiError::Raw(raw) => raw.status(),
            ApiError::Serialization(_) | ApiError::Deserialization(_) => None,
        }
    }
}

/// Errors raised while loading `ClientConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
