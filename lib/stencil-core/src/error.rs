//! Error types for stencil.
//!
//! Every failure of a template invocation is returned to the caller as an
//! [`Error`] value; nothing is retried and nothing is fatal to the process.

use std::sync::Arc;

use derive_more::{Display, Error, From};

use crate::ParamLocation;

/// Main error type for stencil operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Deferred construction error recorded by a builder step, surfaced by `build`.
    #[display("invalid request template: {_0}")]
    #[from(skip)]
    Build(#[error(not(source))] String),

    /// A named argument found no declared parameter able to take its value.
    #[display("failed to bind value to URL {location} parameter '{name}'")]
    #[from(skip)]
    Binding {
        /// Parameter name the argument was looking for.
        name: String,
        /// Variable list that was searched.
        location: ParamLocation,
    },

    /// Request body encoding failed.
    ///
    /// The message is shared so a cached failure can be reported again on
    /// every invocation that reuses the failing argument.
    #[display("body encoding error: {_0}")]
    #[from(skip)]
    Encoding(#[error(not(source))] Arc<str>),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The assembled request could not be constructed.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The result extractor could not interpret the response body.
    ///
    /// The HTTP status is kept so callers still learn it.
    #[display("failed to decode response with status {status}: {message}")]
    #[from(skip)]
    Decoding {
        /// HTTP status code of the response that failed to decode.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a deferred build error.
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a binding error for a parameter that could not take a value.
    #[must_use]
    pub fn binding(name: impl Into<String>, location: ParamLocation) -> Self {
        Self::Binding {
            name: name.into(),
            location,
        }
    }

    /// Create a body encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<Arc<str>>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a decoding error for a response with the given status.
    #[must_use]
    pub fn decoding(status: u16, message: impl Into<String>) -> Self {
        Self::Decoding {
            status,
            message: message.into(),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the connector failed to send or receive.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns `true` if an argument found no matching parameter.
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self, Self::Binding { .. })
    }

    /// Returns the HTTP status code if a response was received before failing.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Decoding { status, .. } => Some(*status),
            _ => None,
        }
    }
}
