//! Error types for registration failures and handler-level HTTP errors.

use http::StatusCode;
use thiserror::Error;

/// A route registration failure.
///
/// These are configuration mistakes and surface as `Err` values while the
/// routing table is being built, before any request is served. Matching a
/// request never produces a `RouterError`; an unmatched path is handled by
/// the fallback chain instead.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A `{name*}` wildcard token was followed by more pattern text.
    #[error("wildcard parameter must terminate the pattern: {pattern:?}")]
    WildcardNotTerminal { pattern: String },

    /// The regex inside a `{name:pattern}` token failed to compile.
    #[error("invalid regex in route parameter: {pattern:?}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The HTTP method has no routing tree (only the nine standard verbs
    /// are supported).
    #[error("unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },
}

/// An HTTP-level failure returned by a handler.
///
/// Carries the status to respond with and a message used as the response
/// body. [`Router::handle`](crate::router::Router::handle) turns these
/// into plain-text responses; a transport embedding the router can do the
/// same at its own boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// An error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// An error carrying the status's canonical reason phrase as its
    /// message (e.g. "Not Found" for 404).
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            status,
            message: status.canonical_reason().unwrap_or("Unknown Error").to_owned(),
        }
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    /// 405 Method Not Allowed.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::from_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal() -> Self {
        Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
