//! Error types for the fetch helper.
//!
//! # Design
//! Every failed call lands in exactly one of three buckets: the exchange
//! itself broke (`Transport`), the server answered outside the 2xx range
//! (`Status`), or the body was not the JSON the caller asked for (`Parse`).
//! `Status` renders as `Status Code: <code>` so callers can match on the
//! message as well as on the variant.

use std::error::Error as StdError;

/// Boxed error from the underlying HTTP library.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors returned by `FetchClient` and the free `fetch*` functions.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The connection could not be established or was interrupted.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status outside `[200, 300)`.
    ///
    /// `body` holds whatever text was collected before the stream ended.
    #[error("Status Code: {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON for the requested type.
    #[error("failed to parse response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// The request body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl FetchError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        FetchError::Transport(err.into())
    }

    pub(crate) fn status(status: u16) -> Self {
        FetchError::Status {
            status,
            body: String::new(),
        }
    }

    /// The HTTP status code, if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }

    /// Attach the collected body text to a status error. Other variants are
    /// returned unchanged.
    pub(crate) fn with_body(self, text: String) -> Self {
        match self {
            FetchError::Status { status, .. } => FetchError::Status { status, body: text },
            other => other,
        }
    }
}

/// Returned when a string does not name a supported HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseMethodError(pub String);
