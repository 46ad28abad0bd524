//! Response body accumulation and settlement.
//!
//! # Design
//! A transport drives a `ResponseCollector` with the events it observes:
//! the response head, each body chunk in arrival order, and possibly a
//! transport error. The collector never does I/O itself, which lets the
//! async (`reqwest`) and blocking (`ureq`) clients share one implementation
//! of the settlement rules:
//!
//! - a non-2xx head rejects immediately, but chunks are still collected;
//! - the body is parsed only at the end, and only if nothing settled first;
//! - a status error is returned with the collected body text attached.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{BoxError, FetchError};
use crate::http::{is_success, JsonResponse};
use crate::settle::Settlement;

/// Collects one response and settles it exactly once.
#[derive(Debug)]
pub struct ResponseCollector<T> {
    status: u16,
    headers: Vec<(String, String)>,
    buffer: Vec<u8>,
    settlement: Settlement<JsonResponse<T>, FetchError>,
}

impl<T: DeserializeOwned> ResponseCollector<T> {
    /// Start collecting once the status line and headers have arrived.
    pub fn start(status: u16, headers: Vec<(String, String)>) -> Self {
        let mut settlement = Settlement::new();
        if !is_success(status) {
            debug!(status, "non-success status, rejecting");
            settlement.reject(FetchError::status(status));
        }
        Self {
            status,
            headers,
            buffer: Vec::new(),
            settlement,
        }
    }

    pub fn on_chunk(&mut self, chunk: &[u8]) {
        trace!(len = chunk.len(), total = self.buffer.len() + chunk.len(), "body chunk");
        self.buffer.extend_from_slice(chunk);
    }

    /// Record a transport failure that interrupted the body.
    pub fn on_transport_error<E>(&mut self, err: E)
    where
        E: Into<BoxError>,
    {
        let err = FetchError::transport(err);
        if !self.settlement.reject(err) {
            debug!(status = self.status, "transport error after settlement discarded");
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_settled()
    }

    pub fn bytes_received(&self) -> usize {
        self.buffer.len()
    }

    /// End of stream: parse the body unless the call already settled.
    pub fn finish(self) -> Result<JsonResponse<T>, FetchError> {
        let Self {
            status,
            headers,
            buffer,
            settlement,
        } = self;

        if settlement.is_settled() {
            debug!(status, bytes = buffer.len(), "call already settled, body not parsed");
        }

        settlement
            .finish_with(|| {
                let body = serde_json::from_slice(&buffer).map_err(FetchError::Parse)?;
                Ok(JsonResponse {
                    status,
                    headers,
                    body,
                })
            })
            .map_err(|err| err.with_body(String::from_utf8_lossy(&buffer).into_owned()))
    }
}
