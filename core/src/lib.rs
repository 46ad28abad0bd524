//! JSON fetch helper for REST API tests.
//!
//! # Overview
//! One call performs one HTTP round trip, collects the response body as it
//! streams in, and settles to either the parsed JSON body or a `FetchError`.
//!
//! # Design
//! - `build_request` turns `FetchOptions` into a plain-data `HttpRequest`
//!   with no I/O. Only POST, PUT and PATCH carry a body.
//! - Transports (`FetchClient` on `reqwest`, `blocking::FetchClient` on
//!   `ureq`) feed status, chunks and errors into a `ResponseCollector`.
//! - The collector settles once. A non-2xx status rejects as soon as the head
//!   arrives and later parse or transport failures from the same call are
//!   discarded.
//! - No caching and no retries. Each call owns its buffer, so calls can run
//!   concurrently.

pub mod blocking;
pub mod client;
pub mod collect;
pub mod config;
pub mod error;
pub mod http;
pub mod matching;
pub mod request;
pub mod settle;

pub use client::{fetch, fetch_json, FetchClient};
pub use collect::ResponseCollector;
pub use config::ClientConfig;
pub use error::{FetchError, ParseMethodError};
pub use http::{is_success, HttpMethod, HttpRequest, JsonResponse};
pub use matching::json_like;
pub use request::{build_request, FetchOptions};
pub use settle::Settlement;
