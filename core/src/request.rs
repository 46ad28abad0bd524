//! Request descriptors and the pure request builder.
//!
//! # Design
//! `FetchOptions` is the caller-facing description of a call: method,
//! headers, query parameters and an optional JSON body. `build_request`
//! turns it into an `HttpRequest` without any I/O. The body is serialized
//! only for methods that carry one; a body supplied with GET or DELETE is
//! dropped here, so no transport can ever send it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::http::{find_header, HttpMethod, HttpRequest};

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Options for a single fetch. Every field is optional; the default is a
/// bare GET.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get() -> Self {
        Self::new().method(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new().method(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new().method(HttpMethod::Put)
    }

    pub fn patch() -> Self {
        Self::new().method(HttpMethod::Patch)
    }

    pub fn delete() -> Self {
        Self::new().method(HttpMethod::Delete)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set a header. A header with the same name (ignoring case) is replaced.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Append a query parameter to the target address.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Use any serializable value as the body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, FetchError> {
        self.body = Some(serde_json::to_value(body).map_err(FetchError::Serialize)?);
        Ok(self)
    }
}

/// Build the request a transport will execute for `url` and `options`.
///
/// Query parameters are appended to `url`; an address that cannot be parsed
/// while doing so is reported as a transport error, the same way the
/// transport would report it.
pub fn build_request(url: &str, options: &FetchOptions) -> Result<HttpRequest, FetchError> {
    let url = with_query(url, &options.query)?;

    let body = match &options.body {
        Some(value) if options.method.carries_body() => {
            Some(serde_json::to_string(value).map_err(FetchError::Serialize)?)
        }
        _ => None,
    };

    let mut headers = options.headers.clone();
    if body.is_some() && find_header(&headers, CONTENT_TYPE).is_none() {
        headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
    }

    Ok(HttpRequest {
        method: options.method,
        url,
        headers,
        body,
    })
}

fn with_query(url: &str, query: &[(String, String)]) -> Result<String, FetchError> {
    if query.is_empty() {
        return Ok(url.to_string());
    }
    let mut parsed = Url::parse(url).map_err(FetchError::transport)?;
    parsed
        .query_pairs_mut()
        .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(parsed.into())
}
