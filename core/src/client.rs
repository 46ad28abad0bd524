//! Async fetch client backed by `reqwest`.
//!
//! # Design
//! `FetchClient` owns only a `reqwest::Client` and keeps no per-call state.
//! Each call builds an `HttpRequest` with `build_request`, sends it once,
//! streams the body into a fresh `ResponseCollector` and returns whatever
//! the collector settles on. Calls are independent and can run concurrently.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::collect::ResponseCollector;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::http::{header_pairs, HttpMethod, HttpRequest, JsonResponse};
use crate::request::{build_request, FetchOptions};

/// Asynchronous JSON fetch client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
}

impl FetchClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::transport)?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch `url` and parse the body as an arbitrary JSON value.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
        self.fetch_json(url, options).await
    }

    /// Fetch `url` and deserialize the body into `T`.
    pub async fn fetch_json<T>(&self, url: &str, options: &FetchOptions) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        self.fetch_response(url, options)
            .await
            .map(JsonResponse::into_body)
    }

    /// Like `fetch_json`, but also returns the status and response headers.
    pub async fn fetch_response<T>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<JsonResponse<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let request = build_request(url, options)?;
        self.execute(request).await
    }

    /// Send a prepared request and collect its response. A body on a method
    /// other than POST, PUT or PATCH is not sent.
    pub async fn execute<T>(&self, request: HttpRequest) -> Result<JsonResponse<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .http
            .request(reqwest_method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let carries_body = request.method.carries_body();
        if let Some(body) = request.body.filter(|_| carries_body) {
            builder = builder.body(body);
        }

        let mut response = builder.send().await.map_err(FetchError::transport)?;
        let status = response.status().as_u16();
        let mut collector = ResponseCollector::start(status, header_pairs(response.headers()));

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => collector.on_chunk(&chunk),
                Ok(None) => break,
                Err(err) => {
                    collector.on_transport_error(err);
                    break;
                }
            }
        }

        debug!(status, bytes = collector.bytes_received(), "response complete");
        collector.finish()
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Fetch `url` once with a fresh client and parse the body as JSON.
pub async fn fetch(url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
    FetchClient::new()?.fetch(url, options).await
}

/// Fetch `url` once with a fresh client and deserialize the body into `T`.
pub async fn fetch_json<T>(url: &str, options: &FetchOptions) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    FetchClient::new()?.fetch_json(url, options).await
}
