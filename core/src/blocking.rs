//! Blocking fetch client backed by `ureq`.
//!
//! Same contract as the async client, for callers without a runtime. The
//! agent is configured to hand back 4xx/5xx responses as data so the
//! collector, not `ureq`, decides how a status is classified.

use std::io::{ErrorKind, Read};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::collect::ResponseCollector;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::http::{find_header, header_pairs, HttpMethod, HttpRequest, JsonResponse};
use crate::request::{build_request, FetchOptions};

const READ_CHUNK: usize = 8 * 1024;

/// Synchronous JSON fetch client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    agent: ureq::Agent,
    user_agent: String,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::with_config(&ClientConfig::default())
    }
}

impl FetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .timeout_connect(config.connect_timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
        self.fetch_json(url, options)
    }

    pub fn fetch_json<T>(&self, url: &str, options: &FetchOptions) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        self.fetch_response(url, options).map(JsonResponse::into_body)
    }

    pub fn fetch_response<T>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<JsonResponse<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let request = build_request(url, options)?;
        self.execute(request)
    }

    pub fn execute<T>(&self, request: HttpRequest) -> Result<JsonResponse<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        debug!(method = %request.method, url = %request.url, "sending request");

        let url = request.url.as_str();
        let headers = &request.headers;
        let sent = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self.prepare(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => self.prepare(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                self.prepare(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => self.prepare(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                self.prepare(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => self.prepare(self.agent.put(url), headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                self.prepare(self.agent.patch(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => self.prepare(self.agent.patch(url), headers).send_empty(),
        };
        let mut response = sent.map_err(FetchError::transport)?;

        let status = response.status().as_u16();
        let mut collector = ResponseCollector::start(status, header_pairs(response.headers()));

        let mut reader = response.body_mut().as_reader();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => collector.on_chunk(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    collector.on_transport_error(err);
                    break;
                }
            }
        }

        debug!(status, bytes = collector.bytes_received(), "response complete");
        collector.finish()
    }

    fn prepare<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in outgoing_headers(&self.user_agent, headers) {
            builder = builder.header(name, value);
        }
        builder
    }
}

/// The caller's headers, preceded by our user agent unless they set one.
fn outgoing_headers<'a>(
    user_agent: &'a str,
    headers: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    let mut out = Vec::with_capacity(headers.len() + 1);
    if find_header(headers, "user-agent").is_none() {
        out.push(("user-agent", user_agent));
    }
    out.extend(headers.iter().map(|(name, value)| (name.as_str(), value.as_str())));
    out
}

/// Fetch `url` once with a fresh blocking client.
pub fn fetch(url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
    FetchClient::new().fetch(url, options)
}
