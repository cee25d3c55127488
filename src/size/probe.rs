//! Single-attempt size probes.
//!
//! [`HttpProbe`] asks the server with `HEAD` first. When the answer carries no
//! usable `Content-Length`, it streams the body with `GET` and counts bytes as
//! they arrive, keeping nothing but the running total.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::ProbeError;
use crate::user_agent;

/// Input for one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    url: String,
    timeout: Duration,
}

impl ProbeRequest {
    /// Creates a request. A zero `timeout` disables the per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// The URL to probe.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Per-request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}

/// Something that can measure a remote resource once.
///
/// This trait uses `async_trait` so resolvers can hold a `Box<dyn SizeProbe>`;
/// tests substitute scripted probes for the HTTP one.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    /// Returns the resource's byte count, or why this attempt failed.
    async fn probe(&self, request: &ProbeRequest) -> Result<u64, ProbeError>;
}

/// What a `HEAD` response says about the body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclaredLength {
    /// A parseable `Content-Length`. Zero is a valid answer, not a missing one.
    Bytes(u64),
    /// Header absent or not a valid integer.
    NoContentLength,
}

/// Reads `Content-Length` from response headers.
pub(crate) fn declared_length(headers: &HeaderMap) -> DeclaredLength {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map_or(DeclaredLength::NoContentLength, DeclaredLength::Bytes)
}

/// Sums chunk lengths of a byte stream without retaining the chunks.
///
/// # Errors
///
/// Returns the first error the stream yields.
pub async fn count_stream_bytes<S, B, E>(stream: S) -> Result<u64, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    stream
        .try_fold(0_u64, |total, chunk| async move {
            Ok::<u64, E>(total + chunk.as_ref().len() as u64)
        })
        .await
}

/// HTTP(S) size probe backed by reqwest.
///
/// Create once and reuse; the underlying client pools connections, but each
/// attempt's response and stream are dropped before the attempt returns.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    /// Creates a probe with the default 30 second connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_connect_timeout(CONNECT_TIMEOUT_SECS)
    }

    /// Creates a probe with an explicit connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_connect_timeout(connect_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn send_request(
        &self,
        method: Method,
        request: &ProbeRequest,
    ) -> Result<reqwest::Response, ProbeError> {
        let url = request.url();
        let mut builder = self.client.request(method.clone(), url);
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        if response.status() != StatusCode::OK {
            let label = if method == Method::HEAD { "HEAD" } else { "GET" };
            return Err(ProbeError::unexpected_status(
                url,
                label,
                response.status().as_u16(),
            ));
        }

        Ok(response)
    }

    async fn head_length(&self, request: &ProbeRequest) -> Result<DeclaredLength, ProbeError> {
        let response = self.send_request(Method::HEAD, request).await?;
        Ok(declared_length(response.headers()))
    }

    async fn streamed_length(&self, request: &ProbeRequest) -> Result<u64, ProbeError> {
        let response = self.send_request(Method::GET, request).await?;
        count_stream_bytes(response.bytes_stream())
            .await
            .map_err(|e| ProbeError::from_reqwest(request.url(), e))
    }
}

#[async_trait]
impl SizeProbe for HttpProbe {
    #[instrument(skip(self, request), fields(url = %request.url()))]
    async fn probe(&self, request: &ProbeRequest) -> Result<u64, ProbeError> {
        let parsed = Url::parse(request.url()).map_err(|_| ProbeError::invalid_url(request.url()))?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ProbeError::invalid_url(request.url()));
        }

        if let DeclaredLength::Bytes(bytes) = self.head_length(request).await? {
            debug!(bytes, "content length from HEAD");
            return Ok(bytes);
        }
        debug!("no content length on HEAD; streaming body");

        let bytes = self.streamed_length(request).await?;
        debug!(bytes, "content length from streamed body");
        Ok(bytes)
    }
}

fn build_client(connect_timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(user_agent::default_probe_user_agent())
        .build()
}
