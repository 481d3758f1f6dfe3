//! HTTP [`ElementSource`] posting Overpass QL with `reqwest`.
//!
//! The [`ElementSource`] trait is synchronous so the sync orchestrator stays
//! a plain sequential function. This source bridges to the async client by
//! blocking on a Tokio runtime it owns.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::Runtime;
use url::Url;

use super::element::{OverpassResponse, RawRecord};
use super::error::TransportError;
use super::query::OverpassQuery;
use super::ElementSource;
use crate::blocking;

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for remote requests.
pub const DEFAULT_USER_AGENT: &str = concat!("crowdmap/", env!("CARGO_PKG_VERSION"));

/// Server-side queries may run for up to 300 s; leave headroom for transfer.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Failure to construct an HTTP source.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// The endpoint is not an absolute URL.
    #[error("invalid endpoint URL '{url}'")]
    InvalidUrl {
        /// Rejected endpoint.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be built.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpOverpassSource`].
#[derive(Debug, Clone)]
pub struct HttpOverpassSourceConfig {
    /// Interpreter endpoint.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpOverpassSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpOverpassSourceConfig {
    /// Configuration for `endpoint` with default timeout and user agent.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Overpass source that blocks on an owned current-thread runtime.
///
/// Called from inside a multi-threaded Tokio runtime it borrows that runtime
/// through [`tokio::task::block_in_place`] instead.
pub struct HttpOverpassSource {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpOverpassSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOverpassSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpOverpassSource {
    /// Create a source for `endpoint` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client or runtime fails
    /// to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpOverpassSourceConfig::new(endpoint))
    }

    /// Create a source from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client or runtime fails
    /// to build.
    pub fn with_config(config: HttpOverpassSourceConfig) -> Result<Self, SourceBuildError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| SourceBuildError::InvalidUrl {
                url: config.endpoint.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = blocking::current_thread_runtime().map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout,
            runtime,
        })
    }

    /// The interpreter endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch_async(&self, ql: String) -> Result<Vec<RawRecord>, TransportError> {
        let url = self.endpoint.as_str();
        let timeout_secs = self.timeout.as_secs();
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("data", ql)])
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))?
            .error_for_status()
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))?;
        // Body reads can time out too; `from_reqwest` checks that before decode.
        let body: OverpassResponse = response
            .json()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))?;
        Ok(body.into_records())
    }
}

impl ElementSource for HttpOverpassSource {
    fn fetch(&self, query: &OverpassQuery) -> Result<Vec<RawRecord>, TransportError> {
        blocking::block_on(&self.runtime, self.fetch_async(query.to_ql()))
    }
}
