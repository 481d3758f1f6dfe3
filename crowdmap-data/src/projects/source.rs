//! Project sources: the Tasking Manager HTTP API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;
use url::Url;

use super::types::{ProjectDetail, ProjectSummary, SearchResponse};
use crate::blocking;
use crate::overpass::{DEFAULT_USER_AGENT, SourceBuildError, TransportError};

/// Production Tasking Manager v2 API.
pub const DEFAULT_TASKING_MANAGER_URL: &str =
    "https://tasking-manager-tm4-production-api.hotosm.org/api/v2";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Search and detail lookups against a project catalogue.
pub trait ProjectSource {
    /// Projects matching free-text `term`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request fails.
    fn search(&self, term: &str) -> Result<Vec<ProjectSummary>, TransportError>;

    /// Full detail for project `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request fails.
    fn project(&self, id: i64) -> Result<ProjectDetail, TransportError>;
}

/// Tasking Manager source blocking on an owned current-thread runtime.
pub struct HttpProjectSource {
    client: Client,
    base: String,
    timeout: Duration,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpProjectSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProjectSource")
            .field("base", &self.base)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpProjectSource {
    /// Create a source for the API rooted at `base` with a 30 s timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an absolute URL or the client or
    /// runtime fails to build.
    pub fn new(base: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_timeout(base, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// See [`HttpProjectSource::new`].
    pub fn with_timeout(
        base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceBuildError> {
        let base = base.into();
        Url::parse(&base).map_err(|source| SourceBuildError::InvalidUrl {
            url: base.clone(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = blocking::current_thread_runtime().map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_owned(),
            timeout,
            runtime,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/projects/", self.base)
    }

    fn detail_url(&self, id: i64) -> String {
        format!("{}/projects/{id}/", self.base)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let timeout_secs = self.timeout.as_secs();
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))?
            .error_for_status()
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))?;
        response
            .json()
            .await
            .map_err(|err| TransportError::from_reqwest(&err, url, timeout_secs))
    }
}

impl ProjectSource for HttpProjectSource {
    fn search(&self, term: &str) -> Result<Vec<ProjectSummary>, TransportError> {
        let url = self.search_url();
        let query = [("textSearch", term)];
        let future = self.get_json::<SearchResponse>(&url, &query);
        blocking::block_on(&self.runtime, future).map(|response| response.results)
    }

    fn project(&self, id: i64) -> Result<ProjectDetail, TransportError> {
        let url = self.detail_url(id);
        let query = [("as_file", "false"), ("abbreviated", "false")];
        blocking::block_on(&self.runtime, self.get_json(&url, &query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use rstest::rstest;

    #[rstest]
    #[case("https://tm.example/api/v2")]
    #[case("https://tm.example/api/v2/")]
    fn builds_endpoint_urls(#[case] base: &str) {
        let source = HttpProjectSource::new(base).expect("source should build");
        assert_eq!(source.search_url(), "https://tm.example/api/v2/projects/");
        assert_eq!(source.detail_url(39738), "https://tm.example/api/v2/projects/39738/");
    }

    #[rstest]
    fn rejects_relative_base() {
        let err = HttpProjectSource::new("api/v2").expect_err("relative base");
        assert!(matches!(err, SourceBuildError::InvalidUrl { .. }));
    }

    #[rstest]
    fn slow_detail_body_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let server = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = [0_u8; 4096];
            let _read = stream.read(&mut request);
            let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n";
            let _written = stream.write_all(head.as_bytes());
            let _written = stream.write_all(br#"{"projectId": 39738, "#);
            let _flushed = stream.flush();
            thread::sleep(Duration::from_secs(3));
        });
        let source = HttpProjectSource::with_timeout(
            format!("http://{addr}/api/v2"),
            Duration::from_secs(1),
        )
        .expect("source should build");

        let err = source.project(39738).expect_err("body never completes");

        assert!(
            matches!(err, TransportError::Timeout { timeout_secs: 1, .. }),
            "unexpected error: {err:?}"
        );
        server.join().expect("server thread");
    }
}
