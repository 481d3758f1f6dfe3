//! Transport and fetch failures for remote queries.

use crowdmap_core::{RetryClass, RetryPolicy};
use thiserror::Error;

/// A single failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the client timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP status {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the client.
        message: String,
    },
    /// Connection or protocol failure before a status was received.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Error detail from the client.
        message: String,
    },
    /// The response body was not the expected JSON document.
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder message.
        message: String,
    },
}

impl TransportError {
    /// Whether the failure was a client-side timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status of the failure, if the server answered.
    #[must_use]
    pub const fn server_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Network { .. } | Self::Decode { .. } => None,
        }
    }

    /// How the retry driver should treat this failure.
    #[must_use]
    pub const fn retry_class(&self) -> RetryClass {
        if self.is_timeout() {
            return RetryClass::Timeout;
        }
        match self.server_status() {
            Some(status) => RetryPolicy::classify_status(status),
            None => RetryClass::Fatal,
        }
    }

    /// Map a `reqwest` failure onto the transport taxonomy.
    pub(crate) fn from_reqwest(error: &reqwest::Error, url: &str, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            return Self::Timeout {
                url: url.to_owned(),
                timeout_secs,
            };
        }
        if let Some(status) = error.status() {
            return Self::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            return Self::Decode {
                url: url.to_owned(),
                message: error.to_string(),
            };
        }
        Self::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Terminal outcome of a retried query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Every allowed attempt failed with a retryable error.
    #[error("query failed after {attempts} attempts")]
    RetriesExhausted {
        /// Attempts made, equal to the policy maximum.
        attempts: u32,
        /// Failure of the last attempt.
        #[source]
        source: TransportError,
    },
    /// A non-retryable failure ended the query immediately.
    #[error("query failed on attempt {attempt} without retry")]
    Fatal {
        /// Attempt on which the failure occurred (1-based).
        attempt: u32,
        /// The failure.
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// The transport failure that ended the query.
    #[must_use]
    pub const fn transport(&self) -> &TransportError {
        match self {
            Self::RetriesExhausted { source, .. } | Self::Fatal { source, .. } => source,
        }
    }
}
