//! Bounded retry policy for remote queries.
//!
//! The policy is a plain value: it classifies nothing and sleeps nowhere. The
//! fetch driver asks it how long to wait after each failed attempt.

use std::time::Duration;

/// How a failed attempt should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// The transport timed out.
    Timeout,
    /// The server was rate limiting (429) or failing (5xx).
    ServerError,
    /// Any other failure; never retried.
    Fatal,
}

/// Maximum attempts and linear backoff per failure class.
///
/// The wait after failed attempt `n` (1-based) is `n × base`, where the base
/// depends on the failure class.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use crowdmap_core::{RetryClass, RetryPolicy};
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff(RetryClass::Timeout, 1), Some(Duration::from_secs(30)));
/// assert_eq!(policy.backoff(RetryClass::ServerError, 2), Some(Duration::from_secs(120)));
/// assert_eq!(policy.backoff(RetryClass::Timeout, 3), None);
/// assert_eq!(policy.backoff(RetryClass::Fatal, 1), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,
    /// Base delay after a timeout.
    pub timeout_backoff: Duration,
    /// Base delay after a rate-limit or server error.
    pub server_error_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_backoff: Duration::from_secs(30),
            server_error_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` with no waiting; useful in tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            timeout_backoff: Duration::ZERO,
            server_error_backoff: Duration::ZERO,
        }
    }

    /// Delay before retrying after failed attempt `attempt` (1-based), or
    /// `None` when the failure is fatal or the budget is spent.
    #[must_use]
    pub fn backoff(&self, class: RetryClass, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let base = match class {
            RetryClass::Timeout => self.timeout_backoff,
            RetryClass::ServerError => self.server_error_backoff,
            RetryClass::Fatal => return None,
        };
        base.checked_mul(attempt)
    }

    /// Classify an HTTP status code.
    #[must_use]
    pub const fn classify_status(status: u16) -> RetryClass {
        if status == 429 || status >= 500 {
            RetryClass::ServerError
        } else {
            RetryClass::Fatal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(429, RetryClass::ServerError)]
    #[case(500, RetryClass::ServerError)]
    #[case(504, RetryClass::ServerError)]
    #[case(400, RetryClass::Fatal)]
    #[case(404, RetryClass::Fatal)]
    fn classifies_statuses(#[case] status: u16, #[case] expected: RetryClass) {
        assert_eq!(RetryPolicy::classify_status(status), expected);
    }

    #[rstest]
    fn backoff_grows_linearly_until_budget_is_spent() {
        let policy = RetryPolicy {
            max_attempts: 4,
            timeout_backoff: Duration::from_secs(2),
            server_error_backoff: Duration::from_secs(5),
        };
        let delays: Vec<_> = (1..=4)
            .map(|attempt| policy.backoff(RetryClass::Timeout, attempt))
            .collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(4)),
                Some(Duration::from_secs(6)),
                None,
            ]
        );
        assert_eq!(
            policy.backoff(RetryClass::ServerError, 3),
            Some(Duration::from_secs(15))
        );
    }

    #[rstest]
    fn single_attempt_policy_never_retries() {
        let policy = RetryPolicy::immediate(1);
        assert_eq!(policy.backoff(RetryClass::Timeout, 1), None);
    }
}
