//! Bounded retry driver for remote queries.
//!
//! Attempts run strictly one after another on the calling thread. There is no
//! external cancellation: the loop ends on success, on a fatal failure, or
//! when the policy's attempt budget is spent.

use std::time::Duration;

use crowdmap_core::{RetryClass, RetryPolicy};
use log::{debug, warn};

use super::error::{FetchError, TransportError};

/// Run `request` under `policy`, sleeping on the current thread between
/// attempts.
///
/// `request` receives the 1-based attempt number.
///
/// # Errors
///
/// Returns [`FetchError::Fatal`] for the first non-retryable failure and
/// [`FetchError::RetriesExhausted`] when every allowed attempt failed.
pub fn fetch_with_retry<T, F>(policy: &RetryPolicy, request: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, TransportError>,
{
    fetch_with_retry_using(policy, std::thread::sleep, request)
}

/// As [`fetch_with_retry`], with an explicit `sleep` hook.
///
/// # Errors
///
/// See [`fetch_with_retry`].
///
/// # Examples
/// ```
/// use crowdmap_core::RetryPolicy;
/// use crowdmap_data::overpass::{TransportError, fetch_with_retry_using};
///
/// let mut waits = Vec::new();
/// let result = fetch_with_retry_using(&RetryPolicy::default(), |d| waits.push(d), |attempt| {
///     if attempt < 3 {
///         Err(TransportError::Timeout { url: "u".to_owned(), timeout_secs: 600 })
///     } else {
///         Ok(attempt)
///     }
/// });
/// assert_eq!(result, Ok(3));
/// assert_eq!(waits.iter().map(|d| d.as_secs()).collect::<Vec<_>>(), vec![30, 60]);
/// ```
pub fn fetch_with_retry_using<T, S, F>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut request: F,
) -> Result<T, FetchError>
where
    S: FnMut(Duration),
    F: FnMut(u32) -> Result<T, TransportError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        debug!("query attempt {attempt}/{max_attempts}");
        let error = match request(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let class = error.retry_class();
        let Some(wait) = policy.backoff(class, attempt) else {
            return Err(if attempt >= max_attempts && class != RetryClass::Fatal {
                FetchError::RetriesExhausted {
                    attempts: attempt,
                    source: error,
                }
            } else {
                FetchError::Fatal {
                    attempt,
                    source: error,
                }
            });
        };

        warn!(
            "{error}; retrying in {}s (attempt {}/{max_attempts})",
            wait.as_secs(),
            attempt + 1
        );
        sleep(wait);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn timeout() -> TransportError {
        TransportError::Timeout {
            url: "https://overpass.example/api".to_owned(),
            timeout_secs: 600,
        }
    }

    fn status(code: u16) -> TransportError {
        TransportError::Http {
            url: "https://overpass.example/api".to_owned(),
            status: code,
            message: format!("HTTP {code}"),
        }
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn repeated_timeouts_use_exactly_the_budget(#[case] max_attempts: u32) {
        let mut calls = 0;
        let result: Result<(), _> =
            fetch_with_retry_using(&RetryPolicy::immediate(max_attempts), |_| {}, |_| {
                calls += 1;
                Err(timeout())
            });
        assert_eq!(calls, max_attempts);
        assert_eq!(
            result,
            Err(FetchError::RetriesExhausted {
                attempts: max_attempts,
                source: timeout(),
            })
        );
    }

    #[rstest]
    fn success_on_final_attempt_stops_retrying() {
        let mut calls = 0;
        let result = fetch_with_retry_using(&RetryPolicy::immediate(3), |_| {}, |attempt| {
            calls += 1;
            if attempt == 3 { Ok("elements") } else { Err(status(503)) }
        });
        assert_eq!(result, Ok("elements"));
        assert_eq!(calls, 3);
    }

    #[rstest]
    #[case(400)]
    #[case(404)]
    fn client_errors_fail_immediately(#[case] code: u16) {
        let mut calls = 0;
        let result: Result<(), _> = fetch_with_retry_using(&RetryPolicy::default(), |_| {}, |_| {
            calls += 1;
            Err(status(code))
        });
        assert_eq!(calls, 1);
        assert_eq!(
            result,
            Err(FetchError::Fatal {
                attempt: 1,
                source: status(code),
            })
        );
    }

    #[rstest]
    fn server_errors_back_off_linearly_on_the_larger_base() {
        let mut waits = Vec::new();
        let result: Result<(), _> =
            fetch_with_retry_using(&RetryPolicy::default(), |wait| waits.push(wait), |_| {
                Err(status(429))
            });
        assert!(matches!(result, Err(FetchError::RetriesExhausted { attempts: 3, .. })));
        assert_eq!(waits, vec![Duration::from_secs(60), Duration::from_secs(120)]);
    }

    #[rstest]
    fn zero_attempt_policy_still_tries_once() {
        let mut calls = 0;
        let result = fetch_with_retry_using(&RetryPolicy::immediate(0), |_| {}, |_| {
            calls += 1;
            Ok(1)
        });
        assert_eq!(result, Ok(1));
        assert_eq!(calls, 1);
    }
}
