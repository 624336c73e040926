//! Retry/backoff shared by every TMDB request.
//!
//! A logical request gets up to `max_attempts` tries. Between tries:
//!
//! | Failure | Wait before next attempt |
//! |---------|--------------------------|
//! | 429 with a parseable rate-limit header | header seconds × 1000 ms |
//! | 429 without one | `base_delay × attempt` (linear) |
//! | any other non-2xx status | `base_delay` |
//! | transport failure | `base_delay` |
//!
//! There is no wait after the final attempt. Deserialization and URL errors
//! are returned immediately.

use std::future::Future;
use std::time::Duration;

use reelid_core::LogSink;
use reqwest::header::{HeaderName, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};

use crate::error::TmdbError;

/// Parameters for [`RetryingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per logical request, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Response header carrying the server's requested wait, in seconds.
    pub rate_limit_header: HeaderName,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            rate_limit_header: RETRY_AFTER,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, err: &TmdbError, attempt: u32) -> Duration {
        match err {
            TmdbError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            TmdbError::RateLimited {
                retry_after_ms: None,
            } => self.base_delay.saturating_mul(attempt.max(1)),
            _ => self.base_delay,
        }
    }
}

/// Returns `true` for failures the policy retries.
///
/// Deserialization and configuration errors would fail identically on the
/// next attempt.
fn is_retriable(err: &TmdbError) -> bool {
    matches!(
        err,
        TmdbError::Http(_) | TmdbError::RateLimited { .. } | TmdbError::UnexpectedStatus { .. }
    )
}

/// Runs `operation` under `policy`.
///
/// Every retry is announced on `log` and as a `tracing` warning. When the
/// last allowed attempt fails, the error is wrapped in
/// [`TmdbError::RetriesExhausted`].
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    context: &str,
    log: &dyn LogSink,
    mut operation: F,
) -> Result<T, TmdbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TmdbError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }

        match &err {
            TmdbError::Http(e) => log.append(format!("Fetch request failed for {context}: {e}")),
            TmdbError::UnexpectedStatus { status } => {
                log.append(format!("Fetch failed for {context} with status {status}."));
            }
            _ => {}
        }

        if attempt >= max_attempts {
            return Err(TmdbError::RetriesExhausted {
                context: context.to_owned(),
                attempts: attempt,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_for(&err, attempt);
        if matches!(err, TmdbError::RateLimited { .. }) {
            log.append(format!(
                "Rate limited by TMDB. Retrying after {}ms...",
                delay.as_millis()
            ));
        } else {
            log.append(format!("Retrying {context}..."));
        }
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient TMDB error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// `reqwest::Client` paired with a [`RetryPolicy`], used for every TMDB call.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    #[must_use]
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GETs `url` and returns the body of the first 2xx response.
    ///
    /// `context` names the request in logs and errors; it must not contain
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::RetriesExhausted`] once every attempt has failed.
    pub async fn get_text(
        &self,
        url: &Url,
        context: &str,
        log: &dyn LogSink,
    ) -> Result<String, TmdbError> {
        let rate_limit_header = &self.policy.rate_limit_header;

        retry_with_backoff(&self.policy, context, log, || {
            let url = url.clone();
            async move {
                // The URL carries the API key; keep it out of error text.
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| TmdbError::Http(e.without_url()))?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_ms = response
                        .headers()
                        .get(rate_limit_header)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .map(|secs| secs.saturating_mul(1_000));
                    return Err(TmdbError::RateLimited { retry_after_ms });
                }

                if !status.is_success() {
                    return Err(TmdbError::UnexpectedStatus {
                        status: status.as_u16(),
                    });
                }

                response
                    .text()
                    .await
                    .map_err(|e| TmdbError::Http(e.without_url()))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelid_core::ResolutionLog;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    fn deserialize_err() -> TmdbError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        TmdbError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn retry_after_header_is_honoured() {
        let policy = RetryPolicy::default();
        let err = TmdbError::RateLimited {
            retry_after_ms: Some(2_000),
        };
        assert_eq!(policy.delay_for(&err, 1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(&err, 2), Duration::from_millis(2_000));
    }

    #[test]
    fn rate_limit_without_header_backs_off_linearly() {
        let policy = RetryPolicy::default();
        let err = TmdbError::RateLimited {
            retry_after_ms: None,
        };
        assert_eq!(policy.delay_for(&err, 1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(&err, 2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(&err, 3), Duration::from_millis(3_000));
    }

    #[test]
    fn other_failures_use_fixed_delay() {
        let policy = RetryPolicy::default();
        let err = TmdbError::UnexpectedStatus { status: 502 };
        assert_eq!(policy.delay_for(&err, 1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(&err, 3), Duration::from_millis(1_000));
    }

    #[test]
    fn new_clamps_attempts_to_at_least_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
        assert!(is_retriable(&TmdbError::UnexpectedStatus { status: 500 }));
        assert!(is_retriable(&TmdbError::RateLimited {
            retry_after_ms: None
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let log = ResolutionLog::new();
        let result = retry_with_backoff(&instant_policy(3), "test", &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, TmdbError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn retries_status_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let log = ResolutionLog::new();
        let result = retry_with_backoff(&instant_policy(3), "test", &log, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TmdbError::UnexpectedStatus { status: 500 })
                } else {
                    Ok::<u32, TmdbError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(log.contains("with status 500"));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let log = ResolutionLog::new();
        let result = retry_with_backoff(&instant_policy(3), "search", &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(TmdbError::RateLimited {
                    retry_after_ms: Some(0),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(
            matches!(result, Err(TmdbError::RetriesExhausted { attempts: 3, .. })),
            "expected RetriesExhausted after 3 attempts, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let log = ResolutionLog::new();
        let result = retry_with_backoff(&instant_policy(3), "test", &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(deserialize_err())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(TmdbError::Deserialize { .. })));
    }
}
