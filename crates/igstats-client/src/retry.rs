//! Linear back-off retry for credential login.
//!
//! [`retry_linear`] retries generic failures, sleeping `attempt * step` after
//! each failed attempt. Security challenges, rate limits and network blocks
//! are returned immediately: repeating a login in those states only makes
//! the block last longer.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Returns `true` for login failures that are worth another attempt.
///
/// **Not retriable:**
/// - [`ApiError::ChallengeRequired`]: needs human action in the app.
/// - [`ApiError::PleaseWait`]: the platform is already throttling us.
/// - [`ApiError::IpBlocked`]: the network itself is rejected.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    !matches!(
        err,
        ApiError::ChallengeRequired(_) | ApiError::PleaseWait(_) | ApiError::IpBlocked(_)
    )
}

/// The error that ended a retry loop, and how many attempts were made.
#[derive(Debug)]
pub(crate) struct RetryExhausted {
    pub attempts: u32,
    pub error: ApiError,
}

/// Runs `operation` up to `max_attempts` times.
///
/// Back-off schedule with `step = 5 s`:
///
/// | Failed attempt | Sleep before next attempt |
/// |----------------|---------------------------|
/// | 1              | 5 s                       |
/// | 2              | 10 s                      |
/// | 3              | 15 s                      |
///
/// No sleep follows the final attempt. A `max_attempts` of zero still makes
/// one attempt.
pub(crate) async fn retry_linear<T, F, Fut>(
    max_attempts: u32,
    step: Duration,
    mut operation: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1u32;
    loop {
        tracing::info!(attempt, max_attempts, "login attempt");
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !is_retriable(&error) || attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        error,
                    });
                }
                let delay = step.saturating_mul(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %error,
                    "login failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tokio::time::Instant;

    use super::*;

    fn generic() -> ApiError {
        ApiError::Api {
            status: 400,
            message: "bad password".to_owned(),
        }
    }

    #[test]
    fn challenge_is_not_retriable() {
        assert!(!is_retriable(&ApiError::ChallengeRequired("c".to_owned())));
    }

    #[test]
    fn please_wait_is_not_retriable() {
        assert!(!is_retriable(&ApiError::PleaseWait("p".to_owned())));
    }

    #[test]
    fn ip_block_is_not_retriable() {
        assert!(!is_retriable(&ApiError::IpBlocked("ip".to_owned())));
    }

    #[test]
    fn generic_api_error_is_retriable() {
        assert!(is_retriable(&generic()));
        assert!(is_retriable(&ApiError::LoginRequired("l".to_owned())));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_after_max_attempts_with_linear_delays() {
        let calls = RefCell::new(Vec::new());
        let result: Result<(), _> = retry_linear(3, Duration::from_secs(5), || {
            calls.borrow_mut().push(Instant::now());
            async { Err(generic()) }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert!(matches!(exhausted.error, ApiError::Api { status: 400, .. }));

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(5));
        assert_eq!(calls[2] - calls[1], Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_success() {
        let mut count = 0u32;
        let result = retry_linear(3, Duration::from_secs(5), || {
            count += 1;
            let n = count;
            async move {
                if n < 2 {
                    Err(generic())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.expect("second attempt succeeds"), 2);
        assert_eq!(count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retriable_error_returns_immediately() {
        let start = Instant::now();
        let mut count = 0u32;
        let result: Result<(), _> = retry_linear(3, Duration::from_secs(5), || {
            count += 1;
            async { Err(ApiError::ChallengeRequired("checkpoint".to_owned())) }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 1);
        assert_eq!(count, 1);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_attempts_still_tries_once() {
        let mut count = 0u32;
        let result: Result<(), _> = retry_linear(0, Duration::from_secs(5), || {
            count += 1;
            async { Err(generic()) }
        })
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(count, 1);
    }
}
