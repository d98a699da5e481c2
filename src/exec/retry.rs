// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded retry with exponential backoff.
//!
//! The retry boundary is explicit: a fixed attempt budget, a transient/fatal
//! classifier consulted between attempts, and the attempt count carried in
//! both outcomes so callers can report exactly how many submissions happened.

use std::future::Future;
use std::time::Duration;

use crate::chain::ChainError;

/// Retry budget and backoff shape for on-chain submissions.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (not "retries after")
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Backoff ceiling
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Successful outcome plus how many attempts it took.
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Terminal failure: either a fatal error or an exhausted budget.
/// `last` is the most recent underlying cause.
#[derive(Debug)]
pub struct RetryFailure {
    pub attempts: u32,
    pub last: ChainError,
}

/// Drive `op` until it succeeds, fails fatally, or the budget runs out.
///
/// `op` receives the 1-based attempt number. Transient failures (per
/// [`ChainError::is_transient`]) sleep a doubling, capped delay between
/// attempts; fatal failures abort immediately without consuming the
/// remaining budget.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<Attempted<T>, RetryFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ChainError>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                })
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(e) => {
                return Err(RetryFailure {
                    attempts: attempt,
                    last: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn first_attempt_success_uses_one_attempt() {
        let result = run_with_retry(&fast_policy(), |_| async { Ok::<_, ChainError>(42) })
            .await
            .unwrap();
        assert_eq!(result.value, 42);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn transient_failures_then_success_on_third() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&fast_policy(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(ChainError::Rpc("flaky".into()))
                } else {
                    Ok("confirmed")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.value, "confirmed");
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_surfaces_last_cause() {
        let calls = AtomicU32::new(0);
        let failure = run_with_retry(&fast_policy(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(ChainError::Rpc(format!("fail {attempt}"))) }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(failure.last.to_string().contains("fail 3"));
    }

    #[tokio::test]
    async fn fatal_failure_aborts_without_consuming_budget() {
        let calls = AtomicU32::new(0);
        let failure = run_with_retry(&fast_policy(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ChainError::Rejected("insufficient funds".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!failure.last.is_transient());
    }
}
