// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized retry loop for transient control-plane failures.
//!
//! Call sites declare only a label and a budget; the backoff policy and
//! the retryable predicate live in one place.

use crate::error::ApiError;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use wharf_core::{Backoff, RetryBudget};

/// Run `f`, retrying transient failures with exponential backoff until the
/// budget is exhausted. Cancellation interrupts both the call gap and the
/// next attempt.
pub async fn with_retries<T, F, Fut>(
    op: &str,
    budget: RetryBudget,
    token: &CancellationToken,
    mut f: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut backoff = Backoff::standard();
    let mut attempt = 1u32;
    loop {
        if token.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        match f().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < budget.attempts() => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    op,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient control plane error, retrying"
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = token.cancelled() => return Err(ApiError::Cancelled),
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
