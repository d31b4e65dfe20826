// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Retry utilities with exponential backoff for API calls.
//!
//! A single [`RetryPolicy`] is shared by the REST and GraphQL clients. The
//! policy decides, through [`RetryClassifier`], whether a failure is
//! transient (retried after a backoff delay) or fatal (surfaced at once).

use std::time::Duration;

use reqwest::Method;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// HTTP statuses treated as transient by default.
pub const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Outcome of classifying a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Disposition
{
    /// The request may succeed if issued again.
    Transient,
    /// Retrying cannot help.
    Fatal,
}

/// Decides whether a failed request should be retried.
pub trait RetryClassifier
{
    /// Classifies `error` produced by a request issued with `method`.
    fn classify(&self, method: &Method, error: &Error,) -> Disposition;
}

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq,)]
pub struct RetryPolicy
{
    /// Maximum number of retries after the first attempt (default: 3).
    pub max_retries:        u32,
    /// Delay before the first retry (default: 1s).
    pub base_delay:         Duration,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:     f64,
    /// HTTP statuses considered transient.
    pub transient_statuses: Vec<u16,>,
}

impl Default for RetryPolicy
{
    fn default() -> Self
    {
        Self {
            max_retries:        3,
            base_delay:         Duration::from_secs(1,),
            backoff_factor:     2.0,
            transient_statuses: TRANSIENT_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy
{
    /// Backoff delay applied before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32,) -> Duration
    {
        let exponent = retry.saturating_sub(1,).min(16,) as i32;
        self.base_delay.mul_f64(self.backoff_factor.max(1.0,).powi(exponent,),)
    }

    /// Whether requests issued with `method` may be retried at all.
    pub fn allows_method(&self, method: &Method,) -> bool
    {
        *method == Method::GET || *method == Method::POST
    }
}

impl RetryClassifier for RetryPolicy
{
    fn classify(&self, method: &Method, error: &Error,) -> Disposition
    {
        if !self.allows_method(method,) {
            return Disposition::Fatal;
        }

        match error {
            Error::Transport {
                ..
            } => Disposition::Transient,
            Error::RateLimit {
                recoverable: true, ..
            } => Disposition::Transient,
            Error::Api {
                status: Some(status,),
                ..
            } if self.transient_statuses.contains(status,) => Disposition::Transient,
            _ => Disposition::Fatal,
        }
    }
}

/// Executes an async operation, retrying transient failures with exponential
/// backoff.
///
/// # Arguments
///
/// * `policy` - Retry policy (max retries, delays)
/// * `classifier` - Decides which failures are transient
/// * `method` - HTTP method of the request being retried
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the first fatal error, or the last transient error once
/// `policy.max_retries` retries are exhausted.
///
/// # Example
///
/// ```no_run
/// use gitstats::{Error, retry::{RetryPolicy, retry_with_backoff}};
/// use reqwest::Method;
///
/// # async fn example() -> Result<(), Error> {
/// let policy = RetryPolicy::default();
/// let value = retry_with_backoff(&policy, &policy, &Method::GET, "fetch data", || async {
///     Ok::<_, Error,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<C, F, Fut, T,>(
    policy: &RetryPolicy,
    classifier: &C,
    method: &Method,
    operation_name: &str,
    mut f: F,
) -> Result<T, Error,>
where
    C: RetryClassifier + ?Sized,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error,>,>,
{
    let mut retry = 0u32;

    loop {
        match f().await {
            Ok(result,) => {
                if retry > 0 {
                    debug!("{} succeeded after {} retries", operation_name, retry);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if classifier.classify(method, &error,) == Disposition::Fatal {
                    return Err(error,);
                }

                if retry >= policy.max_retries {
                    warn!(
                        "{} failed after {} retries: {}",
                        operation_name, policy.max_retries, error
                    );
                    return Err(error,);
                }

                retry += 1;
                let delay = policy.delay_for(retry,);
                warn!(
                    "{} failed ({}), retry {}/{} in {}ms",
                    operation_name,
                    error,
                    retry,
                    policy.max_retries,
                    delay.as_millis()
                );

                sleep(delay,).await;
            }
        }
    }
}
