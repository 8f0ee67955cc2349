//! Retry policies for lab checks.
//!
//! Freshly deployed labs need a few seconds before OSPF adjacencies form and
//! routes converge, so health probes are polled until they pass.
//!
//! # Example
//!
//! ```rust,ignore
//! use netauto::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::constant(5, Duration::from_secs(2));
//! let output = policy
//!     .execute_until(|| conn.execute("vtysh -c 'show ip ospf neighbor'", None), |r| r.stdout.contains("Full"))
//!     .await?;
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Backoff strategy for calculating delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Constant delay between attempts.
    #[default]
    Constant,

    /// Linear backoff: delay = initial_delay * (attempt + 1)
    Linear,

    /// Exponential backoff: delay = initial_delay * multiplier^attempt
    Exponential {
        /// Multiplier for exponential growth
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Calculate the delay after a given attempt number (0-indexed).
    pub fn calculate_delay(&self, attempt: u32, initial_delay: Duration) -> Duration {
        let base_millis = initial_delay.as_millis() as f64;

        let delay_millis = match self {
            Self::Constant => base_millis,
            Self::Linear => base_millis * (attempt as f64 + 1.0),
            Self::Exponential { multiplier } => base_millis * multiplier.powf(attempt as f64),
        };

        Duration::from_millis(delay_millis as u64)
    }
}

/// Errors returned when all attempts are used up.
#[derive(Debug, Error)]
pub enum RetryError<T, E>
where
    T: std::fmt::Debug,
    E: std::fmt::Debug + std::fmt::Display,
{
    /// The last attempt failed with an error.
    #[error("failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt
        last_error: E,
    },

    /// Every attempt completed but none satisfied the condition.
    #[error("condition not met after {attempts} attempts")]
    ConditionNotMet {
        /// Attempts made
        attempts: u32,
        /// Value of the final attempt
        last_value: T,
    },
}

impl<T, E> RetryError<T, E>
where
    T: std::fmt::Debug,
    E: std::fmt::Debug + std::fmt::Display,
{
    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::MaxRetriesExceeded { attempts, .. } | Self::ConditionNotMet { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// How often and how patiently an operation is attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, at least 1.
    pub attempts: u32,

    /// Delay after the first failed attempt.
    pub initial_delay: Duration,

    /// Maximum delay between attempts.
    pub max_delay: Duration,

    /// Backoff strategy for calculating delays.
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::constant(5, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Create a policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self::constant(1, Duration::ZERO)
    }

    /// Create a policy with a constant delay.
    pub fn constant(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay: delay,
            max_delay: delay,
            backoff: BackoffStrategy::Constant,
        }
    }

    /// Create a policy with exponential backoff.
    pub fn exponential(attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay,
            max_delay,
            backoff: BackoffStrategy::Exponential { multiplier: 2.0 },
        }
    }

    /// Calculate the delay after a given attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff
            .calculate_delay(attempt, self.initial_delay)
            .min(self.max_delay)
    }

    /// Run `operation` until `success_condition` holds for its output.
    ///
    /// Errors are retried like unsatisfied results. The final failure carries
    /// the last value or error for diagnostics.
    pub async fn execute_until<F, Fut, T, E, C>(
        &self,
        mut operation: F,
        success_condition: C,
    ) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: std::fmt::Debug,
        E: std::fmt::Debug + std::fmt::Display,
        C: Fn(&T) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;

        loop {
            debug!("Attempt {} of {}", attempt + 1, attempts);
            let last = attempt + 1 >= attempts;

            match operation().await {
                Ok(value) => {
                    if success_condition(&value) {
                        if attempt > 0 {
                            debug!("Condition met after {} retries", attempt);
                        }
                        return Ok(value);
                    }
                    if last {
                        return Err(RetryError::ConditionNotMet {
                            attempts,
                            last_value: value,
                        });
                    }
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    if last {
                        return Err(RetryError::MaxRetriesExceeded {
                            attempts,
                            last_error: e,
                        });
                    }
                }
            }

            let delay = self.delay_for_attempt(attempt);
            debug!("Waiting {:?} before retry", delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
