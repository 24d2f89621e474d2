//! Retry policy for the indexer list request.

use std::time::Duration;

use crate::config::FetchConfig;

use super::FailureKind;

/// Whether a failure kind is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Stop,
}

/// What the fetch loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Sleep for the delay, then try again.
    RetryAfter(Duration),
    /// Terminal failure, return it as is.
    Stop,
    /// The failure was retryable but the attempt budget is spent.
    Exhausted,
}

/// Failure kind to decision table.
pub const RETRY_RULES: &[(FailureKind, RetryDecision)] = &[
    (FailureKind::Configuration, RetryDecision::Stop),
    (FailureKind::Authentication, RetryDecision::Stop),
    (FailureKind::TransientNetwork, RetryDecision::Retry),
    (FailureKind::ProtocolMismatch, RetryDecision::Retry),
    (FailureKind::UnexpectedStatus, RetryDecision::Retry),
    (FailureKind::MalformedResponse, RetryDecision::Stop),
];

/// Bounded fixed-delay retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    rules: &'static [(FailureKind, RetryDecision)],
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            rules: RETRY_RULES,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.retry_delay_secs),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Table lookup. Kinds missing from the table are terminal.
    pub fn decision(&self, kind: FailureKind) -> RetryDecision {
        self.rules
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, d)| *d)
            .unwrap_or(RetryDecision::Stop)
    }

    /// Step after `attempt` (1-based) failed with `kind`.
    pub fn next_step(&self, kind: FailureKind, attempt: u32) -> NextStep {
        match self.decision(kind) {
            RetryDecision::Stop => NextStep::Stop,
            RetryDecision::Retry if attempt >= self.max_attempts => NextStep::Exhausted,
            RetryDecision::Retry => NextStep::RetryAfter(self.delay),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}
