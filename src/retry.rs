// ABOUTME: Attempt-count retry budget and the polling state machine shared by every wait stage.
// ABOUTME: Delays go through the Sleeper trait so tests can count waits instead of sleeping.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Number of poll attempts that fit into `max_timeout_ms` at `check_interval_ms`.
///
/// Integer division, rounded down. Zero attempts means the wait is exhausted
/// before the first poll. A zero interval must be rejected by the caller;
/// it yields zero here rather than dividing by zero.
pub fn attempts(max_timeout_ms: u64, check_interval_ms: u64) -> u64 {
    max_timeout_ms.checked_div(check_interval_ms).unwrap_or(0)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryPolicyError {
    #[error("check interval must be greater than zero")]
    ZeroInterval,
}

/// Maximum wait and poll interval for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_timeout: Duration,
    check_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_timeout: Duration, check_interval: Duration) -> Result<Self, RetryPolicyError> {
        if check_interval.as_millis() == 0 {
            return Err(RetryPolicyError::ZeroInterval);
        }

        Ok(Self {
            max_timeout,
            check_interval,
        })
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Attempt budget derived from the policy.
    pub fn attempts(&self) -> u64 {
        attempts(
            duration_millis(self.max_timeout),
            duration_millis(self.check_interval),
        )
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Pauses between poll attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Position of an attempt within the budget, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptNumber {
    pub current: u64,
    pub total: u64,
}

impl std::fmt::Display for AttemptNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

/// Result of a single poll attempt.
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// The awaited condition holds.
    Ready(T),
    /// Not yet; carries the error that made this attempt fail, if any.
    Retry(Option<E>),
}

/// States of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Attempting(u64),
    Waiting(u64),
}

/// Terminal outcome of a polling loop.
#[derive(Debug)]
pub enum PollOutcome<T, E> {
    Succeeded { value: T, attempt: u64 },
    Exhausted { attempts: u64, last_error: Option<E> },
}

/// Drives an attempt closure through `Attempting -> Waiting -> {Succeeded, Exhausted}`.
///
/// Every failed attempt is followed by one interval wait, the last one
/// included, so a fully exhausted budget of `n` attempts waits `n` times.
pub struct Poller<'a> {
    policy: RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Poller<'a> {
    pub fn new(policy: RetryPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self { policy, sleeper }
    }

    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> PollOutcome<T, E>
    where
        F: FnMut(AttemptNumber) -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
    {
        let total = self.policy.attempts();
        let mut last_error = None;
        let mut state = PollState::Attempting(1);

        loop {
            state = match state {
                PollState::Attempting(current) if current > total => {
                    return PollOutcome::Exhausted {
                        attempts: total,
                        last_error,
                    };
                }
                PollState::Attempting(current) => {
                    match attempt(AttemptNumber { current, total }).await {
                        Attempt::Ready(value) => {
                            return PollOutcome::Succeeded {
                                value,
                                attempt: current,
                            };
                        }
                        Attempt::Retry(error) => {
                            last_error = error;
                            PollState::Waiting(current)
                        }
                    }
                }
                PollState::Waiting(current) => {
                    self.sleeper.sleep(self.policy.check_interval).await;
                    PollState::Attempting(current + 1)
                }
            };
        }
    }
}
