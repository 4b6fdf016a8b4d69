//! Per-URL resolution: probe, fall back to navigation, retry with backoff.
//!
//! Each URL walks an explicit state machine:
//!
//! ```text
//! Probing -> Resolved
//!         -> NavigationPending -> Resolved
//!                              -> Retrying -> Probing
//!                              -> Unresolved
//! ```
//!
//! The transitions are plain functions of the previous state and the tier
//! result, so the retry contract is testable without network or renderer.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ExpansionConfig;
use crate::core::error::Result;
use crate::core::types::ResolutionOutcome;
use crate::expansion::pool::Navigate;
use crate::expansion::probe::RedirectProbe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// Running the cheap redirect probe. `attempt` is 1-based.
    Probing { attempt: u32 },
    /// Probe found nothing usable, handing the URL to the navigator.
    NavigationPending { attempt: u32 },
    /// Navigation failed; wait `delay` before the next attempt.
    Retrying { attempt: u32, delay: Duration },
    Resolved(String),
    Unresolved,
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Unresolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Linear backoff: the wait before retry `n` is `n * backoff_step`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ExpansionConfig::default())
    }
}

impl From<&ExpansionConfig> for RetryPolicy {
    fn from(config: &ExpansionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_step: config.retry_delay(),
        }
    }
}

impl RetryPolicy {
    /// Decision after attempt number `attempt` (1-based) failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt > self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff_step.saturating_mul(attempt))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Next state once the probe of `url` finished.
pub fn after_probe(url: &str, attempt: u32, probed: Result<Option<String>>) -> ResolutionState {
    match probed {
        Ok(Some(location)) if location != url => ResolutionState::Resolved(location),
        Ok(_) => ResolutionState::NavigationPending { attempt },
        Err(e) => {
            log::debug!("Probe of {url} failed, falling back to navigation: {e}");
            ResolutionState::NavigationPending { attempt }
        }
    }
}

/// Next state once navigation of `url` finished.
pub fn after_navigation(
    url: &str,
    attempt: u32,
    navigated: Result<String>,
    policy: &RetryPolicy,
) -> ResolutionState {
    match navigated {
        Ok(final_url) => ResolutionState::Resolved(final_url),
        Err(e) => match policy.decide(attempt) {
            RetryDecision::RetryAfter(delay) => {
                log::debug!(
                    "Attempt {attempt} for {url} failed ({e}), retrying in {}ms",
                    delay.as_millis()
                );
                ResolutionState::Retrying { attempt, delay }
            }
            RetryDecision::NoRetry => {
                log::warn!("Giving up on {url} after {attempt} attempts: {e}");
                ResolutionState::Unresolved
            }
        },
    }
}

#[async_trait]
pub trait Resolve: Send + Sync {
    /// Never fails: anything unrecoverable comes back unresolved.
    async fn resolve(&self, url: &str) -> ResolutionOutcome;
}

pub struct RedirectResolver {
    probe: Arc<dyn RedirectProbe>,
    navigator: Arc<dyn Navigate>,
    policy: RetryPolicy,
}

impl RedirectResolver {
    pub fn new(
        probe: Arc<dyn RedirectProbe>,
        navigator: Arc<dyn Navigate>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            probe,
            navigator,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Advance `url` by one transition.
    pub async fn step(&self, url: &str, state: ResolutionState) -> ResolutionState {
        match state {
            ResolutionState::Probing { attempt } => {
                after_probe(url, attempt, self.probe.probe(url).await)
            }
            ResolutionState::NavigationPending { attempt } => {
                after_navigation(url, attempt, self.navigator.navigate(url).await, &self.policy)
            }
            ResolutionState::Retrying { attempt, delay } => {
                tokio::time::sleep(delay).await;
                ResolutionState::Probing {
                    attempt: attempt + 1,
                }
            }
            terminal => terminal,
        }
    }
}

#[async_trait]
impl Resolve for RedirectResolver {
    async fn resolve(&self, url: &str) -> ResolutionOutcome {
        let mut state = ResolutionState::Probing { attempt: 1 };
        while !state.is_terminal() {
            state = self.step(url, state).await;
        }

        match state {
            ResolutionState::Resolved(final_url) => ResolutionOutcome::resolved(url, final_url),
            _ => ResolutionOutcome::unresolved(url),
        }
    }
}
