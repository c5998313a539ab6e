//! Fallback runner: drives a source through its ordered query variants.
//!
//! Each attempt either succeeds with a validated candidate set, or the
//! runner retries with the next variant after a fixed inter-attempt
//! delay (anti-bot courtesy). Exhausting the list is a normal business
//! outcome, reported as an explicit empty set, never as an error.

use std::future::Future;
use std::time::Duration;

use crate::candidate::PriceCandidate;
use crate::error::Result;

/// Per-source retry policy.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    /// Hard cap on attempted variants, bounding worst-case latency
    pub max_attempts: usize,
    /// Pause between attempts
    pub inter_attempt_delay: Duration,
}

impl FallbackPolicy {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            max_attempts: 4,
            inter_attempt_delay: Duration::from_millis(delay_ms),
        }
    }

    /// Zero-delay policy for tests.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            max_attempts: 4,
            inter_attempt_delay: Duration::ZERO,
        }
    }
}

/// Result of a single variant attempt.
enum AttemptOutcome {
    /// Non-empty validated candidate set; the chain stops here
    Success(Vec<PriceCandidate>),
    /// Empty set or recoverable failure; try the next variant
    Retry,
}

fn classify(source: &str, variant: &str, result: Result<Vec<PriceCandidate>>) -> AttemptOutcome {
    match result {
        Ok(candidates) if !candidates.is_empty() => {
            log::info!(
                "{}: \"{}\" yielded {} candidates",
                source,
                variant,
                candidates.len()
            );
            AttemptOutcome::Success(candidates)
        }
        Ok(_) => {
            log::info!("{}: \"{}\" yielded no usable candidates", source, variant);
            AttemptOutcome::Retry
        }
        Err(e) => {
            // Upstream-unavailable / parse-mismatch recover locally:
            // the attempt degrades to zero candidates.
            log::warn!("{}: \"{}\" failed: {}", source, variant, e);
            AttemptOutcome::Retry
        }
    }
}

/// Tries each variant in order until one yields a non-empty validated
/// candidate set. Returns an empty vec when all attempted variants are
/// exhausted.
pub async fn run_fallback<F, Fut>(
    source: &str,
    variants: &[String],
    policy: &FallbackPolicy,
    mut attempt: F,
) -> Vec<PriceCandidate>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<PriceCandidate>>>,
{
    for (i, variant) in variants.iter().take(policy.max_attempts).enumerate() {
        if i > 0 {
            tokio::time::sleep(policy.inter_attempt_delay).await;
        }
        match classify(source, variant, attempt(variant.clone()).await) {
            AttemptOutcome::Success(candidates) => return candidates,
            AttemptOutcome::Retry => continue,
        }
    }
    log::info!("{}: all variants exhausted without a result", source);
    Vec::new()
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
