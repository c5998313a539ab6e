use super::*;
use crate::candidate::{ConditionTier, PriceCandidate, SourceId};
use crate::error::AnalyzeError;
use std::sync::atomic::{AtomicUsize, Ordering};

fn candidate(amount: f64) -> PriceCandidate {
    PriceCandidate {
        amount,
        source: SourceId::Ebay,
        tier: ConditionTier::Ungraded,
        matched_text: "test listing".to_string(),
    }
}

fn variants(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("variant {i}")).collect()
}

#[tokio::test]
async fn stops_at_first_non_empty_result() {
    let attempts = AtomicUsize::new(0);
    let result = run_fallback("test", &variants(3), &FallbackPolicy::immediate(), |_| {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 1 {
                Ok(vec![candidate(10.0)])
            } else {
                Ok(Vec::new())
            }
        }
    })
    .await;

    assert_eq!(result.len(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn errors_degrade_to_retry() {
    let attempts = AtomicUsize::new(0);
    let result = run_fallback("test", &variants(3), &FallbackPolicy::immediate(), |_| {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Err(AnalyzeError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY))
            } else {
                Ok(vec![candidate(5.0)])
            }
        }
    })
    .await;

    assert_eq!(result.len(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exhaustion_returns_empty_not_error() {
    let result = run_fallback("test", &variants(3), &FallbackPolicy::immediate(), |_| async {
        Ok(Vec::new())
    })
    .await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn attempts_are_capped() {
    let attempts = AtomicUsize::new(0);
    let result = run_fallback("test", &variants(10), &FallbackPolicy::immediate(), |_| {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Ok(Vec::new()) }
    })
    .await;

    assert!(result.is_empty());
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn variants_are_tried_in_order() {
    let seen = std::sync::Mutex::new(Vec::new());
    run_fallback("test", &variants(3), &FallbackPolicy::immediate(), |v| {
        seen.lock().unwrap().push(v);
        async { Ok(Vec::new()) }
    })
    .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["variant 0", "variant 1", "variant 2"]
    );
}
