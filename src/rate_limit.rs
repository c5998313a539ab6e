//! Keyed daily rate limiting.
//!
//! An injected in-memory counter store: monotonic count plus reset
//! timestamp per caller key, 24h rolling window. Entries reset lazily
//! on read; `purge_expired` exists so a periodic task can keep the map
//! from growing with one-shot callers.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Outcome of a quota check, surfaced unchanged to the caller.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds when the window resets
    pub reset_at: i64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    reset_at: i64,
}

/// Thread-safe per-key request counter.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request against `key` and reports whether it is
    /// within the quota. Expired windows restart transparently.
    pub fn check(&self, key: &str, max_requests: u32) -> RateLimitDecision {
        self.check_at(key, max_requests, Utc::now().timestamp_millis())
    }

    fn check_at(&self, key: &str, max_requests: u32, now_ms: i64) -> RateLimitDecision {
        let mut entries = self.entries.lock().unwrap();

        let entry = entries.get(key).copied();
        match entry {
            Some(e) if now_ms <= e.reset_at => {
                if e.count >= max_requests {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: e.reset_at,
                    };
                }
                let count = e.count + 1;
                entries.insert(
                    key.to_string(),
                    Entry {
                        count,
                        reset_at: e.reset_at,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: max_requests - count,
                    reset_at: e.reset_at,
                }
            }
            _ => {
                // New caller, or the previous window expired
                let reset_at = now_ms + ONE_DAY_MS;
                entries.insert(key.to_string(), Entry { count: 1, reset_at });
                RateLimitDecision {
                    allowed: true,
                    remaining: max_requests.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Drops entries whose windows have passed.
    pub fn purge_expired(&self) {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, e| now_ms <= e.reset_at);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
