use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{RateDecision, RateLimiter};
use crate::error::AppError;

struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }
}

/// Fixed-window counters keyed by caller-chosen strings (IP, IP + email, ...).
#[derive(Default)]
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Window>>, AppError> {
        self.windows.lock().map_err(|_| AppError::InternalWithMsg("Rate limiter lock poisoned".into()))
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> Result<RateDecision, AppError> {
        let now = Instant::now();
        let mut windows = self.lock()?;

        let entry = windows.entry(key.to_string()).or_insert(Window { started: now, length: window, count: 0 });
        if entry.is_expired(now) {
            *entry = Window { started: now, length: window, count: 0 };
        }

        let retry_after_secs = entry.length.saturating_sub(now.duration_since(entry.started)).as_secs();

        if entry.count >= max_attempts {
            return Ok(RateDecision { allowed: false, remaining: 0, retry_after_secs });
        }

        entry.count += 1;
        Ok(RateDecision {
            allowed: true,
            remaining: max_attempts - entry.count,
            retry_after_secs,
        })
    }

    async fn reset(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn prune(&self) -> Result<usize, AppError> {
        let now = Instant::now();
        let mut windows = self.lock()?;
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now));
        let removed = before - windows.len();
        debug!(removed, remaining = windows.len(), "Pruned rate limit windows");
        Ok(removed)
    }
}
