//! Sliding-window rate limiting
//!
//! [`RateLimiter`] is the seam handlers depend on; [`SlidingWindowLimiter`] is
//! the process-local implementation. Each client key keeps the instants of its
//! admitted requests; a request is admitted while fewer than `max_requests`
//! of them fall inside the trailing window.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests still available in the current window
    pub remaining: u32,
    /// Time until the oldest counted request leaves the window
    pub retry_after: Duration,
}

/// Rate limiter abstraction over backing stores
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check a request for `key`, recording it when admitted
    async fn check(&self, key: &str) -> Result<RateLimitDecision>;

    /// Drop state for keys with no request inside the window
    async fn sweep(&self) -> Result<usize> {
        Ok(0)
    }
}

/// In-memory sliding-window limiter
///
/// State lives in this instance only; separate processes do not share it.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    history: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check a request for `key` as of `now`
    pub fn check_at(&self, key: &str, now: Instant) -> Result<RateLimitDecision> {
        let window = self.config.window();
        let max = self.config.max_requests as usize;

        let mut history = self
            .history
            .lock()
            .map_err(|e| anyhow!("Failed to acquire rate limiter lock: {}", e))?;

        let hits = history.entry(key.to_string()).or_default();
        while hits
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= window)
        {
            hits.pop_front();
        }

        let allowed = hits.len() < max;
        if allowed {
            hits.push_back(now);
        }

        let retry_after = hits
            .front()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(Duration::ZERO);

        Ok(RateLimitDecision {
            allowed,
            remaining: max.saturating_sub(hits.len()) as u32,
            retry_after,
        })
    }

    /// Forget keys whose whole history is older than the window as of `now`
    pub fn sweep_at(&self, now: Instant) -> Result<usize> {
        let window = self.config.window();
        let mut history = self
            .history
            .lock()
            .map_err(|e| anyhow!("Failed to acquire rate limiter lock: {}", e))?;

        let before = history.len();
        history.retain(|_, hits| {
            hits.back()
                .is_some_and(|&t| now.saturating_duration_since(t) < window)
        });
        Ok(before - history.len())
    }

    /// Number of client keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision> {
        self.check_at(key, Instant::now())
    }

    async fn sweep(&self) -> Result<usize> {
        self.sweep_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(RateLimitConfig {
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn test_default_is_100_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_admits_up_to_ceiling_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at("10.0.0.1", now).unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check_at("10.0.0.1", now).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.retry_after, Duration::from_secs(60));
    }

    #[test]
    fn test_rejected_requests_are_not_counted() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(limiter.check_at("k", start).unwrap().allowed);
        for offset in 1..10 {
            let at = start + Duration::from_secs(offset);
            assert!(!limiter.check_at("k", at).unwrap().allowed);
        }
        assert!(
            limiter
                .check_at("k", start + Duration::from_secs(60))
                .unwrap()
                .allowed
        );
    }

    #[test]
    fn test_admits_again_after_window_elapses() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert!(limiter.check_at("k", start).unwrap().allowed);
        assert!(
            limiter
                .check_at("k", start + Duration::from_secs(30))
                .unwrap()
                .allowed
        );
        let blocked = limiter
            .check_at("k", start + Duration::from_secs(45))
            .unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.retry_after, Duration::from_secs(15));

        // The first hit slides out, the second is still counted
        let later = limiter
            .check_at("k", start + Duration::from_secs(61))
            .unwrap();
        assert!(later.allowed);
        assert_eq!(later.remaining, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("a", now).unwrap().allowed);
        assert!(!limiter.check_at("a", now).unwrap().allowed);
        assert!(limiter.check_at("b", now).unwrap().allowed);
    }

    #[test]
    fn test_sweep_drops_idle_keys() {
        let limiter = limiter(5, 60);
        let start = Instant::now();

        limiter.check_at("old", start).unwrap();
        limiter
            .check_at("fresh", start + Duration::from_secs(50))
            .unwrap();
        assert_eq!(limiter.tracked_keys(), 2);

        let removed = limiter.sweep_at(start + Duration::from_secs(70)).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn test_trait_check_records_hits() {
        let limiter = limiter(1, 60);
        assert!(limiter.check("client").await.unwrap().allowed);
        assert!(!limiter.check("client").await.unwrap().allowed);
    }
}
