//! Per-client request limiting
//!
//! Fixed windows keyed by client identity. The limiter and its clock are
//! injected into the application state so tests control time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Key used when the client address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    /// Over the limit until the current window ends
    Limited { retry_after: Duration },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitResult::Allowed => None,
            RateLimitResult::Limited { retry_after } => Some(*retry_after),
        }
    }
}

/// Admission control for incoming requests
pub trait RateLimiter: Send + Sync {
    /// Count a request from `key` and decide whether it may proceed.
    fn check(&self, key: &str) -> RateLimitResult;
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    /// 10 requests per hour
    fn default() -> Self {
        Self::new(10, 3600)
    }
}

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    resets_at: Instant,
}

/// In-memory fixed window limiter
pub struct FixedWindowLimiter<C: Clock = SystemClock> {
    config: RateLimitConfig,
    clock: C,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl FixedWindowLimiter<SystemClock> {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop windows that have already ended.
    pub fn cleanup(&self) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| now < entry.resets_at);
    }

    pub fn tracked_count(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<C: Clock> RateLimiter for FixedWindowLimiter<C> {
    fn check(&self, key: &str) -> RateLimitResult {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(key) {
            Some(entry) if now < entry.resets_at => {
                if entry.count >= self.config.limit {
                    return RateLimitResult::Limited {
                        retry_after: entry.resets_at - now,
                    };
                }
                entry.count += 1;
                RateLimitResult::Allowed
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        resets_at: now + self.config.window,
                    },
                );
                RateLimitResult::Allowed
            }
        }
    }
}

/// Client identity: the first `x-forwarded-for` entry.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
