use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded: {requests} requests in window, limit is {limit}")]
    LimitExceeded {
        requests: i64,
        limit: i64,
        retry_after_seconds: i64,
    },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_window: i64,
    pub window_size_seconds: i64,
    pub cleanup_interval_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 5,
            window_size_seconds: 60,
            cleanup_interval_seconds: 60,
        }
    }
}

/// Source of the current time in whole seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        current_timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: i64,
    count: i64,
}

/// Usage of one identifier after a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub used: i64,
    pub limit: i64,
    pub resets_in_seconds: i64,
}

/// Fixed-window request counter keyed by client identity.
///
/// A window opens on the first request of an identifier and lasts
/// `window_size_seconds`; the count resets when the next request arrives after
/// it closed. Each update holds the map entry's lock, so concurrent requests
/// for one identifier are counted exactly once each.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked", &self.windows.len())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self, RateLimitError> {
        if config.requests_per_window <= 0 {
            return Err(RateLimitError::Configuration(format!(
                "requests_per_window must be positive, got {}",
                config.requests_per_window
            )));
        }
        if config.window_size_seconds <= 0 {
            return Err(RateLimitError::Configuration(format!(
                "window_size_seconds must be positive, got {}",
                config.window_size_seconds
            )));
        }

        Ok(Self {
            windows: DashMap::new(),
            config,
            clock,
        })
    }

    pub fn check_and_increment(&self, identifier: &str) -> Result<RateLimitStatus, RateLimitError> {
        let now = self.clock.now();
        let window_size = self.config.window_size_seconds;

        let window = {
            let mut entry = self
                .windows
                .entry(identifier.to_string())
                .or_insert(Window { start: now, count: 0 });
            if now >= entry.start + window_size {
                *entry = Window { start: now, count: 0 };
            }
            entry.count += 1;
            *entry
        };

        debug!(
            "Rate limit check for '{}': {}/{} requests in current window",
            identifier, window.count, self.config.requests_per_window
        );

        let resets_in_seconds = (window.start + window_size - now).max(0);
        if window.count > self.config.requests_per_window {
            return Err(RateLimitError::LimitExceeded {
                requests: window.count,
                limit: self.config.requests_per_window,
                retry_after_seconds: resets_in_seconds,
            });
        }

        Ok(RateLimitStatus {
            used: window.count,
            limit: self.config.requests_per_window,
            resets_in_seconds,
        })
    }

    /// Drops every window that has closed. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let window_size = self.config.window_size_seconds;
        let before = self.windows.len();

        self.windows.retain(|_, window| now < window.start + window_size);

        let deleted = before.saturating_sub(self.windows.len());
        if deleted > 0 {
            debug!("Cleaned up {} expired rate limit windows", deleted);
        }
        deleted
    }

    #[cfg(test)]
    pub(crate) fn tracked_identifiers(&self) -> usize {
        self.windows.len()
    }

    pub fn requests_per_window(&self) -> i64 {
        self.config.requests_per_window
    }

    pub fn window_size_seconds(&self) -> i64 {
        self.config.window_size_seconds
    }
}

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
