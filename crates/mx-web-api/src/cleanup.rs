use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tracing::{debug, info, warn};

use crate::rate_limiter::RateLimiter;

/// Periodically evicts closed rate-limit windows.
pub struct CleanupService {
    rate_limiter: Arc<RateLimiter>,
    cleanup_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl CleanupService {
    pub fn new(rate_limiter: Arc<RateLimiter>, cleanup_interval_seconds: u64) -> Self {
        Self {
            rate_limiter,
            cleanup_interval: Duration::from_secs(cleanup_interval_seconds.max(1)),
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Cleanup service is already running");
            return;
        }

        let rate_limiter = Arc::clone(&self.rate_limiter);
        let interval_duration = self.cleanup_interval;

        let handle = tokio::spawn(async move {
            info!(
                "Starting cleanup service with interval: {:?}",
                interval_duration
            );

            let mut cleanup_interval = interval(interval_duration);

            loop {
                cleanup_interval.tick().await;

                let deleted_count = rate_limiter.cleanup_expired();
                if deleted_count > 0 {
                    info!("Cleaned up {} expired rate limit windows", deleted_count);
                } else {
                    debug!("No expired rate limit windows to clean up");
                }
            }
        });

        self.handle = Some(handle);
        info!("Cleanup service started successfully");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cleanup service stopped");
        } else {
            debug!("Cleanup service is not running");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for CleanupService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::{ManualClock, RateLimitConfig};
    use tokio::time::{Duration, sleep};

    #[tokio::test]
    async fn test_cleanup_service_lifecycle() {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()).unwrap());
        let mut cleanup_service = CleanupService::new(rate_limiter, 1);

        assert!(!cleanup_service.is_running());

        cleanup_service.start();
        assert!(cleanup_service.is_running());

        // Starting again should warn but not create duplicate
        cleanup_service.start();
        assert!(cleanup_service.is_running());

        cleanup_service.stop();

        sleep(Duration::from_millis(10)).await;
        assert!(!cleanup_service.is_running());

        cleanup_service.stop();
        assert!(!cleanup_service.is_running());
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_windows() {
        let clock = Arc::new(ManualClock::new(1_000));
        let rate_limiter = Arc::new(
            RateLimiter::with_clock(RateLimitConfig::default(), clock.clone()).unwrap(),
        );

        rate_limiter.check_and_increment("expired_user").unwrap();
        clock.advance(120);
        assert_eq!(rate_limiter.tracked_identifiers(), 1);

        let mut cleanup_service = CleanupService::new(Arc::clone(&rate_limiter), 1);
        cleanup_service.start();

        // The first tick fires immediately
        sleep(Duration::from_millis(100)).await;

        assert_eq!(
            rate_limiter.tracked_identifiers(),
            0,
            "Expired windows should have been cleaned up"
        );

        cleanup_service.stop();
    }
}
