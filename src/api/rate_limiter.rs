use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;

use super::client::RateLimitConfig;
use super::error::ApiError;

/// Request-weight limiter using the token bucket algorithm.
///
/// Only paces outgoing requests. A rejected request is never retried here.
pub struct RateLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RateLimiter {
    /// Create a new rate limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        let per_second = NonZeroU32::new(config.weight_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_second);

        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            limiter: GovernorRateLimiter::direct(quota),
        }
    }

    /// Wait until `weight` units are available
    pub async fn acquire(&self, weight: u32) -> Result<(), ApiError> {
        let Some(n) = NonZeroU32::new(weight) else {
            return Ok(());
        };

        self.limiter.until_n_ready(n).await.map_err(|_| {
            ApiError::RateLimitError(format!(
                "request weight {} exceeds the configured burst size",
                weight
            ))
        })
    }

    /// Try to take `weight` units without waiting
    #[cfg(test)]
    fn try_acquire(&self, weight: u32) -> bool {
        match NonZeroU32::new(weight) {
            Some(n) => matches!(self.limiter.check_n(n), Ok(Ok(()))),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_allows_burst() {
        let limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 10,
            burst_size: 20,
        });

        assert!(limiter.try_acquire(10));
        assert!(limiter.try_acquire(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_blocks_after_burst() {
        let limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 10,
            burst_size: 10,
        });

        assert!(limiter.try_acquire(10));
        assert!(!limiter.try_acquire(1));
    }

    #[tokio::test]
    async fn test_weight_above_burst_is_rejected() {
        let limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 5,
            burst_size: 5,
        });

        let result = limiter.acquire(6).await;
        assert!(matches!(result, Err(ApiError::RateLimitError(_))));
    }

    #[tokio::test]
    async fn test_rate_limiter_acquire_waits() {
        let limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 10,
            burst_size: 1,
        });

        limiter.acquire(1).await.unwrap();

        let start = std::time::Instant::now();
        limiter.acquire(1).await.unwrap();

        // One unit refills every 100ms
        assert!(start.elapsed().as_millis() > 50);
    }

    #[tokio::test]
    async fn test_zero_weight_is_free() {
        let limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 1,
            burst_size: 1,
        });

        assert!(limiter.try_acquire(1));
        assert!(limiter.try_acquire(0));
        limiter.acquire(0).await.unwrap();
    }
}
