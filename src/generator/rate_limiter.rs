// Minimum-interval rate limiter for the generative API.
//
// The free tier of the generative API allows roughly 15 requests per
// minute. Each acquire() waits until at least `interval` has passed since
// the previous request was let through.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Allow at most `requests` requests per minute.
    pub fn per_minute(requests: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(60.0 / requests.max(1) as f64))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                last_request: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return.
    pub async fn acquire(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_request {
            let elapsed = last.elapsed();
            if elapsed < inner.interval {
                // Lock is held across the sleep: queued callers go one interval apart.
                tokio::time::sleep(inner.interval - elapsed).await;
            }
        }

        inner.last_request = Some(Instant::now());
    }
}
