use redis::AsyncCommands;

use crate::errors::AppError;

/// Fixed-window request throttle backed by a shared Redis counter, so the
/// count holds across service instances and windows evict by TTL instead
/// of ad hoc cleanup.
pub struct Throttle {
    client: redis::Client,
    max_requests: u32,
    window_secs: u64,
}

impl Throttle {
    pub fn new(redis_url: &str, max_requests: u32, window_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
            max_requests,
            window_secs,
        })
    }

    /// Count one request against `key`'s current window. The first hit in
    /// a window stamps the TTL; the whole bucket expires on its own.
    pub async fn check(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        let bucket = format!("throttle:{key}");

        let count: u32 = conn
            .incr(&bucket, 1)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        if count == 1 {
            let _: bool = conn
                .expire(&bucket, self.window_secs as i64)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        }

        if count > self.max_requests {
            tracing::warn!(key = %key, count, "Request throttled");
            return Err(AppError::RateLimited);
        }

        Ok(())
    }
}
