use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::config::UpstreamConfig;
use crate::error::CallError;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide admission gate for outbound upstream calls.
///
/// One gate instance (clones share the underlying limiter) fronts every call
/// site and call type. Admission is non-blocking: when the quota is exhausted
/// the call fails immediately with [`CallError::RateLimited`] and the wrapped
/// operation is never started.
#[derive(Clone)]
pub struct UpstreamGate {
    limiter: Arc<DirectRateLimiter>,
}

impl UpstreamGate {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let quota = quota_from_window(quota_window, quota_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.quota_window, config.quota_limit)
    }

    /// Consumes one admission slot, or fails fast when capacity is exhausted.
    pub fn try_admit(&self) -> Result<(), CallError> {
        self.limiter.check().map_err(|_| CallError::RateLimited)
    }

    /// Runs `call` under the gate. On rejection the future is dropped
    /// unpolled; on admission its outcome is returned unchanged.
    pub async fn admit<F, T>(&self, call: F) -> Result<T, CallError>
    where
        F: Future<Output = Result<T, CallError>>,
    {
        self.try_admit()?;
        call.await
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}
