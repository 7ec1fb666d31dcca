//! Per-model call spacing.

use crate::ThrottleConfig;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, trace};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Waits until a call to a model may be initiated.
///
/// Implementations enforce a minimum gap between successive initiations
/// against the same model id. The slot is claimed before `throttle`
/// returns, so the gap bounds request starts, not completions.
#[async_trait]
pub trait Throttle: Send + Sync {
    /// Block until a call to `model_id` may start.
    async fn throttle(&self, model_id: &str);

    /// Configured gap for `model_id`.
    fn delay_for(&self, model_id: &str) -> Duration;
}

/// One GCRA limiter per model id, each with burst 1 and a period equal to the
/// model's tier delay.
///
/// Concurrent callers on the same id serialise through the limiter; distinct
/// ids never wait on each other. Cheap to clone.
///
/// # Example
///
/// ```
/// use dramaturg_rate_limit::{ModelThrottle, Throttle, ThrottleConfig};
/// use std::time::Duration;
///
/// let throttle = ModelThrottle::new(ThrottleConfig::default());
/// assert_eq!(throttle.delay_for("gemini-2.5-pro"), Duration::from_secs(15));
/// assert_eq!(throttle.delay_for("unlisted-model"), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ModelThrottle {
    config: ThrottleConfig,
    limiters: Arc<Mutex<HashMap<String, Arc<DirectRateLimiter>>>>,
}

impl ModelThrottle {
    /// Create a throttle from tier settings.
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            limiters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Tier settings in use.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Get or create the limiter for a model id.
    ///
    /// Returns `None` when the configured delay is zero.
    fn limiter_for(&self, model_id: &str) -> Option<Arc<DirectRateLimiter>> {
        let quota = Quota::with_period(self.delay_for(model_id))?;

        let mut limiters = self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let limiter = limiters
            .entry(model_id.to_string())
            .or_insert_with(|| {
                debug!(model = model_id, period = ?quota.replenish_interval(), "Creating model limiter");
                Arc::new(GovernorRateLimiter::direct(quota))
            })
            .clone();

        Some(limiter)
    }
}

#[async_trait]
impl Throttle for ModelThrottle {
    async fn throttle(&self, model_id: &str) {
        let Some(limiter) = self.limiter_for(model_id) else {
            return;
        };

        let started = std::time::Instant::now();
        limiter.until_ready().await;
        trace!(
            model = model_id,
            waited_ms = started.elapsed().as_millis() as u64,
            "Throttle released"
        );
    }

    fn delay_for(&self, model_id: &str) -> Duration {
        self.config.delay_for(model_id)
    }
}

/// Throttle that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopThrottle;

#[async_trait]
impl Throttle for NoopThrottle {
    async fn throttle(&self, _model_id: &str) {}

    fn delay_for(&self, _model_id: &str) -> Duration {
        Duration::ZERO
    }
}
