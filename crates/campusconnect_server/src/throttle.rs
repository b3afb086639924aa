//! Per-client upload throttling.
//!
//! Uploads are limited with a keyed GCRA limiter from governor, one cell
//! per client key. The throttle is injected into the router state, so tests
//! and alternative deployments can swap it out.

use crate::ThrottleSettings;
use campusconnect_error::{StorageError, StorageErrorKind};
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type KeyedRateLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Checks between sweeps of fully replenished keys.
const DEFAULT_PRUNE_INTERVAL: u64 = 1024;

/// Gate consulted before every upload.
pub trait UploadThrottle: Send + Sync {
    /// Admit or reject one upload for `key`.
    ///
    /// # Errors
    ///
    /// [`StorageErrorKind::Throttled`] when the key is over its quota.
    fn check(&self, key: &str) -> Result<(), StorageError>;
}

/// Throttle that admits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

impl UploadThrottle for Unthrottled {
    fn check(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Per-minute quota with burst, keyed by client.
///
/// Every `prune_interval` checks, keys whose quota has fully replenished are
/// dropped, so the key map tracks only recently active clients.
#[derive(Clone)]
pub struct GovernorThrottle {
    limiter: Arc<KeyedRateLimiter>,
    quota: Quota,
    checks: Arc<AtomicU64>,
    prune_interval: u64,
}

impl std::fmt::Debug for GovernorThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorThrottle")
            .field("quota", &self.quota)
            .field("tracked_keys", &self.limiter.len())
            .field("prune_interval", &self.prune_interval)
            .finish()
    }
}

impl GovernorThrottle {
    /// Create a throttle allowing `per_minute` uploads with `burst` back to back.
    pub fn new(per_minute: NonZeroU32, burst: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(per_minute).allow_burst(burst))
    }

    /// Create a throttle from an arbitrary governor quota.
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(GovernorRateLimiter::keyed(quota)),
            quota,
            checks: Arc::new(AtomicU64::new(0)),
            prune_interval: DEFAULT_PRUNE_INTERVAL,
        }
    }

    /// Sweep stale keys every `interval` checks (minimum 1).
    pub fn with_prune_interval(mut self, interval: u64) -> Self {
        self.prune_interval = interval.max(1);
        self
    }

    /// Number of client keys currently holding limiter state.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Drop state for keys whose quota has fully replenished.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!(before, after = self.limiter.len(), "Pruned throttle keys");
    }
}

impl UploadThrottle for GovernorThrottle {
    fn check(&self, key: &str) -> Result<(), StorageError> {
        let outcome = self.limiter.check_key(&key.to_string());

        let seen = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % self.prune_interval == 0 {
            self.prune();
        }

        match outcome {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                tracing::warn!(client = key, retry_after_secs = wait.as_secs(), "Upload throttled");
                Err(StorageError::new(StorageErrorKind::Throttled(format!(
                    "Too many uploads, retry in {} seconds",
                    wait.as_secs().max(1)
                ))))
            }
        }
    }
}

/// Build the throttle described by configuration.
///
/// A zero `uploads_per_minute` disables throttling.
pub fn throttle_from_settings(settings: &ThrottleSettings) -> Arc<dyn UploadThrottle> {
    match NonZeroU32::new(settings.uploads_per_minute) {
        Some(per_minute) => {
            let burst = NonZeroU32::new(settings.burst).unwrap_or(per_minute);
            tracing::info!(
                uploads_per_minute = settings.uploads_per_minute,
                burst = burst.get(),
                "Upload throttle enabled"
            );
            Arc::new(GovernorThrottle::new(per_minute, burst))
        }
        None => {
            tracing::info!("Upload throttle disabled");
            Arc::new(Unthrottled)
        }
    }
}
