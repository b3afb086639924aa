//! Shared router state.

use crate::UploadThrottle;
use campusconnect_storage::{MediaStore, UploadLimits};
use std::sync::Arc;

/// State handed to every handler.
#[derive(Clone, derive_getters::Getters)]
pub struct AppState {
    /// Tier-dispatching store
    store: MediaStore,
    /// Per-category bounds
    limits: Arc<UploadLimits>,
    /// Upload gate
    throttle: Arc<dyn UploadThrottle>,
    /// Whether `X-Forwarded-For` names the client
    trust_forwarded_for: bool,
}

impl AppState {
    /// Assemble router state.
    pub fn new(store: MediaStore, limits: UploadLimits, throttle: Arc<dyn UploadThrottle>) -> Self {
        Self {
            store,
            limits: Arc::new(limits),
            throttle,
            trust_forwarded_for: false,
        }
    }

    /// Key clients by `X-Forwarded-For` when `trust` is set.
    pub(crate) fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("limits", &self.limits)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish_non_exhaustive()
    }
}
