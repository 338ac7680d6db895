//! Shared state behind the admin API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::configurator::EffectiveConfig;

/// Current configuration plus its reload generation.
#[derive(Clone)]
pub struct AppState {
    current: Arc<ArcSwap<EffectiveConfig>>,
    generation: Arc<AtomicU64>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(initial: EffectiveConfig, api_key: Option<String>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(initial)),
            generation: Arc::new(AtomicU64::new(1)),
            api_key: api_key.map(Arc::from),
        }
    }

    /// Snapshot of the configuration in force.
    pub fn current(&self) -> Arc<EffectiveConfig> {
        self.current.load_full()
    }

    /// Publish a freshly applied configuration. Returns the new generation.
    pub fn replace(&self, next: EffectiveConfig) -> u64 {
        self.current.store(Arc::new(next));
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
