//! Cache invalidation utilities shared by nodes and ways.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Anything that caches derived render state should implement this.
pub trait InvalidateCache {
    /// Drop cached state so the next consumer recomputes it.
    fn invalidate_cache(&self);
}

impl<T: InvalidateCache + ?Sized> InvalidateCache for std::sync::Arc<T> {
    #[inline]
    fn invalidate_cache(&self) {
        (**self).invalidate_cache();
    }
}

/// Style cache slot owned by the rendering layer.
///
/// The graph core never computes styles; it only clears the slot. A renderer
/// calls [`StyleCache::mark_cached`] once it has stored a style for the
/// entity and checks [`StyleCache::is_cached`] before reusing it.
#[derive(Debug, Default)]
pub struct StyleCache {
    cached: AtomicBool,
    invalidations: AtomicU64,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_cached(&self) {
        self.cached.store(true, Ordering::Release);
    }

    pub fn is_cached(&self) -> bool {
        self.cached.load(Ordering::Acquire)
    }

    /// Number of times the slot has been cleared.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Acquire)
    }
}

impl InvalidateCache for StyleCache {
    #[inline]
    fn invalidate_cache(&self) {
        self.cached.store(false, Ordering::Release);
        self.invalidations.fetch_add(1, Ordering::AcqRel);
    }
}
