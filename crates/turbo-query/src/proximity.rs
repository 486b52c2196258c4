//! Near-end-of-content signals.
//!
//! A [`ProximitySignal`] stands in for an intersection observer: consumers
//! register handlers with [`ProximitySignal::on_near_end`], and every
//! [`observe`](ProximitySignal::observe) of a viewport within the threshold
//! of the end of content invokes them. Handlers live exactly as long as the
//! returned [`Subscription`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};

/// Distance from the end of content at which handlers fire.
pub const DEFAULT_THRESHOLD: f64 = 200.0;

/// Scroll geometry of a consumer's view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Height of all rendered content.
    pub content_height: f64,
    /// Height of the visible area.
    pub viewport_height: f64,
    /// Distance scrolled from the top.
    pub scroll_offset: f64,
}

impl Viewport {
    /// Create a viewport at the top of empty content.
    pub fn new(viewport_height: f64) -> Self {
        Self {
            content_height: 0.0,
            viewport_height,
            scroll_offset: 0.0,
        }
    }

    /// Set the rendered content height.
    pub fn with_content_height(mut self, content_height: f64) -> Self {
        self.content_height = content_height;
        self.clamp();
        self
    }

    /// Update the rendered content height in place.
    pub fn set_content_height(&mut self, content_height: f64) {
        self.content_height = content_height;
        self.clamp();
    }

    /// Scroll by `delta`, staying within the content.
    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_offset += delta;
        self.clamp();
    }

    /// Scroll to the bottom of the content.
    pub fn scroll_to_end(&mut self) {
        self.scroll_offset = self.max_offset();
    }

    /// Distance between the bottom of the visible area and the end of content.
    pub fn distance_to_end(&self) -> f64 {
        (self.content_height - (self.scroll_offset + self.viewport_height)).max(0.0)
    }

    /// Whether the visible area is within `threshold` of the end of content.
    pub fn is_near_end(&self, threshold: f64) -> bool {
        self.scroll_offset + self.viewport_height + threshold >= self.content_height
    }

    fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    fn clamp(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_offset());
    }
}

type Handler = Arc<dyn Fn() + Send + Sync>;
type Registry = Mutex<BTreeMap<u64, Handler>>;

/// Source of "near end of content" events.
///
/// Clones share handlers.
#[derive(Clone)]
pub struct ProximitySignal {
    threshold: f64,
    handlers: Arc<Registry>,
    next_id: Arc<AtomicU64>,
}

impl ProximitySignal {
    /// Create a signal firing within `threshold` of the end of content.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            handlers: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Register a handler for near-end events.
    pub fn on_near_end<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.handlers).insert(id, Arc::new(handler));

        Subscription {
            id,
            registry: Some(Arc::downgrade(&self.handlers)),
        }
    }

    /// Report the viewport; fires handlers if it is near the end.
    ///
    /// Returns the number of handlers invoked.
    pub fn observe(&self, viewport: &Viewport) -> usize {
        if !viewport.is_near_end(self.threshold) {
            return 0;
        }

        // Handlers may subscribe or unsubscribe, so call them unlocked.
        let handlers: Vec<Handler> = lock(&self.handlers).values().cloned().collect();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.handlers).len()
    }
}

impl Default for ProximitySignal {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl std::fmt::Debug for ProximitySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximitySignal")
            .field("threshold", &self.threshold)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// A registered near-end handler.
///
/// The handler is removed by [`unsubscribe`](Self::unsubscribe) or on drop.
#[derive(Debug)]
#[must_use = "dropping a subscription removes its handler"]
pub struct Subscription {
    id: u64,
    registry: Option<Weak<Registry>>,
}

impl Subscription {
    /// Remove the handler now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        match self.registry.as_ref().and_then(Weak::upgrade) {
            Some(registry) => {
                let handlers = lock(&registry);
                handlers.contains_key(&self.id)
            }
            None => false,
        }
    }

    fn detach(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|w| w.upgrade()) {
            lock(&registry).remove(&self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, BTreeMap<u64, Handler>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
