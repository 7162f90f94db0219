//! Input intents and the queue the frame step drains.
//!
//! Event handlers (pointer, touch, keyboard, window, host API) never touch
//! viewer state directly. They push small [`ViewerIntent`] records here and the
//! next tick applies them in order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewerIntent {
    DragStart,
    DragMove { dx: f32, dy: f32 },
    DragEnd,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    ResetRotation,
    TogglePause,
    ToggleFullscreen,
    Resize { width: f32, height: f32 },
    Unmount,
}

/// Shared FIFO of intents. Cloning shares the same queue.
#[derive(Clone, Debug, Default)]
pub struct IntentQueue {
    inner: Arc<Mutex<VecDeque<ViewerIntent>>>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, intent: ViewerIntent) {
        self.inner.lock().push_back(intent);
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<ViewerIntent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn contains(&self, intent: ViewerIntent) -> bool {
        self.inner.lock().contains(&intent)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Values the viewer publishes for surrounding UI.
#[derive(Clone, Debug, Default)]
pub struct ViewerOutputs {
    live_count: Arc<AtomicUsize>,
    paused: Arc<AtomicBool>,
    loading: Arc<AtomicBool>,
}

impl ViewerOutputs {
    pub fn live_count(&self) -> usize {
        self.live_count.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    pub(crate) fn publish_live_count(&self, count: usize) {
        self.live_count.store(count, Ordering::Relaxed);
    }

    pub(crate) fn publish_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub(crate) fn publish_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::Relaxed);
    }
}

/// Host-side handle: the control surface plus the observable outputs.
#[derive(Clone, Debug, Default)]
pub struct ViewerHandle {
    pub intents: IntentQueue,
    pub outputs: ViewerOutputs,
}

impl ViewerHandle {
    pub fn toggle_pause(&self) {
        self.intents.push(ViewerIntent::TogglePause);
    }

    pub fn reset_rotation(&self) {
        self.intents.push(ViewerIntent::ResetRotation);
    }

    pub fn toggle_fullscreen(&self) {
        self.intents.push(ViewerIntent::ToggleFullscreen);
    }

    pub fn unmount(&self) {
        self.intents.push(ViewerIntent::Unmount);
    }

    pub fn live_count(&self) -> usize {
        self.outputs.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_queue() {
        let queue = IntentQueue::new();
        let producer = queue.clone();
        producer.push(ViewerIntent::DragStart);
        producer.push(ViewerIntent::DragMove { dx: 1.0, dy: 2.0 });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![ViewerIntent::DragStart, ViewerIntent::DragMove { dx: 1.0, dy: 2.0 }]
        );
        assert!(producer.is_empty());
    }

    #[test]
    fn handle_controls_enqueue_intents() {
        let handle = ViewerHandle::default();
        handle.toggle_pause();
        handle.reset_rotation();
        handle.toggle_fullscreen();
        assert_eq!(
            handle.intents.drain(),
            vec![
                ViewerIntent::TogglePause,
                ViewerIntent::ResetRotation,
                ViewerIntent::ToggleFullscreen
            ]
        );
    }
}
