//! Per-stream playback head.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared frame offset into a [`SampleBuffer`](super::buffer::SampleBuffer).
///
/// The controller creates a cursor at the start frame before a stream opens;
/// from then on the output callback is its only writer.
#[derive(Debug, Clone, Default)]
pub struct FrameCursor {
    frame: Arc<AtomicUsize>,
}

impl FrameCursor {
    /// Create a cursor positioned at `frame`.
    pub fn at(frame: usize) -> Self {
        Self {
            frame: Arc::new(AtomicUsize::new(frame)),
        }
    }

    /// Current frame offset.
    pub fn frame(&self) -> usize {
        self.frame.load(Ordering::Acquire)
    }

    /// Move the head to `frame`.
    pub fn set(&self, frame: usize) {
        self.frame.store(frame, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_head() {
        let cursor = FrameCursor::at(10);
        let other = cursor.clone();
        other.set(42);
        assert_eq!(cursor.frame(), 42);
    }
}
