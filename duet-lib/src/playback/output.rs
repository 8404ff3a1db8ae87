//! Real-time block renderer bound to one output device.

use std::sync::Arc;

use crate::audio::buffer::SampleBuffer;
use crate::audio::cursor::FrameCursor;
use crate::audio::CHANNELS;

use super::gain::GainStage;

/// Result of rendering one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// More blocks are expected.
    Continue,
    /// The buffer is exhausted; the stream should stop requesting blocks.
    Complete,
}

/// Supplies sample blocks for one hardware stream.
///
/// Rendering never allocates, never locks and never panics: any
/// inconsistency between the cursor and the buffer degrades to silence and
/// [`StreamOutcome::Complete`].
#[derive(Debug, Clone)]
pub struct OutputCallback {
    buffer: SampleBuffer,
    cursor: FrameCursor,
    gain: Arc<GainStage>,
}

impl OutputCallback {
    pub fn new(buffer: SampleBuffer, cursor: FrameCursor, gain: Arc<GainStage>) -> Self {
        Self {
            buffer,
            cursor,
            gain,
        }
    }

    #[cfg(test)]
    fn cursor(&self) -> &FrameCursor {
        &self.cursor
    }

    /// Fill `out` (interleaved stereo) with the next block.
    ///
    /// # Arguments
    ///
    /// * `out` - Device block; its length is `frames * 2`.
    ///
    /// # Returns
    ///
    /// [`StreamOutcome::Complete`] when the block reached or started past the
    /// end of the buffer, [`StreamOutcome::Continue`] otherwise.
    pub fn render(&mut self, out: &mut [f32]) -> StreamOutcome {
        let frames = out.len() / CHANNELS;
        let total = self.buffer.frames();
        let start = self.cursor.frame();

        if start >= total {
            out.fill(0.0);
            return StreamOutcome::Complete;
        }

        let take = frames.min(total - start);
        let source = match self
            .buffer
            .samples()
            .get(start * CHANNELS..(start + take) * CHANNELS)
        {
            Some(source) => source,
            None => {
                out.fill(0.0);
                self.cursor.set(total);
                return StreamOutcome::Complete;
            }
        };

        let gain = self.gain.output_gain();
        let (head, tail) = out.split_at_mut(source.len());
        for (dst, &sample) in head.iter_mut().zip(source) {
            *dst = sample * gain;
        }
        tail.fill(0.0);
        self.cursor.set(start + take);

        if take < frames {
            StreamOutcome::Complete
        } else {
            StreamOutcome::Continue
        }
    }
}
