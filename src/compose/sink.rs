use std::collections::VecDeque;

use crate::{
    compose::element::FrameRgb,
    foundation::core::FrameIndex,
    foundation::error::{SubcastError, SubcastResult},
};

/// Supplies decoded source frames to a compositing worker, in order.
pub trait FrameSource: Send {
    /// Read the next frame into `frame`. Returns `false` at end of stream.
    fn read_frame(&mut self, frame: &mut FrameRgb) -> SubcastResult<bool>;
    /// Called once after the last frame was read.
    fn finish(&mut self) -> SubcastResult<()>;
}

/// Consumes composited frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> SubcastResult<()>;
    /// Called once after the last frame was pushed.
    fn finish(&mut self) -> SubcastResult<()>;
}

/// Frame source replaying a fixed list of frames.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: VecDeque<FrameRgb>,
    finished: bool,
}

impl InMemorySource {
    /// Replay `frames` in order, then report end of stream.
    pub fn new(frames: impl IntoIterator<Item = FrameRgb>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            finished: false,
        }
    }

    /// Frames not read yet.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Whether [`FrameSource::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSource for InMemorySource {
    fn read_frame(&mut self, frame: &mut FrameRgb) -> SubcastResult<bool> {
        let Some(next) = self.frames.pop_front() else {
            return Ok(false);
        };
        if next.width != frame.width || next.height != frame.height {
            return Err(SubcastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                next.width, next.height, frame.width, frame.height
            )));
        }
        *frame = next;
        Ok(true)
    }

    fn finish(&mut self) -> SubcastResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<(FrameIndex, FrameRgb)>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }

    /// Whether [`FrameSink::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> SubcastResult<()> {
        if self.finished {
            return Err(SubcastError::media("sink is already finished"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(SubcastError::validation(format!(
                "frame {} pushed after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> SubcastResult<()> {
        self.finished = true;
        Ok(())
    }
}
