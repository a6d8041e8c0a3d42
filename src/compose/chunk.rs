use crate::{
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{SubcastError, SubcastResult},
};

/// Split `range` into at most `workers` contiguous, non-overlapping chunks.
///
/// Uses `min(workers, len)` chunks; the first `len % chunks` of them get one extra frame. Chunk
/// `i + 1` starts exactly where chunk `i` ends.
pub fn partition_frames(range: FrameRange, workers: usize) -> SubcastResult<Vec<FrameRange>> {
    if workers == 0 {
        return Err(SubcastError::validation("worker count must be >= 1"));
    }
    let total = range.len_frames();
    if total == 0 {
        return Err(SubcastError::validation("cannot partition an empty frame range"));
    }

    let chunks = (workers as u64).min(total);
    let base = total / chunks;
    let extra = total % chunks;
    let mut out = Vec::with_capacity(chunks as usize);
    let mut start = range.start.0;
    for i in 0..chunks {
        let len = base + u64::from(i < extra);
        let end = start + len;
        out.push(FrameRange::new(FrameIndex(start), FrameIndex(end))?);
        start = end;
    }
    Ok(out)
}

/// Resolve a worker count: `None` uses available parallelism.
pub fn worker_count(workers: Option<usize>) -> SubcastResult<usize> {
    match workers {
        Some(0) => Err(SubcastError::validation("workers must be >= 1 when set")),
        Some(n) => Ok(n),
        None => Ok(std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/chunk.rs"]
mod tests;
