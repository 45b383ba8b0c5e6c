//! Split a series into contiguous fixed-size chunks.
//!
//! Boundaries are derived up front from the series length alone: naive slicing
//! into `chunksize` pieces, then the last piece is folded into its predecessor
//! when it is shorter than `chunksize / min_tail_divisor`. A series that fits in
//! one chunk always yields exactly one chunk.
use std::ops::Range;

use crate::sff_errors::SffError;

/// Half-open index range `[start, end)` of one chunk in its parent series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl ChunkBounds {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Compute chunk boundaries for a series of `n_samples` samples.
///
/// Arguments
/// -----------------
/// * `n_samples`: series length.
/// * `chunksize`: nominal chunk length, must be at least 1.
/// * `min_tail_divisor`: a trailing chunk shorter than `chunksize / min_tail_divisor`
///   is merged into the previous one.
///
/// Return
/// ----------
/// * Ordered, gap-free boundaries covering `0..n_samples` (empty for `n_samples == 0`).
/// * [`SffError::InvalidConfiguration`] when `chunksize == 0` or the divisor is not positive.
pub fn chunk_bounds(
    n_samples: usize,
    chunksize: usize,
    min_tail_divisor: f64,
) -> Result<Vec<ChunkBounds>, SffError> {
    if chunksize == 0 {
        return Err(SffError::InvalidConfiguration(
            "chunksize must be >= 1".into(),
        ));
    }
    if !(min_tail_divisor.is_finite() && min_tail_divisor > 0.0) {
        return Err(SffError::InvalidConfiguration(
            "min_tail_divisor must be > 0".into(),
        ));
    }

    let mut bounds: Vec<ChunkBounds> = (0..n_samples)
        .step_by(chunksize)
        .enumerate()
        .map(|(index, start)| ChunkBounds {
            index,
            start,
            end: (start + chunksize).min(n_samples),
        })
        .collect();

    let min_len = chunksize as f64 / min_tail_divisor;
    if bounds.len() >= 2 && (bounds[bounds.len() - 1].len() as f64) < min_len {
        if let Some(tail) = bounds.pop() {
            log::warn!(
                "merging undersized tail chunk ({} samples, minimum {:.1}) into chunk {}",
                tail.len(),
                min_len,
                tail.index - 1
            );
            if let Some(last) = bounds.last_mut() {
                last.end = tail.end;
            }
        }
    }

    Ok(bounds)
}
