//! # Aligned photometric time series
//!
//! A [`TimeSeries`] bundles the four index-aligned sequences produced by aperture
//! photometry: observation time, raw flux, and the two centroid coordinates.
//! Sample *i* of each sequence refers to the same observation.
//!
//! Construction validates that the four sequences share one length. Helpers
//! cover the preparation steps applied before detrending:
//!
//! * [`TimeSeries::concat`] – join consecutive observation segments (e.g. a
//!   campaign delivered as two files) into one series,
//! * [`TimeSeries::skip_leading`] – drop the low-quality samples recorded at the
//!   start of a campaign,
//! * [`TimeSeries::normalized_flux`] – divide flux by its median.
use crate::{
    constants::{Flux, Pixel, Time},
    sff_errors::{DetrendStage, SffError},
    stats::median,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    pub time: Vec<Time>,
    pub flux: Vec<Flux>,
    pub centroid_x: Vec<Pixel>,
    pub centroid_y: Vec<Pixel>,
}

impl TimeSeries {
    /// Build a series from four aligned sequences.
    ///
    /// Return
    /// ----------
    /// * [`SffError::LengthMismatch`] if the sequences differ in length.
    pub fn new(
        time: Vec<Time>,
        flux: Vec<Flux>,
        centroid_x: Vec<Pixel>,
        centroid_y: Vec<Pixel>,
    ) -> Result<Self, SffError> {
        check_aligned(&time, &flux, &centroid_x, &centroid_y)?;
        Ok(TimeSeries {
            time,
            flux,
            centroid_x,
            centroid_y,
        })
    }

    pub fn from_slices(
        time: &[Time],
        flux: &[Flux],
        centroid_x: &[Pixel],
        centroid_y: &[Pixel],
    ) -> Result<Self, SffError> {
        Self::new(
            time.to_vec(),
            flux.to_vec(),
            centroid_x.to_vec(),
            centroid_y.to_vec(),
        )
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Concatenate segments in the given order.
    ///
    /// Each segment must be internally aligned; an empty slice yields an empty series.
    pub fn concat(segments: &[TimeSeries]) -> Result<Self, SffError> {
        let total = segments.iter().map(TimeSeries::len).sum();
        let mut out = TimeSeries {
            time: Vec::with_capacity(total),
            flux: Vec::with_capacity(total),
            centroid_x: Vec::with_capacity(total),
            centroid_y: Vec::with_capacity(total),
        };
        for seg in segments {
            check_aligned(&seg.time, &seg.flux, &seg.centroid_x, &seg.centroid_y)?;
            out.time.extend_from_slice(&seg.time);
            out.flux.extend_from_slice(&seg.flux);
            out.centroid_x.extend_from_slice(&seg.centroid_x);
            out.centroid_y.extend_from_slice(&seg.centroid_y);
        }
        Ok(out)
    }

    /// Drop the first `n` samples (all of them if `n >= len`).
    pub fn skip_leading(&self, n: usize) -> TimeSeries {
        let n = n.min(self.len());
        TimeSeries {
            time: self.time[n..].to_vec(),
            flux: self.flux[n..].to_vec(),
            centroid_x: self.centroid_x[n..].to_vec(),
            centroid_y: self.centroid_y[n..].to_vec(),
        }
    }

    /// `true` when time never decreases from one sample to the next.
    pub fn is_time_ordered(&self) -> bool {
        self.time.windows(2).all(|w| w[0] <= w[1])
    }

    /// Flux divided by its own median.
    pub fn normalized_flux(&self) -> Result<Vec<Flux>, SffError> {
        normalize_by_median(&self.flux)
    }
}

fn check_aligned(
    time: &[Time],
    flux: &[Flux],
    centroid_x: &[Pixel],
    centroid_y: &[Pixel],
) -> Result<(), SffError> {
    let n = time.len();
    if flux.len() != n || centroid_x.len() != n || centroid_y.len() != n {
        return Err(SffError::LengthMismatch {
            time: n,
            flux: flux.len(),
            centroid_x: centroid_x.len(),
            centroid_y: centroid_y.len(),
        });
    }
    Ok(())
}

/// Divide every value by the median of the slice.
///
/// Return
/// ----------
/// * [`SffError::NumericDegeneracy`] (chunk `0`, stage `Normalize`) when the slice is
///   empty or its median is zero or not finite.
pub fn normalize_by_median(values: &[f64]) -> Result<Vec<f64>, SffError> {
    let med = median(values).ok_or_else(|| SffError::NumericDegeneracy {
        chunk: 0,
        stage: DetrendStage::Normalize,
        reason: "cannot normalize an empty flux sequence".into(),
    })?;
    if med == 0.0 || !med.is_finite() {
        return Err(SffError::NumericDegeneracy {
            chunk: 0,
            stage: DetrendStage::Normalize,
            reason: format!("flux median is {med}"),
        });
    }
    Ok(values.iter().map(|v| v / med).collect())
}
