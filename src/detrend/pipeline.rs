//! # Chunked SFF pipeline
//!
//! Run the per-chunk detrending stages over a whole [`TimeSeries`] and stitch
//! the results back together.
//!
//! ## Steps
//! -----------------
//! 1. Validate the series and the parameters.
//! 2. Divide the flux by its global median.
//! 3. Derive chunk boundaries ([`chunk_bounds`]).
//! 4. For every chunk, independently:
//!    * divide the chunk flux by its own median (applied on top of step 2),
//!    * center the centroids, estimate the [`MotionAxis`], rotate into a
//!      [`CentroidFrame`],
//!    * fit the [`TrajectoryModel`] and integrate the [`ArcLengthSeries`],
//!    * fit the [`FluxModel`] and divide the prediction out.
//! 5. Concatenate per-chunk results **in chunk order**.
//!
//! No smoothing is applied across chunk boundaries; small discontinuities there
//! are expected.
//!
//! ## Error Semantics
//! -----------------
//! The first failing chunk aborts the run. The error names the chunk index and
//! the stage (and the sample index for quadrature failures). Nothing is logged
//! on failure; the caller decides whether to skip the star or retry.
use log::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    constants::{ArcLength, Flux, Radian, Time},
    detrend::{
        arc_length::ArcLengthSeries,
        chunker::{chunk_bounds, ChunkBounds},
        flux_model::FluxModel,
        motion_axis::{centered_offsets, MotionAxis},
        trajectory::{CentroidFrame, TrajectoryModel},
        SffParams,
    },
    light_curve::CorrectedLightCurve,
    sff_errors::{DetrendStage, SffError},
    time_series::{normalize_by_median, TimeSeries},
};

/// Fitted quantities of one chunk, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    pub bounds: ChunkBounds,
    pub theta: Radian,
    /// Trajectory polynomial, highest degree first.
    pub trajectory_coeffs: Vec<f64>,
    /// Flux(arc length) polynomial, highest degree first.
    pub flux_coeffs: Vec<f64>,
}

/// Immutable result of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    pub report: ChunkReport,
    pub time: Vec<Time>,
    pub corrected_flux: Vec<Flux>,
    pub arc_length: Vec<ArcLength>,
}

/// Full output of a detrending run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetrendOutput {
    pub light_curve: CorrectedLightCurve,
    /// Arc length of every sample, concatenated in chunk order.
    pub arc_length: Vec<ArcLength>,
    pub chunks: Vec<ChunkReport>,
}

impl DetrendOutput {
    fn from_chunks(results: Vec<ChunkResult>) -> Self {
        results
            .into_iter()
            .fold(DetrendOutput::default(), |mut acc, chunk| {
                acc.light_curve.time.extend(chunk.time);
                acc.light_curve.flux.extend(chunk.corrected_flux);
                acc.arc_length.extend(chunk.arc_length);
                acc.chunks.push(chunk.report);
                acc
            })
    }
}

/// Detrend four aligned sequences with the given chunk size and polynomial degree.
///
/// All other parameters keep their defaults (see [`SffParams`]).
///
/// Return
/// ----------
/// * `(time, corrected_flux)`, one entry per input sample, in input order.
///
/// ```rust,no_run
/// let t: Vec<f64> = (0..600).map(|i| i as f64 * 0.02).collect();
/// # let (f, x, y) = (vec![1.0; 600], t.clone(), t.clone());
/// let (time, flux) = k2sff::detrend(&t, &f, &x, &y, 200, 5)?;
/// assert_eq!(time.len(), flux.len());
/// # Ok::<(), k2sff::SffError>(())
/// ```
pub fn detrend(
    time: &[Time],
    flux: &[Flux],
    centroid_x: &[f64],
    centroid_y: &[f64],
    chunksize: usize,
    poly_degree: usize,
) -> Result<(Vec<Time>, Vec<Flux>), SffError> {
    let params = SffParams::builder()
        .chunksize(chunksize)
        .poly_degree(poly_degree)
        .build()?;
    let series = TimeSeries::from_slices(time, flux, centroid_x, centroid_y)?;
    let out = detrend_with_params(&series, &params)?;
    Ok(out.light_curve.into_parts())
}

/// Concatenate raw observation segments, then detrend them as one series.
pub fn detrend_segments(
    segments: &[TimeSeries],
    params: &SffParams,
) -> Result<DetrendOutput, SffError> {
    let series = TimeSeries::concat(segments)?;
    detrend_with_params(&series, params)
}

/// Detrend a [`TimeSeries`].
///
/// Arguments
/// -----------------
/// * `series`: aligned time, flux and centroid sequences.
/// * `params`: validated detrending parameters.
///
/// Return
/// ----------
/// * A [`DetrendOutput`] with the corrected light curve, the arc-length series and
///   one [`ChunkReport`] per chunk.
/// * [`SffError::InvalidConfiguration`] for bad parameters or an empty series.
/// * The first chunk-level error otherwise.
pub fn detrend_with_params(
    series: &TimeSeries,
    params: &SffParams,
) -> Result<DetrendOutput, SffError> {
    params.validate()?;
    if series.is_empty() {
        return Err(SffError::InvalidConfiguration(
            "cannot detrend an empty series".into(),
        ));
    }
    let n = series.len();
    if series.flux.len() != n || series.centroid_x.len() != n || series.centroid_y.len() != n {
        return Err(SffError::LengthMismatch {
            time: n,
            flux: series.flux.len(),
            centroid_x: series.centroid_x.len(),
            centroid_y: series.centroid_y.len(),
        });
    }
    if !series.is_time_ordered() {
        warn!("time stamps are not monotonically non-decreasing");
    }

    let flux = normalize_by_median(&series.flux)?;
    let bounds = chunk_bounds(n, params.chunksize, params.min_tail_divisor)?;
    info!(
        "SFF detrending {} samples in {} chunk(s), chunksize={}, degree={}",
        n,
        bounds.len(),
        params.chunksize,
        params.poly_degree
    );

    let results = run_chunks(&bounds, series, &flux, params)?;
    Ok(DetrendOutput::from_chunks(results))
}

#[cfg(feature = "parallel")]
fn run_chunks(
    bounds: &[ChunkBounds],
    series: &TimeSeries,
    flux: &[Flux],
    params: &SffParams,
) -> Result<Vec<ChunkResult>, SffError> {
    if params.parallel {
        // indexed collect keeps chunk order
        bounds
            .par_iter()
            .map(|b| process_chunk(*b, series, flux, params))
            .collect()
    } else {
        bounds
            .iter()
            .map(|b| process_chunk(*b, series, flux, params))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_chunks(
    bounds: &[ChunkBounds],
    series: &TimeSeries,
    flux: &[Flux],
    params: &SffParams,
) -> Result<Vec<ChunkResult>, SffError> {
    bounds
        .iter()
        .map(|b| process_chunk(*b, series, flux, params))
        .collect()
}

/// Detrend one chunk.
///
/// `flux` is the globally normalized flux of the whole series; the chunk slice is
/// normalized again by its own median before fitting.
pub fn process_chunk(
    bounds: ChunkBounds,
    series: &TimeSeries,
    flux: &[Flux],
    params: &SffParams,
) -> Result<ChunkResult, SffError> {
    let idx = bounds.index;
    let range = bounds.range();
    let degree = params.poly_degree;

    if bounds.len() <= degree {
        return Err(SffError::InsufficientSamples {
            chunk: idx,
            stage: DetrendStage::Trajectory,
            samples: bounds.len(),
            degree,
        });
    }

    let chunk_flux = normalize_by_median(&flux[range.clone()]).map_err(|e| e.in_chunk(idx))?;

    let (x, y) = centered_offsets(
        &series.centroid_x[range.clone()],
        &series.centroid_y[range.clone()],
        params.centroid_bias,
    )
    .map_err(|e| e.in_chunk(idx))?;

    let axis = MotionAxis::estimate(&x, &y).map_err(|e| e.in_chunk(idx))?;
    let frame = CentroidFrame::from_axis(&x, &y, &axis).map_err(|e| e.in_chunk(idx))?;
    let trajectory = TrajectoryModel::fit(&frame, degree).map_err(|e| e.in_chunk(idx))?;

    let arc = ArcLengthSeries::compute(&trajectory, &frame.x, params.quad_epsabs, params.quad_limit)
        .map_err(|e| e.in_chunk(idx))?;

    let flux_model = FluxModel::fit(arc.values(), &chunk_flux, degree).map_err(|e| e.in_chunk(idx))?;
    let corrected_flux = flux_model
        .correct(arc.values(), &chunk_flux)
        .map_err(|e| e.in_chunk(idx))?;

    debug!(
        "chunk {} [{}..{}): theta={:.6} rad, trajectory={:?}, flux model={:?}",
        idx,
        bounds.start,
        bounds.end,
        axis.theta(),
        trajectory.path().coefficients(),
        flux_model.polynomial().coefficients()
    );

    Ok(ChunkResult {
        report: ChunkReport {
            bounds,
            theta: axis.theta(),
            trajectory_coeffs: trajectory.path().coefficients().to_vec(),
            flux_coeffs: flux_model.polynomial().coefficients().to_vec(),
        },
        time: series.time[range].to_vec(),
        corrected_flux,
        arc_length: arc.into_inner(),
    })
}

#[cfg(test)]
mod pipeline_test {
    use super::*;

    fn drifting_series(n: usize) -> TimeSeries {
        let time: Vec<f64> = (0..n).map(|i| 2000.0 + i as f64 * 0.0204).collect();
        let cx: Vec<f64> = (0..n)
            .map(|i| 512.0 + 0.3 * ((i % 50) as f64 / 50.0) + 0.002 * ((i * 31) % 7) as f64)
            .collect();
        let cy: Vec<f64> = cx
            .iter()
            .enumerate()
            .map(|(i, x)| 300.0 + 0.5 * (x - 512.0) + 0.003 * ((i * 17) % 5) as f64)
            .collect();
        let flux: Vec<f64> = cx
            .iter()
            .map(|x| 1.0e4 * (1.0 + 0.01 * (4.0 * (x - 512.0)).sin()))
            .collect();
        TimeSeries::new(time, flux, cx, cy).unwrap()
    }

    #[test]
    fn test_output_matches_input_order() {
        let series = drifting_series(450);
        let params = SffParams::builder().chunksize(200).poly_degree(3).build().unwrap();
        let out = detrend_with_params(&series, &params).unwrap();

        assert_eq!(out.light_curve.len(), 450);
        assert_eq!(out.light_curve.time, series.time);
        assert_eq!(out.arc_length.len(), 450);
        // 50-sample tail is below 80 and merged
        assert_eq!(out.chunks.len(), 2);
        assert_eq!(out.chunks[1].bounds.end, 450);
        assert!(out.light_curve.flux.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_chunk_errors_carry_index() {
        let mut series = drifting_series(400);
        for y in &mut series.centroid_y[200..] {
            *y = 7.0;
        }
        let params = SffParams::builder().chunksize(200).poly_degree(3).build().unwrap();
        let err = detrend_with_params(&series, &params).unwrap_err();
        assert!(matches!(
            err,
            SffError::NumericDegeneracy {
                chunk: 1,
                stage: DetrendStage::MotionAxis,
                ..
            }
        ));
    }

    #[test]
    fn test_short_chunk_is_insufficient() {
        let series = drifting_series(5);
        let err = detrend(
            &series.time,
            &series.flux,
            &series.centroid_x,
            &series.centroid_y,
            200,
            5,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SffError::InsufficientSamples {
                chunk: 0,
                stage: DetrendStage::Trajectory,
                samples: 5,
                degree: 5,
            }
        );
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = detrend(&[], &[], &[], &[], 200, 5).unwrap_err();
        assert!(matches!(err, SffError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_chunksize_is_rejected() {
        let series = drifting_series(50);
        let err = detrend(
            &series.time,
            &series.flux,
            &series.centroid_x,
            &series.centroid_y,
            0,
            5,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SffError::InvalidConfiguration("chunksize must be >= 1".into())
        );
    }

    #[test]
    fn test_segments_equal_concatenated_series() {
        let whole = drifting_series(400);
        let first = TimeSeries::from_slices(
            &whole.time[..150],
            &whole.flux[..150],
            &whole.centroid_x[..150],
            &whole.centroid_y[..150],
        )
        .unwrap();
        let second = TimeSeries::from_slices(
            &whole.time[150..],
            &whole.flux[150..],
            &whole.centroid_x[150..],
            &whole.centroid_y[150..],
        )
        .unwrap();

        let params = SffParams::builder().poly_degree(3).build().unwrap();
        let a = detrend_with_params(&whole, &params).unwrap();
        let b = detrend_segments(&[first, second], &params).unwrap();
        assert_eq!(a, b);
    }
}
