//! # Self-flat-fielding (SFF) centroid detrending
//!
//! Remove pointing-induced systematics from a stellar light curve by modelling
//! flux as a function of the star's position along its drift path.
//!
//! ## Pipeline
//! -----------------
//! ```text
//! TimeSeries ──► chunker ──► per chunk:
//!                              motion_axis ──► trajectory ──► arc_length ──► flux_model
//!                          ──► ordered concatenation ──► CorrectedLightCurve
//! ```
//!
//! * [`chunker`] – fixed-size chunk boundaries, undersized tail merged.
//! * [`motion_axis`] – principal axis of the centroid cloud, rotation matrix.
//! * [`trajectory`] – rotated frame and polynomial drift path.
//! * [`arc_length`] – signed arc length of every sample along the path.
//! * [`flux_model`] – polynomial flux(arc length) model and division.
//! * [`pipeline`] – chunk orchestration and stitching.
//!
//! Chunks share no state; with the `parallel` feature they run on the `rayon`
//! pool and are reassembled by chunk index.
//!
//! ## Configuration
//! -----------------
//! All tunables live in [`SffParams`], built through [`SffParams::builder`].
use std::cmp::Ordering::Greater;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        CENTROID_BIAS, DEFAULT_CHUNKSIZE, DEFAULT_POLY_DEGREE, MIN_TAIL_DIVISOR, QUAD_EPSABS,
        QUAD_LIMIT,
    },
    sff_errors::SffError,
};

pub mod arc_length;
pub mod chunker;
pub mod flux_model;
pub mod motion_axis;
pub mod pipeline;
pub mod trajectory;

/// Parameters of the SFF detrending pass.
///
/// Defaults
/// -----------------
/// * `chunksize`: 200 samples
/// * `poly_degree`: 5
/// * `centroid_bias`: 1.5 px
/// * `min_tail_divisor`: 2.5
/// * `quad_epsabs`: 1e-5
/// * `quad_limit`: 50 subintervals
/// * `parallel`: false
///
/// See also
/// -----------------
/// * [`pipeline::detrend_with_params`] – consumes these parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SffParams {
    /// Nominal number of samples per chunk.
    pub chunksize: usize,
    /// Degree of the trajectory and flux polynomials.
    pub poly_degree: usize,
    /// Offset added to median-centered centroids before the axis estimate.
    pub centroid_bias: f64,
    /// Trailing chunks shorter than `chunksize / min_tail_divisor` are merged.
    pub min_tail_divisor: f64,
    /// Absolute tolerance of each arc-length integral.
    pub quad_epsabs: f64,
    /// Subinterval budget of each arc-length integral.
    pub quad_limit: usize,
    /// Process chunks on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl SffParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent builder starting from the defaults.
    ///
    /// ```rust
    /// use k2sff::detrend::SffParams;
    ///
    /// let params = SffParams::builder()
    ///     .chunksize(300)
    ///     .poly_degree(3)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.chunksize, 300);
    /// ```
    pub fn builder() -> SffParamsBuilder {
        SffParamsBuilder::new()
    }

    /// Minimum length a trailing chunk needs to stay on its own.
    pub fn min_chunk_len(&self) -> f64 {
        self.chunksize as f64 / self.min_tail_divisor
    }
}

impl Default for SffParams {
    fn default() -> Self {
        SffParams {
            chunksize: DEFAULT_CHUNKSIZE,
            poly_degree: DEFAULT_POLY_DEGREE,
            centroid_bias: CENTROID_BIAS,
            min_tail_divisor: MIN_TAIL_DIVISOR,
            quad_epsabs: QUAD_EPSABS,
            quad_limit: QUAD_LIMIT,
            parallel: false,
        }
    }
}

/// Builder for [`SffParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct SffParamsBuilder {
    params: SffParams,
}

impl SffParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SffParams::default(),
        }
    }

    pub fn chunksize(mut self, v: usize) -> Self {
        self.params.chunksize = v;
        self
    }
    pub fn poly_degree(mut self, v: usize) -> Self {
        self.params.poly_degree = v;
        self
    }
    pub fn centroid_bias(mut self, v: f64) -> Self {
        self.params.centroid_bias = v;
        self
    }
    pub fn min_tail_divisor(mut self, v: f64) -> Self {
        self.params.min_tail_divisor = v;
        self
    }
    pub fn quad_epsabs(mut self, v: f64) -> Self {
        self.params.quad_epsabs = v;
        self
    }
    pub fn quad_limit(mut self, v: usize) -> Self {
        self.params.quad_limit = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.params.parallel = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `chunksize >= 1`
    /// * `poly_degree >= 1`
    /// * `centroid_bias` finite
    /// * `min_tail_divisor > 0`, finite
    /// * `quad_epsabs > 0`
    /// * `quad_limit >= 1`
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SffParams)` or [`SffError::InvalidConfiguration`] naming the first broken rule.
    pub fn build(self) -> Result<SffParams, SffError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl SffParams {
    pub(crate) fn validate(&self) -> Result<(), SffError> {
        if self.chunksize == 0 {
            return Err(SffError::InvalidConfiguration(
                "chunksize must be >= 1".into(),
            ));
        }
        if self.poly_degree == 0 {
            return Err(SffError::InvalidConfiguration(
                "poly_degree must be >= 1".into(),
            ));
        }
        if !self.centroid_bias.is_finite() {
            return Err(SffError::InvalidConfiguration(
                "centroid_bias must be finite".into(),
            ));
        }
        if !SffParamsBuilder::gt0(self.min_tail_divisor) || self.min_tail_divisor.is_infinite() {
            return Err(SffError::InvalidConfiguration(
                "min_tail_divisor must be > 0".into(),
            ));
        }
        if !SffParamsBuilder::gt0(self.quad_epsabs) {
            return Err(SffError::InvalidConfiguration(
                "quad_epsabs must be > 0".into(),
            ));
        }
        if self.quad_limit == 0 {
            return Err(SffError::InvalidConfiguration(
                "quad_limit must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SffParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 36;
            writeln!(f, "SFF Detrending Parameters")?;
            writeln!(f, "-------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Chunking]")?;
            line!("chunksize        = {}", self.chunksize, "Samples per chunk")?;
            line!(
                "min_tail_divisor = {:.2}",
                self.min_tail_divisor,
                "Tail shorter than chunksize/divisor is merged"
            )?;

            writeln!(f, "\n[Models]")?;
            line!(
                "poly_degree      = {}",
                self.poly_degree,
                "Trajectory and flux polynomial degree"
            )?;
            line!(
                "centroid_bias    = {:.3} px",
                self.centroid_bias,
                "Offset added to centered centroids"
            )?;

            writeln!(f, "\n[Quadrature]")?;
            line!(
                "quad_epsabs      = {:.1e}",
                self.quad_epsabs,
                "Absolute tolerance per arc-length integral"
            )?;
            line!(
                "quad_limit       = {}",
                self.quad_limit,
                "Subinterval budget per integral"
            )?;

            writeln!(f, "\n[Execution]")?;
            line!("parallel         = {}", self.parallel, "Chunks on the rayon pool")?;
            Ok(())
        } else {
            write!(
                f,
                "SffParams(chunksize={}, poly_degree={}, centroid_bias={:.2}, min_tail_divisor={:.2}, quad_epsabs={:.1e}, quad_limit={}, parallel={})",
                self.chunksize,
                self.poly_degree,
                self.centroid_bias,
                self.min_tail_divisor,
                self.quad_epsabs,
                self.quad_limit,
                self.parallel,
            )
        }
    }
}
