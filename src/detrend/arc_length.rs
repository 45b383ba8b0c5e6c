//! Arc length along the fitted drift trajectory.
//!
//! Each sample's rotated X coordinate is mapped to the signed length of the
//! trajectory between `x = 0` and that coordinate:
//!
//! ```text
//! s(x_i) = ∫₀^{x_i} sqrt(1 + p'(u)²) du
//! ```
//!
//! Samples are integrated independently from the common origin, so a negative
//! `x_i` gives a negative arc length and the series is monotone in `x`.
use crate::{
    constants::{ArcLength, QUAD_EPSREL},
    detrend::trajectory::TrajectoryModel,
    quadrature::integrate,
    sff_errors::SffError,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArcLengthSeries {
    values: Vec<ArcLength>,
}

impl ArcLengthSeries {
    /// Integrate the trajectory speed from 0 to every `x` in `xs`.
    ///
    /// Arguments
    /// -----------------
    /// * `model`: fitted trajectory of the chunk.
    /// * `xs`: rotated X coordinates.
    /// * `epsabs`: absolute tolerance per integral.
    /// * `limit`: subinterval budget per integral.
    ///
    /// Return
    /// ----------
    /// * One arc length per sample.
    /// * [`SffError::IntegrationFailure`] naming the first sample whose integral did not
    ///   converge (chunk index `0`, rewritten by the caller).
    pub fn compute(
        model: &TrajectoryModel,
        xs: &[f64],
        epsabs: f64,
        limit: usize,
    ) -> Result<Self, SffError> {
        let values = xs
            .iter()
            .enumerate()
            .map(|(sample, &x)| {
                integrate(|u| model.speed(u), 0.0, x, epsabs, QUAD_EPSREL, limit)
                    .map(|r| r.value)
                    .map_err(|fail| SffError::IntegrationFailure {
                        chunk: 0,
                        sample,
                        upper: x,
                        error_estimate: fail.abs_error,
                        tolerance: fail.tolerance,
                    })
            })
            .collect::<Result<Vec<ArcLength>, SffError>>()?;

        Ok(ArcLengthSeries { values })
    }

    pub fn values(&self) -> &[ArcLength] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<ArcLength> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
