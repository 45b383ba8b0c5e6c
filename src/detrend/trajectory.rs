//! Drift trajectory of a chunk in its rotated centroid frame.
//!
//! The centered centroids are rotated onto the principal motion axis, each
//! rotated coordinate is re-centered on its own median, and a least-squares
//! polynomial `y' = p(x')` describes the path the star traces on the detector.
use crate::{
    detrend::motion_axis::MotionAxis,
    polynomial::Polynomial,
    sff_errors::{DetrendStage, SffError},
    stats::median,
};

/// Rotated, median-centered centroid coordinates of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidFrame {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CentroidFrame {
    /// Rotate `(x, y)` with `axis` and re-center both outputs on their medians.
    pub fn from_axis(x: &[f64], y: &[f64], axis: &MotionAxis) -> Result<Self, SffError> {
        let (xr, yr) = axis.rotate(x, y);
        let mx = median(&xr).ok_or_else(empty_frame)?;
        let my = median(&yr).ok_or_else(empty_frame)?;
        Ok(CentroidFrame {
            x: xr.iter().map(|v| v - mx).collect(),
            y: yr.iter().map(|v| v - my).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn empty_frame() -> SffError {
    SffError::NumericDegeneracy {
        chunk: 0,
        stage: DetrendStage::Trajectory,
        reason: "empty centroid frame".into(),
    }
}

/// Polynomial drift path and its derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryModel {
    path: Polynomial,
    slope: Polynomial,
}

impl TrajectoryModel {
    /// Fit `y ≈ p(x)` of degree `degree` on the rotated frame.
    ///
    /// Return
    /// ----------
    /// * [`SffError::InsufficientSamples`] when the frame holds `<= degree` samples.
    pub fn fit(frame: &CentroidFrame, degree: usize) -> Result<Self, SffError> {
        let path = Polynomial::fit(&frame.x, &frame.y, degree, DetrendStage::Trajectory)?;
        Ok(Self::from_polynomial(path))
    }

    pub fn from_polynomial(path: Polynomial) -> Self {
        let slope = path.derivative();
        TrajectoryModel { path, slope }
    }

    pub fn path(&self) -> &Polynomial {
        &self.path
    }

    pub fn slope(&self) -> &Polynomial {
        &self.slope
    }

    /// Arc-length integrand `sqrt(1 + p'(x)²)`.
    #[inline]
    pub fn speed(&self, x: f64) -> f64 {
        let d = self.slope.eval(x);
        (1.0 + d * d).sqrt()
    }
}
