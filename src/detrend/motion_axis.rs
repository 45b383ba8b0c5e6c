//! # Principal motion axis of a centroid cloud
//!
//! Estimate the rotation that aligns a chunk's centroid drift with the X axis.
//!
//! ## Algorithm
//! -----------------
//! 1. Center both coordinates on their median and add [`CENTROID_BIAS`]
//!    (see [`centered_offsets`]).
//! 2. Build the 2×2 sample covariance of the centered cloud and decompose it with
//!    [`eigen2::decompose`](crate::eigen2::decompose).
//! 3. Read `(y1, x1)` from the **first row** of the eigenvector matrix, i.e. the
//!    first component of the first and second eigenvectors. Pairs stay in the
//!    order of the Schur reduction: a cloud elongated along Y puts its minor
//!    axis first. No reordering by eigenvalue is applied.
//! 4. `θ = atan(y1 / x1)`, replaced by `2π − θ` when both components are positive.
//!
//! The rotation matrix is `[[cos θ, −sin θ], [sin θ, cos θ]]` and is applied to
//! row vectors: `[x', y'] = [x, y] · R`.
//!
//! ## Degeneracies
//! -----------------
//! A cloud with zero spread along either axis, fewer than two samples, or an
//! eigenvector component `x1 ≈ 0` has no usable angle; these cases return
//! [`SffError::NumericDegeneracy`] instead of a NaN angle.
//!
//! [`CENTROID_BIAS`]: crate::constants::CENTROID_BIAS
use nalgebra::{Matrix2, MatrixXx2};

use crate::{
    constants::{Pixel, Radian, AXIS_EPS, DPI},
    eigen2,
    sff_errors::{DetrendStage, SffError},
    stats::{covariance2, median},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionAxis {
    theta: Radian,
    rotation: Matrix2<f64>,
}

fn degenerate(reason: impl Into<String>) -> SffError {
    SffError::NumericDegeneracy {
        chunk: 0,
        stage: DetrendStage::MotionAxis,
        reason: reason.into(),
    }
}

/// Subtract the median of each coordinate and add `bias`.
pub fn centered_offsets(
    centroid_x: &[Pixel],
    centroid_y: &[Pixel],
    bias: f64,
) -> Result<(Vec<f64>, Vec<f64>), SffError> {
    let mx = median(centroid_x).ok_or_else(|| degenerate("empty centroid sequence"))?;
    let my = median(centroid_y).ok_or_else(|| degenerate("empty centroid sequence"))?;
    Ok((
        centroid_x.iter().map(|x| x - mx + bias).collect(),
        centroid_y.iter().map(|y| y - my + bias).collect(),
    ))
}

impl MotionAxis {
    /// Build the axis for a given angle.
    pub fn from_angle(theta: Radian) -> Self {
        let (s, c) = theta.sin_cos();
        MotionAxis {
            theta,
            rotation: Matrix2::new(c, -s, s, c),
        }
    }

    /// Estimate the motion axis from centered centroid offsets.
    ///
    /// Arguments
    /// -----------------
    /// * `x`, `y`: centroid coordinates already passed through [`centered_offsets`].
    ///
    /// Return
    /// ----------
    /// * The [`MotionAxis`] of the cloud.
    /// * [`SffError::NumericDegeneracy`] (chunk `0`) when no angle can be derived.
    pub fn estimate(x: &[f64], y: &[f64]) -> Result<Self, SffError> {
        let cov = covariance2(x, y)
            .ok_or_else(|| degenerate(format!("covariance needs two paired samples, got {}", x.len())))?;

        Self::from_covariance(&cov)
    }

    /// Motion axis of a cloud with the given 2×2 covariance `[[var_x, cov], [cov, var_y]]`.
    ///
    /// Return
    /// ----------
    /// * `θ = atan(y1 / x1)`, or `2π − θ` when both components are positive, where
    ///   `(y1, x1)` is the first row of the eigenvector matrix.
    /// * [`SffError::NumericDegeneracy`] (chunk `0`) for a zero variance, a
    ///   non-finite matrix or `x1 ≈ 0`.
    pub fn from_covariance(cov: &Matrix2<f64>) -> Result<Self, SffError> {
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(degenerate("covariance matrix is not finite"));
        }
        if cov[(0, 0)] <= 0.0 || cov[(1, 1)] <= 0.0 {
            return Err(degenerate(format!(
                "zero centroid variance (var_x = {:e}, var_y = {:e})",
                cov[(0, 0)],
                cov[(1, 1)]
            )));
        }

        let eigen = eigen2::decompose(cov)
            .ok_or_else(|| degenerate("covariance has no real eigen-decomposition"))?;
        let y1 = eigen.vectors[(0, 0)];
        let x1 = eigen.vectors[(0, 1)];

        if !x1.is_finite() || !y1.is_finite() || x1.abs() < AXIS_EPS {
            return Err(degenerate(format!(
                "eigenvector component x1 = {x1:e} gives no defined angle"
            )));
        }

        let mut theta = (y1 / x1).atan();
        if x1 > 0.0 && y1 > 0.0 {
            theta = DPI - theta;
        }

        Ok(Self::from_angle(theta))
    }

    pub fn theta(&self) -> Radian {
        self.theta
    }

    pub fn rotation(&self) -> &Matrix2<f64> {
        &self.rotation
    }

    /// Rotate each point `[x, y]` as a row vector: `[x, y] · R`.
    pub fn rotate(&self, x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let points = MatrixXx2::from_fn(x.len().min(y.len()), |i, j| if j == 0 { x[i] } else { y[i] });
        let rotated = points * self.rotation;
        (
            rotated.column(0).iter().copied().collect(),
            rotated.column(1).iter().copied().collect(),
        )
    }

    /// `true` when `Rᵀ·R` equals the identity within `tol` (Frobenius norm).
    pub fn is_orthogonal(&self, tol: f64) -> bool {
        (self.rotation.transpose() * self.rotation - Matrix2::identity()).norm() <= tol
    }
}

#[cfg(test)]
mod motion_axis_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_cloud(slope: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.01).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| slope * v + 0.001 * ((i * 7919) % 13) as f64)
            .collect();
        centered_offsets(&x, &y, 1.5).unwrap()
    }

    #[test]
    fn test_centered_offsets() {
        let (x, y) = centered_offsets(&[1.0, 2.0, 3.0], &[10.0, 10.5, 11.0], 1.5).unwrap();
        assert_eq!(x, vec![0.5, 1.5, 2.5]);
        assert_eq!(y, vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_from_angle_matrix_layout() {
        let axis = MotionAxis::from_angle(std::f64::consts::FRAC_PI_2);
        let r = axis.rotation();
        assert_abs_diff_eq!(r[(0, 0)], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[(0, 1)], -1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[(1, 0)], 1.0, epsilon = 1e-15);

        // [1, 0] · R = [cos, -sin]
        let (xr, yr) = axis.rotate(&[1.0], &[0.0]);
        assert_abs_diff_eq!(xr[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(yr[0], -1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_rotation_is_orthogonal() {
        for slope in [-3.0, -0.4, 0.2, 1.0, 5.0] {
            let (x, y) = line_cloud(slope, 200);
            let axis = MotionAxis::estimate(&x, &y).unwrap();
            assert!(axis.is_orthogonal(1e-12), "slope {slope}");
            assert!(axis.theta().is_finite());
        }
    }

    #[test]
    fn test_rotation_preserves_distances() {
        let (x, y) = line_cloud(0.7, 50);
        let axis = MotionAxis::estimate(&x, &y).unwrap();
        let (xr, yr) = axis.rotate(&x, &y);
        for i in 0..x.len() {
            let before = x[i].hypot(y[i]);
            let after = xr[i].hypot(yr[i]);
            assert_abs_diff_eq!(before, after, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_theta_from_known_covariances() {
        // first eigenvector row of numpy.linalg.eig for each matrix
        let wider_x = MotionAxis::from_covariance(&Matrix2::new(3.0, 1.0, 1.0, 2.0)).unwrap();
        assert_abs_diff_eq!(wider_x.theta(), -1.017_221_967_897_851_4, epsilon = 1e-12);

        let wider_y = MotionAxis::from_covariance(&Matrix2::new(2.0, 1.0, 1.0, 3.0)).unwrap();
        assert_abs_diff_eq!(wider_y.theta(), 1.017_221_967_897_851_4, epsilon = 1e-12);

        let diagonal = MotionAxis::from_covariance(&Matrix2::new(2.0, 1.0, 1.0, 2.0)).unwrap();
        assert_abs_diff_eq!(diagonal.theta(), -std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_positive_components_use_complement_angle() {
        // eig([[4, -2], [-2, 1]]) first row: (0.894.., 0.447..)
        let axis = MotionAxis::from_covariance(&Matrix2::new(4.0, -2.0, -2.0, 1.0)).unwrap();
        assert_abs_diff_eq!(axis.theta(), DPI - 2.0_f64.atan(), epsilon = 1e-12);
    }

    #[test]
    fn test_uncorrelated_cloud_is_degenerate() {
        let err = MotionAxis::from_covariance(&Matrix2::new(2.0, 0.0, 0.0, 5.0)).unwrap_err();
        assert!(matches!(err, SffError::NumericDegeneracy { .. }));
    }

    #[test]
    fn test_constant_y_is_degenerate() {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.02).collect();
        let y = vec![4.2; 50];
        let (xc, yc) = centered_offsets(&x, &y, 1.5).unwrap();
        let err = MotionAxis::estimate(&xc, &yc).unwrap_err();
        assert!(matches!(
            err,
            SffError::NumericDegeneracy {
                stage: DetrendStage::MotionAxis,
                ..
            }
        ));
    }

    #[test]
    fn test_single_sample_is_degenerate() {
        assert!(MotionAxis::estimate(&[1.5], &[1.5]).is_err());
    }
}
