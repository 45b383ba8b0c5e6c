//! # Least-squares polynomials
//!
//! [`Polynomial`] stores its coefficients **highest degree first**
//! (`c_0·x^d + c_1·x^(d-1) + … + c_d`), the layout used by the trajectory and
//! flux models and by the arc-length derivative rule.
//!
//! Fitting solves the Vandermonde least-squares system with an SVD
//! (`nalgebra::SVD`). Columns are scaled to unit norm before the decomposition
//! and the scale is removed from the solution afterwards, which keeps degree-5
//! fits on pixel-sized abscissae well conditioned.
use nalgebra::{DMatrix, DVector};

use crate::sff_errors::{DetrendStage, SffError};

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Build a polynomial from coefficients, highest degree first.
    ///
    /// An empty coefficient list is the zero polynomial.
    pub fn new(coeffs: Vec<f64>) -> Self {
        if coeffs.is_empty() {
            return Polynomial { coeffs: vec![0.0] };
        }
        Polynomial { coeffs }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Ordinary least-squares fit of `y ≈ p(x)` with `deg(p) = degree`.
    ///
    /// Arguments
    /// -----------------
    /// * `x`, `y`: paired samples.
    /// * `degree`: polynomial degree.
    /// * `stage`: pipeline stage reported in errors.
    ///
    /// Return
    /// ----------
    /// * The fitted [`Polynomial`].
    /// * [`SffError::InsufficientSamples`] when `x.len() <= degree`.
    /// * [`SffError::SingularFit`] when the inputs are not finite or the SVD fails.
    ///
    /// The chunk index of an `InsufficientSamples` error is `0`; callers rewrite it
    /// with the real chunk index.
    pub fn fit(x: &[f64], y: &[f64], degree: usize, stage: DetrendStage) -> Result<Self, SffError> {
        if x.len() != y.len() {
            return Err(SffError::InvalidConfiguration(format!(
                "polynomial fit needs paired samples, got {} abscissae and {} ordinates",
                x.len(),
                y.len()
            )));
        }
        if x.len() <= degree {
            return Err(SffError::InsufficientSamples {
                chunk: 0,
                stage,
                samples: x.len(),
                degree,
            });
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(SffError::SingularFit(format!(
                "non-finite sample in {stage} input"
            )));
        }

        let n_coeffs = degree + 1;
        let mut vander = DMatrix::<f64>::from_fn(x.len(), n_coeffs, |i, j| {
            x[i].powi((degree - j) as i32)
        });

        let scale: Vec<f64> = vander
            .column_iter()
            .map(|col| {
                let norm = col.norm();
                if norm > 0.0 {
                    norm
                } else {
                    1.0
                }
            })
            .collect();
        for (j, s) in scale.iter().enumerate() {
            let mut col = vander.column_mut(j);
            col /= *s;
        }

        let rhs = DVector::from_column_slice(y);
        let rcond = x.len() as f64 * f64::EPSILON;
        let svd = vander.svd(true, true);
        let max_sv = svd.singular_values.max();
        let solution = svd
            .solve(&rhs, rcond * max_sv)
            .map_err(|e| SffError::SingularFit(format!("{stage}: {e}")))?;

        let coeffs = solution
            .iter()
            .zip(&scale)
            .map(|(c, s)| c / s)
            .collect::<Vec<f64>>();

        Ok(Polynomial { coeffs })
    }

    /// Evaluate the polynomial at `x` with Horner's scheme.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    /// First derivative.
    ///
    /// Drops the constant term and multiplies each remaining coefficient by its
    /// exponent: `c_0·d, c_1·(d-1), …, c_(d-1)·1`.
    pub fn derivative(&self) -> Polynomial {
        let d = self.degree();
        if d == 0 {
            return Polynomial { coeffs: vec![0.0] };
        }
        let coeffs = self.coeffs[..d]
            .iter()
            .enumerate()
            .map(|(i, c)| c * (d - i) as f64)
            .collect();
        Polynomial { coeffs }
    }
}

#[cfg(test)]
mod polynomial_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_eval_horner() {
        // 2x^2 - 3x + 1
        let p = Polynomial::new(vec![2.0, -3.0, 1.0]);
        assert_eq!(p.eval(0.0), 1.0);
        assert_eq!(p.eval(2.0), 3.0);
        assert_eq!(p.degree(), 2);
    }

    #[test]
    fn test_derivative_rule() {
        // x^3 + 2x^2 + 3x + 4 -> 3x^2 + 4x + 3
        let p = Polynomial::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(p.derivative().coefficients(), &[3.0, 4.0, 3.0]);
        assert_eq!(Polynomial::new(vec![7.0]).derivative().coefficients(), &[0.0]);
    }

    #[test]
    fn test_fit_recovers_exact_cubic() {
        let truth = Polynomial::new(vec![0.5, -1.0, 2.0, 3.0]);
        let x: Vec<f64> = (0..40).map(|i| -2.0 + i as f64 * 0.1).collect();
        let y = truth.eval_many(&x);

        let fitted = Polynomial::fit(&x, &y, 3, DetrendStage::Trajectory).unwrap();
        for (a, b) in fitted.coefficients().iter().zip(truth.coefficients()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fit_higher_degree_than_truth() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.05 - 0.7).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 + 0.2 * v).collect();

        let fitted = Polynomial::fit(&x, &y, 5, DetrendStage::FluxFit).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(fitted.eval(*xi), *yi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fit_insufficient_samples() {
        let err = Polynomial::fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0], 3, DetrendStage::Trajectory)
            .unwrap_err();
        assert_eq!(
            err,
            SffError::InsufficientSamples {
                chunk: 0,
                stage: DetrendStage::Trajectory,
                samples: 3,
                degree: 3,
            }
        );
    }

    #[test]
    fn test_fit_rejects_nan() {
        let err = Polynomial::fit(&[0.0, 1.0, f64::NAN], &[1.0, 2.0, 3.0], 1, DetrendStage::FluxFit)
            .unwrap_err();
        assert!(matches!(err, SffError::SingularFit(_)));
    }
}
