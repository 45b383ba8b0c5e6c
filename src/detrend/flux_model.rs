//! Flux as a polynomial function of arc length.
//!
//! Pointing-induced flux variations track how far the star sits along its
//! drift path. Fitting normalized flux against arc length and dividing the
//! prediction out leaves the astrophysical signal.
use crate::{
    constants::{ArcLength, Flux},
    polynomial::Polynomial,
    sff_errors::{DetrendStage, SffError},
};

#[derive(Debug, Clone, PartialEq)]
pub struct FluxModel {
    poly: Polynomial,
}

impl FluxModel {
    /// Least-squares fit of `flux ≈ q(arc)` with `deg(q) = degree`.
    pub fn fit(arc: &[ArcLength], flux: &[Flux], degree: usize) -> Result<Self, SffError> {
        let poly = Polynomial::fit(arc, flux, degree, DetrendStage::FluxFit)?;
        Ok(FluxModel { poly })
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.poly
    }

    pub fn predict(&self, arc: &[ArcLength]) -> Vec<Flux> {
        self.poly.eval_many(arc)
    }

    /// Divide `flux` by the model prediction at each arc length.
    ///
    /// Return
    /// ----------
    /// * Corrected flux, one value per sample.
    /// * [`SffError::NumericDegeneracy`] when a prediction is zero or not finite.
    pub fn correct(&self, arc: &[ArcLength], flux: &[Flux]) -> Result<Vec<Flux>, SffError> {
        self.predict(arc)
            .into_iter()
            .zip(flux)
            .enumerate()
            .map(|(i, (predicted, &f))| {
                if predicted == 0.0 || !predicted.is_finite() {
                    return Err(SffError::NumericDegeneracy {
                        chunk: 0,
                        stage: DetrendStage::FluxFit,
                        reason: format!("predicted flux is {predicted} at sample {i}"),
                    });
                }
                Ok(f / predicted)
            })
            .collect()
    }
}

#[cfg(test)]
mod flux_model_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_correct_removes_polynomial_trend() {
        let arc: Vec<f64> = (0..80).map(|i| -1.0 + i as f64 * 0.025).collect();
        let flux: Vec<f64> = arc.iter().map(|s| 1.0 + 0.02 * s - 0.01 * s * s).collect();

        let model = FluxModel::fit(&arc, &flux, 3).unwrap();
        let corrected = model.correct(&arc, &flux).unwrap();
        for c in corrected {
            assert_abs_diff_eq!(c, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_correct_divides_by_prediction() {
        let arc = [-0.5, 0.0, 0.5, 1.0, 1.5];
        let flux = [0.98, 1.0, 1.03, 1.01, 0.99];
        let model = FluxModel::fit(&arc, &flux, 2).unwrap();

        let predicted = model.predict(&arc);
        let corrected = model.correct(&arc, &flux).unwrap();
        for i in 0..arc.len() {
            assert_eq!(corrected[i], flux[i] / predicted[i]);
        }
    }

    #[test]
    fn test_zero_prediction_is_degenerate() {
        let arc = [0.0, 1.0, 2.0];
        let flux = [0.0, 0.0, 0.0];
        let model = FluxModel::fit(&arc, &flux, 1).unwrap();
        let err = model.correct(&arc, &flux).unwrap_err();
        assert!(matches!(
            err,
            SffError::NumericDegeneracy {
                stage: DetrendStage::FluxFit,
                ..
            }
        ));
    }

    #[test]
    fn test_insufficient_samples() {
        let err = FluxModel::fit(&[0.0, 1.0], &[1.0, 1.0], 2).unwrap_err();
        assert!(matches!(
            err,
            SffError::InsufficientSamples {
                stage: DetrendStage::FluxFit,
                samples: 2,
                degree: 2,
                ..
            }
        ));
    }
}
