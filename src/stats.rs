//! # Sample statistics
//!
//! Small reductions shared by the detrending stages: median (used for every
//! centering and normalization step), mean, population standard deviation and the
//! 2×2 sample covariance of a centroid cloud.
//!
//! Conventions follow the usual numerical-array semantics:
//! * [`median`] averages the two middle values for even lengths,
//! * [`std_dev`] divides by `n` (population),
//! * [`covariance2`] divides by `n - 1` (unbiased sample covariance).
use itertools::Itertools;
use nalgebra::Matrix2;

/// Median of a slice, `None` if the slice is empty.
///
/// NaN values sort after every finite value, so a slice containing NaN
/// yields a shifted (but deterministic) result.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sorted = values
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect::<Vec<f64>>();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean, `None` if the slice is empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` if the slice is empty.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Unbiased 2×2 covariance matrix of paired samples `(x, y)`.
///
/// Arguments
/// -----------------
/// * `x`, `y`: paired samples of equal length.
///
/// Return
/// ----------
/// * `Some([[var(x), cov(x,y)], [cov(x,y), var(y)]])`, or `None` when fewer than two
///   pairs are available or the lengths differ.
pub fn covariance2(x: &[f64], y: &[f64]) -> Option<Matrix2<f64>> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let (sxx, sxy, syy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (xi, yi)| {
            let dx = xi - mx;
            let dy = yi - my;
            (sxx + dx * dx, sxy + dx * dy, syy + dy * dy)
        });

    let norm = (x.len() - 1) as f64;
    Some(Matrix2::new(
        sxx / norm,
        sxy / norm,
        sxy / norm,
        syy / norm,
    ))
}

#[cfg(test)]
mod stats_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_std_dev_population() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&v).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance2_matches_hand_computation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.5];
        let cov = covariance2(&x, &y).unwrap();

        // var(x) = 5/3, cov = (sum dx*dy)/3
        assert_relative_eq!(cov[(0, 0)], 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], cov[(1, 0)], epsilon = 0.0);
        assert_relative_eq!(cov[(0, 1)], 10.75 / 3.0, epsilon = 1e-12);
        assert!(covariance2(&[1.0], &[1.0]).is_none());
    }
}
