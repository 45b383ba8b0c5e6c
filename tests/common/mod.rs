use k2sff::TimeSeries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Synthetic K2-like series: linear time, linear centroid drift with small jitter,
/// and flux modulated by the centroid position.
///
/// * `flux = 1 + 0.01·sin(cx) + N(0, flux_noise)`
/// * `cx`, `cy` drift linearly by `drift_px` pixels over the series.
pub fn drifting_star(n: usize, drift_px: f64, flux_noise: f64, seed: u64) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Normal::new(0.0, 0.002).unwrap();
    let noise = Normal::new(0.0, flux_noise).unwrap();

    let time: Vec<f64> = (0..n).map(|i| 2300.0 + i as f64 * 0.0204).collect();
    let centroid_x: Vec<f64> = (0..n)
        .map(|i| 640.0 + drift_px * i as f64 / n as f64 + jitter.sample(&mut rng))
        .collect();
    let centroid_y: Vec<f64> = (0..n)
        .map(|i| 210.0 + 0.6 * drift_px * i as f64 / n as f64 + jitter.sample(&mut rng))
        .collect();
    let flux: Vec<f64> = centroid_x
        .iter()
        .map(|x| 1.0 + 0.01 * x.sin() + noise.sample(&mut rng))
        .collect();

    TimeSeries::new(time, flux, centroid_x, centroid_y).unwrap()
}

pub fn std_dev(v: &[f64]) -> f64 {
    k2sff::stats::std_dev(v).unwrap()
}

pub fn median(v: &[f64]) -> f64 {
    k2sff::stats::median(v).unwrap()
}
