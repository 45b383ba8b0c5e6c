//! # Adaptive Gauss–Kronrod quadrature
//!
//! Globally adaptive integration of a smooth scalar function on a finite
//! interval, used to turn the trajectory derivative into arc length.
//!
//! ## Algorithm
//! -----------------
//! 1. Apply the 15-point Kronrod rule (with its embedded 7-point Gauss rule) on
//!    the whole interval; the Kronrod/Gauss difference gives the error estimate.
//! 2. While the summed error exceeds `max(epsabs, epsrel·|I|)`, bisect the
//!    subinterval with the largest error estimate and re-apply the rule on both
//!    halves.
//! 3. Stop with an error once `limit` subintervals exist, or once a subinterval
//!    can no longer be split in floating point.
//!
//! The error scaling follows the classical QUADPACK `qk15` heuristic.
//!
//! Integrating from `a` to `b < a` returns the negated integral from `b` to `a`.

/// Kronrod abscissae on [0, 1], the odd entries are shared with the Gauss rule.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_2,
    0.140_653_259_715_525_9,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_8,
];

/// 7-point Gauss weights for `XGK[1], XGK[3], XGK[5], XGK[7]`.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Outcome of a converged integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadResult {
    pub value: f64,
    pub abs_error: f64,
    pub n_intervals: usize,
}

/// Best estimate reached when the tolerance could not be met.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadNotConverged {
    pub value: f64,
    pub abs_error: f64,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn kronrod15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Segment {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();

    let fc = f(center);
    let mut resg = fc * WG[3];
    let mut resk = fc * WGK[7];
    let mut resabs = resk.abs();

    let mut fv1 = [0.0; 7];
    let mut fv2 = [0.0; 7];

    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = f(center - dx);
        let f2 = f(center + dx);
        fv1[j] = f1;
        fv2[j] = f2;
        let sum = f1 + f2;
        resk += WGK[j] * sum;
        resabs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            resg += WG[j / 2] * sum;
        }
    }

    let reskh = resk * 0.5;
    let mut resasc = WGK[7] * (fc - reskh).abs();
    for j in 0..7 {
        resasc += WGK[j] * ((fv1[j] - reskh).abs() + (fv2[j] - reskh).abs());
    }

    let value = resk * half;
    resabs *= abs_half;
    resasc *= abs_half;

    let mut error = ((resk - resg) * half).abs();
    if resasc != 0.0 && error != 0.0 {
        error = resasc * (200.0 * error / resasc).powf(1.5).min(1.0);
    }
    if resabs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * resabs);
    }

    Segment { a, b, value, error }
}

/// Integrate `f` over `[a, b]`.
///
/// Arguments
/// -----------------
/// * `f`: integrand, evaluated only strictly inside the interval.
/// * `a`, `b`: bounds; `b < a` is allowed.
/// * `epsabs`: absolute error tolerance.
/// * `epsrel`: relative error tolerance (`0.0` disables it).
/// * `limit`: maximum number of subintervals.
///
/// Return
/// ----------
/// * `Ok(QuadResult)` once the estimated error is within tolerance.
/// * `Err(QuadNotConverged)` with the last estimate when the subdivision budget is
///   exhausted, the interval cannot be split further, or the integrand is not finite.
pub fn integrate<F>(
    f: F,
    a: f64,
    b: f64,
    epsabs: f64,
    epsrel: f64,
    limit: usize,
) -> Result<QuadResult, QuadNotConverged>
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return Ok(QuadResult {
            value: 0.0,
            abs_error: 0.0,
            n_intervals: 0,
        });
    }
    let (lo, hi, sign) = if b < a { (b, a, -1.0) } else { (a, b, 1.0) };

    let mut segments = vec![kronrod15(&f, lo, hi)];
    let limit = limit.max(1);

    loop {
        let value: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        let tolerance = epsabs.max(epsrel * value.abs());

        if !value.is_finite() || !error.is_finite() {
            return Err(QuadNotConverged {
                value: sign * value,
                abs_error: error,
                tolerance,
            });
        }
        if error <= tolerance {
            return Ok(QuadResult {
                value: sign * value,
                abs_error: error,
                n_intervals: segments.len(),
            });
        }
        if segments.len() >= limit {
            return Err(QuadNotConverged {
                value: sign * value,
                abs_error: error,
                tolerance,
            });
        }

        let (worst_idx, worst) = segments
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, l), (_, r)| l.error.total_cmp(&r.error))
            .ok_or(QuadNotConverged {
                value: sign * value,
                abs_error: error,
                tolerance,
            })?;

        let mid = 0.5 * (worst.a + worst.b);
        if mid <= worst.a || mid >= worst.b {
            return Err(QuadNotConverged {
                value: sign * value,
                abs_error: error,
                tolerance,
            });
        }

        segments.swap_remove(worst_idx);
        segments.push(kronrod15(&f, worst.a, mid));
        segments.push(kronrod15(&f, mid, worst.b));
    }
}
