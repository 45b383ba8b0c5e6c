//! # Eigen-decomposition of a real 2×2 matrix
//!
//! Closed-form counterpart of the general real eigensolver (`dgeev`) for the
//! 2×2 case: the matrix is reduced to standard real Schur form by a single
//! rotation (`dlanv2`), the eigenvectors of the triangular factor are
//! back-transformed by that rotation and normalized to unit Euclidean length.
//!
//! The order of the eigen-pairs and the sign of each eigenvector follow that
//! reduction, not the magnitude of the eigenvalues. For a symmetric matrix
//! `[[a, b], [b, d]]` the first eigenvalue is the one reached from the `(0, 0)`
//! entry, so a covariance elongated along the second coordinate lists its
//! minor axis first.
//!
//! Only matrices with real eigenvalues are accepted (every symmetric matrix
//! qualifies); a complex-conjugate pair yields `None`.
use nalgebra::{Matrix2, Vector2};

/// Eigenvalues and unit right eigenvectors (as columns), in solver order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen2 {
    pub values: Vector2<f64>,
    pub vectors: Matrix2<f64>,
}

/// Fortran `SIGN(a, b)`: `|a|` carrying the sign of `b`.
fn sign(a: f64, b: f64) -> f64 {
    a.abs().copysign(b)
}

/// Standardized Schur factorization of `[[a, b], [c, d]]`.
///
/// Return
/// ----------
/// * `(t, cs, sn)` with `t = [[t11, t12], [t21, t22]]` the Schur factor and
///   `[[cs, -sn], [sn, cs]]` the rotation taking the input to `t`.
fn schur_standardize(mut a: f64, mut b: f64, mut c: f64, mut d: f64) -> (Matrix2<f64>, f64, f64) {
    let eps = f64::EPSILON;
    let mut cs;
    let mut sn;

    if c == 0.0 {
        cs = 1.0;
        sn = 0.0;
    } else if b == 0.0 {
        cs = 0.0;
        sn = 1.0;
        std::mem::swap(&mut a, &mut d);
        b = -c;
        c = 0.0;
    } else if a - d == 0.0 && b.signum() != c.signum() {
        cs = 1.0;
        sn = 0.0;
    } else {
        let temp = a - d;
        let mut p = 0.5 * temp;
        let bcmax = b.abs().max(c.abs());
        let bcmis = b.abs().min(c.abs()) * sign(1.0, b) * sign(1.0, c);
        let scale = p.abs().max(bcmax);
        let mut z = (p / scale) * p + (bcmax / scale) * bcmis;

        if z >= 4.0 * eps {
            // real eigenvalues
            z = p + sign(scale.sqrt() * z.sqrt(), p);
            a = d + z;
            d -= (bcmax / z) * bcmis;
            let tau = c.hypot(z);
            cs = z / tau;
            sn = c / tau;
            b -= c;
            c = 0.0;
        } else {
            // nearly equal eigenvalues: equalize the diagonal first
            let sigma = b + c;
            let tau = sigma.hypot(temp);
            cs = (0.5 * (1.0 + sigma.abs() / tau)).sqrt();
            sn = -(p / (tau * cs)) * sign(1.0, sigma);

            let aa = a * cs + b * sn;
            let bb = -a * sn + b * cs;
            let cc = c * cs + d * sn;
            let dd = -c * sn + d * cs;

            a = aa * cs + cc * sn;
            b = bb * cs + dd * sn;
            c = -aa * sn + cc * cs;
            d = -bb * sn + dd * cs;

            let mid = 0.5 * (a + d);
            a = mid;
            d = mid;

            if c != 0.0 {
                if b != 0.0 {
                    if b.signum() == c.signum() {
                        let sab = b.abs().sqrt();
                        let sac = c.abs().sqrt();
                        p = sign(sab * sac, c);
                        let tau = 1.0 / (b + c).abs().sqrt();
                        a = mid + p;
                        d = mid - p;
                        b -= c;
                        c = 0.0;
                        let cs1 = sab * tau;
                        let sn1 = sac * tau;
                        let rotated = cs * cs1 - sn * sn1;
                        sn = cs * sn1 + sn * cs1;
                        cs = rotated;
                    }
                } else {
                    b = -c;
                    c = 0.0;
                    let rotated = cs;
                    cs = -sn;
                    sn = rotated;
                }
            }
        }
    }

    (Matrix2::new(a, b, c, d), cs, sn)
}

/// `true` when the subdiagonal entry can be dropped without perturbing the
/// eigenvalues beyond working precision.
fn negligible_subdiagonal(h: &Matrix2<f64>) -> bool {
    let ulp = f64::EPSILON;
    let smlnum = f64::MIN_POSITIVE * (2.0 / ulp);
    let h21 = h[(1, 0)].abs();
    if h21 <= smlnum {
        return true;
    }
    let tst = h[(0, 0)].abs() + h[(1, 1)].abs();
    if h21 > ulp * tst {
        return false;
    }
    let h12 = h[(0, 1)].abs();
    let ab = h21.max(h12);
    let ba = h21.min(h12);
    let diff = (h[(0, 0)] - h[(1, 1)]).abs();
    let aa = h[(1, 1)].abs().max(diff);
    let bb = h[(1, 1)].abs().min(diff);
    let s = aa + ab;
    ba * (ab / s) <= smlnum.max(ulp * (bb * (aa / s)))
}

/// Decompose `m` into eigenvalues and unit eigenvectors.
///
/// Arguments
/// -----------------
/// * `m`: a real 2×2 matrix with finite entries.
///
/// Return
/// ----------
/// * `Some(Eigen2)` with eigenvector `i` in column `i` of `vectors`.
/// * `None` for non-finite input or complex eigenvalues.
pub fn decompose(m: &Matrix2<f64>) -> Option<Eigen2> {
    if m.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (t, cs, sn) = if negligible_subdiagonal(m) {
        (Matrix2::new(m[(0, 0)], m[(0, 1)], 0.0, m[(1, 1)]), 1.0, 0.0)
    } else {
        schur_standardize(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
    };
    if t[(1, 0)] != 0.0 {
        return None;
    }

    let schur_vectors = Matrix2::new(cs, -sn, sn, cs);
    let (l1, l2) = (t[(0, 0)], t[(1, 1)]);

    // eigenvector of the upper-triangular factor for l2: [x, 1]
    let smin = (f64::EPSILON * l2.abs()).max(f64::MIN_POSITIVE * (2.0 / f64::EPSILON));
    let mut pivot = l1 - l2;
    if pivot.abs() < smin {
        pivot = smin;
    }
    let x = -t[(0, 1)] / pivot;

    let v1 = schur_vectors.column(0).into_owned();
    let v2 = schur_vectors.column(0) * x + schur_vectors.column(1);
    let vectors = Matrix2::from_columns(&[v1.normalize(), v2.normalize()]);

    Some(Eigen2 {
        values: Vector2::new(l1, l2),
        vectors,
    })
}
