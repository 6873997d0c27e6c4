//! Real roots of a general cubic via Cardano's trigonometric/hyperbolic form.

use fk_core::{Error, Result};
use num_complex::Complex64;

/// Roots whose imaginary part is below this are reported as real.
pub const ROOT_IMAG_TOLERANCE: f64 = 1e-4;

/// Real roots of `a·x³ + b·x² + c·x + d = 0`, in no particular order.
///
/// With `q = (3ac − b²)/(9a²)`, `r = (9abc − 27a²d − 2b³)/(54a³)` and
/// `Δ = q³ + r²`, the all-real case (`Δ ≤ 0`) uses the trigonometric form and
/// the mixed case (`Δ > 0`) the real cube roots. Repeated roots are reported
/// once per multiplicity.
///
/// `a == 0` and non-finite coefficients are rejected.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Result<Vec<f64>> {
    if a == 0.0 {
        return Err(Error::Validation("cubic leading coefficient must be non-zero".into()));
    }
    if ![a, b, c, d].iter().all(|v| v.is_finite()) {
        return Err(Error::Validation(format!(
            "cubic coefficients must be finite, got ({a}, {b}, {c}, {d})"
        )));
    }

    let q = (3.0 * a * c - b * b) / (9.0 * a * a);
    let r = (9.0 * a * b * c - 27.0 * a * a * d - 2.0 * b * b * b) / (54.0 * a * a * a);
    let delta = q * q * q + r * r;

    let (s, t) = if delta <= 0.0 {
        let rho = (-(q * q * q)).sqrt();
        // rho == 0 only for a triple root (q == r == 0)
        let theta = if rho > 0.0 { (r / rho).clamp(-1.0, 1.0).acos() } else { 0.0 };
        let modulus = (-q).max(0.0).sqrt();
        (Complex64::from_polar(modulus, theta / 3.0), Complex64::from_polar(modulus, -theta / 3.0))
    } else {
        let sd = delta.sqrt();
        (Complex64::new((r + sd).cbrt(), 0.0), Complex64::new((r - sd).cbrt(), 0.0))
    };

    let shift = Complex64::new(-b / (3.0 * a), 0.0);
    let rot = (s - t) * Complex64::i() * (3.0f64.sqrt() / 2.0);
    let roots = [s + t + shift, (s + t) * -0.5 + shift + rot, (s + t) * -0.5 + shift - rot];

    Ok(roots.iter().filter(|x| x.im.abs() < ROOT_IMAG_TOLERANCE).map(|x| x.re).collect())
}
