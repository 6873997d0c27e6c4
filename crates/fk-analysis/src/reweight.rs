//! Conversion of EFT reweighting points into polynomial coefficients.
//!
//! For `N` operators the weight vector is laid out as
//!
//! ```text
//! [nominal, sm, s(c₁=½), s(c₁=1), …, s(c_N=½), s(c_N=1), s(c_i=c_j=1) for i < j]
//! ```
//!
//! With `s(c) = sm + A·c + B·c²` per operator, the pair at `c = ½, 1` yields
//! `A = 4(s½ − sm) − (s₁ − sm)` and `B = (s₁ − sm) − A`. Cross points become
//! `s_ij − (sm + A_i + A_j + B_ii + B_jj)`.

use fk_core::{Error, Result};

/// Number of operators for a weight vector of length `n`, if the length fits the layout.
pub fn operator_count(n: usize) -> Option<usize> {
    if n < 2 {
        return None;
    }
    let disc = 9.0 + 8.0 * (n as f64 - 2.0);
    let approx = ((disc.sqrt() + 0.5).floor() as i64 - 3) / 2;
    let n_ops = usize::try_from(approx).ok()?;
    (expected_len(n_ops) == n).then_some(n_ops)
}

fn expected_len(n_ops: usize) -> usize {
    2 + 2 * n_ops + n_ops * n_ops.saturating_sub(1) / 2
}

/// Replace the reweighting points in `weights` by linear, quadratic and cross coefficients.
///
/// The nominal and SM entries are left untouched.
pub fn correct_eft_weights(weights: &mut [f64]) -> Result<()> {
    let n_ops = operator_count(weights.len()).ok_or_else(|| {
        Error::Validation(format!(
            "{} weights do not match [nominal, sm, 2 per operator, cross terms]",
            weights.len()
        ))
    })?;

    let input = weights.to_vec();
    let sm = input[1];
    for ip in 0..n_ops {
        let s1 = input[2 * ip + 2] - sm;
        let s2 = input[2 * ip + 3] - sm;
        let a = 4.0 * s1 - s2;
        weights[2 * ip + 2] = a;
        weights[2 * ip + 3] = s2 - a;
    }

    let mut k = 2 + 2 * n_ops;
    for ix in 0..n_ops {
        for iy in (ix + 1)..n_ops {
            let (ax, bxx) = (weights[2 * ix + 2], weights[2 * ix + 3]);
            let (ay, byy) = (weights[2 * iy + 2], weights[2 * iy + 3]);
            weights[k] = input[k] - (sm + ax + ay + bxx + byy);
            k += 1;
        }
    }
    Ok(())
}
