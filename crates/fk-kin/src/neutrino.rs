//! Longitudinal neutrino momentum from a W-boson mass constraint.
//!
//! Given a charged lepton and the missing transverse momentum, the constraint
//! `m(ℓν) = m_W` is quadratic in the neutrino `pz`:
//!
//! ```text
//! μ  = m_W²/2 + MET·pT(ℓ)
//! a  = μ·pz(ℓ) / (E(ℓ)² − pz(ℓ)²)
//! Δ  = a² − (E(ℓ)²·MET² − μ²) / (E(ℓ)² − pz(ℓ)²)
//! pz = a ± √Δ
//! ```
//!
//! When `Δ ≤ 0` the measured MET is inconsistent with the constraint. The
//! transverse momentum is then moved to the nearest point of the curve
//! `mT(ℓν) = m_W`, found by solving a cubic on each branch of the curve, and
//! `pz` follows from the single (`Δ = 0`) solution.

use fk_core::{Error, FourMomentum, Result};

use crate::cubic::solve_cubic;

/// W-boson mass used for the constraint (GeV).
pub const W_MASS: f64 = 80.399;

/// Initial value of the running minimum distance; a squared LHC beam energy.
const NO_CANDIDATE: f64 = 14000.0 * 14000.0;

/// Which branch of the reconstruction produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutrinoSolutionKind {
    /// Two real solutions of the quadratic.
    TwoReal,
    /// Complex solutions; MET moved onto the `mT = m_W` curve.
    Corrected,
    /// No candidate on the curve; both vectors are zero.
    Unsolved,
}

/// Reconstructed neutrino candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutrinoSolutions {
    /// Preferred solution (smaller |pz| in the two-solution case).
    pub primary: FourMomentum,
    /// Other solution; zero unless `kind == TwoReal`.
    pub secondary: FourMomentum,
    /// Branch taken.
    pub kind: NeutrinoSolutionKind,
}

impl NeutrinoSolutions {
    fn unsolved() -> Self {
        Self {
            primary: FourMomentum::ZERO,
            secondary: FourMomentum::ZERO,
            kind: NeutrinoSolutionKind::Unsolved,
        }
    }

    /// False when the zero-vector sentinel was returned.
    pub fn is_solved(&self) -> bool {
        self.kind != NeutrinoSolutionKind::Unsolved
    }
}

/// Reconstruct the neutrino with `m_W` = [`W_MASS`].
pub fn reconstruct_neutrino_pz(
    lepton: &FourMomentum,
    met_px: f64,
    met_py: f64,
) -> Result<NeutrinoSolutions> {
    reconstruct_neutrino_pz_with_mass(lepton, met_px, met_py, W_MASS)
}

/// Reconstruct the neutrino for an arbitrary constraint mass.
///
/// Errors when the lepton has no transverse energy (`E² − pz² ≤ 0`), or when the
/// complex-root fallback is reached with `px(ℓ) == 0`.
pub fn reconstruct_neutrino_pz_with_mass(
    lepton: &FourMomentum,
    met_px: f64,
    met_py: f64,
    w_mass: f64,
) -> Result<NeutrinoSolutions> {
    let FourMomentum { px: pxl, py: pyl, pz: pzl, e: el } = *lepton;
    let denom = el * el - pzl * pzl;
    if denom.is_nan() || denom <= 0.0 {
        return Err(Error::Validation(format!(
            "lepton must carry transverse energy (E² - pz² = {denom})"
        )));
    }

    let met2 = met_px * met_px + met_py * met_py;
    let mu = w_mass * w_mass / 2.0 + met_px * pxl + met_py * pyl;
    let a = mu * pzl / denom;
    let b = (el * el * met2 - mu * mu) / denom;
    let disc = a * a - b;

    if disc > 0.0 {
        let root = disc.sqrt();
        let (mut pz1, mut pz2) = (a + root, a - root);
        if pz1.abs() > pz2.abs() {
            std::mem::swap(&mut pz1, &mut pz2);
        }
        return Ok(NeutrinoSolutions {
            primary: FourMomentum::new(met_px, met_py, pz1, (met2 + pz1 * pz1).sqrt()),
            secondary: FourMomentum::new(met_px, met_py, pz2, (met2 + pz2 * pz2).sqrt()),
            kind: NeutrinoSolutionKind::TwoReal,
        });
    }

    let Some((px, py)) = nearest_on_transverse_mass_curve(pxl, pyl, met_px, met_py, w_mass)?
    else {
        log::debug!("neutrino reconstruction: no candidate on the mT = mW curve");
        return Ok(NeutrinoSolutions::unsolved());
    };

    let mu_min = w_mass * w_mass / 2.0 + px * pxl + py * pyl;
    let pz = mu_min * pzl / denom;
    Ok(NeutrinoSolutions {
        primary: FourMomentum::new(px, py, pz, (px * px + py * py + pz * pz).sqrt()),
        secondary: FourMomentum::ZERO,
        kind: NeutrinoSolutionKind::Corrected,
    })
}

/// Transverse neutrino momentum on the `mT = m_W` curve closest to the measured MET.
///
/// Returns `Ok(None)` when neither cubic yields a usable non-negative root. The
/// boundary point of the curve is only considered after that check.
fn nearest_on_transverse_mass_curve(
    pxl: f64,
    pyl: f64,
    met_px: f64,
    met_py: f64,
    w_mass: f64,
) -> Result<Option<(f64, f64)>> {
    let ptl = pxl.hypot(pyl);
    if ptl == 0.0 || pxl == 0.0 {
        return Err(Error::Validation(format!(
            "complex-root fallback needs px(lepton) != 0 (px = {pxl}, pt = {ptl})"
        )));
    }

    let w2 = w_mass * w_mass;
    let ptl2 = ptl * ptl;
    let pxl2 = pxl * pxl;
    let coef_b = -3.0 * pyl * w_mass / ptl;
    let coef_c = w2 * (2.0 * pyl * pyl) / ptl2 + w2
        - 4.0 * pxl2 * pxl * met_px / ptl2
        - 4.0 * pxl2 * pyl * met_py / ptl2;
    let coef_d = 4.0 * pxl2 * w_mass * met_py / ptl - pyl * w2 * w_mass / ptl;

    // Each branch of the curve gets its own cubic; the sign enters p_y below.
    let branches = [
        (solve_cubic(1.0, coef_b, coef_c, coef_d)?, -1.0),
        (solve_cubic(1.0, -coef_b, coef_c, -coef_d)?, 1.0),
    ];

    let mut delta_min = NO_CANDIDATE;
    let mut best = (0.0, 0.0);
    for (roots, sign) in &branches {
        for &x in roots {
            if x < 0.0 {
                continue;
            }
            let px = (x * x - w2) / (4.0 * pxl);
            let py = (w2 * pyl + 2.0 * pxl * pyl * px + sign * w_mass * ptl * x) / (2.0 * pxl2);
            let d2 = (px - met_px).powi(2) + (py - met_py).powi(2);
            if d2 < delta_min && d2 > 0.0 {
                delta_min = d2;
                best = (px, py);
            }
        }
    }

    if delta_min == NO_CANDIDATE {
        return Ok(None);
    }

    let zero_px = -w2 / (4.0 * pxl);
    // Not divided by 2·px(ℓ)², unlike the branch candidates above.
    let zero_py = w2 * pxl + 2.0 * pxl * pyl * zero_px;
    let d2_zero = (zero_px - met_px).powi(2) + (zero_py - met_py).powi(2);
    if d2_zero < delta_min {
        best = (zero_px, zero_py);
    }

    Ok(Some(best))
}
