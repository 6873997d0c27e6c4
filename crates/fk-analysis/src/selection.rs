//! Object selection and event-level kinematic helpers shared by the analyses.

use fk_core::{FourMomentum, Particle, delta_phi, delta_r};
use serde::{Deserialize, Serialize};

/// Copy of `particles` sorted by descending pt.
pub fn sorted_by_pt(particles: &[Particle]) -> Vec<Particle> {
    let mut out = particles.to_vec();
    out.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
    out
}

/// Highest-pt particle, if any.
pub fn leading(particles: &[Particle]) -> Option<Particle> {
    particles.iter().copied().max_by(|a, b| a.pt().total_cmp(&b.pt()))
}

/// Highest-pt particle with ΔR > `dr_min` from `reference`.
pub fn leading_isolated_from(
    particles: &[Particle],
    reference: &FourMomentum,
    dr_min: f64,
) -> Option<Particle> {
    particles
        .iter()
        .filter(|p| delta_r(&p.momentum, reference) > dr_min)
        .copied()
        .max_by(|a, b| a.pt().total_cmp(&b.pt()))
}

/// Jet acceptance and overlap removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JetCuts {
    /// Minimum pt (exclusive).
    pub pt_min: f64,
    /// Maximum |η| (exclusive).
    pub abs_eta_max: f64,
    /// Minimum ΔR to every avoided object (exclusive).
    pub dr_min: f64,
}

impl Default for JetCuts {
    fn default() -> Self {
        Self { pt_min: 30.0, abs_eta_max: 2.5, dr_min: 0.4 }
    }
}

/// Jets passing `cuts` and separated from every object in `avoid`, by descending pt.
pub fn select_jets(jets: &[FourMomentum], cuts: &JetCuts, avoid: &[FourMomentum]) -> Vec<FourMomentum> {
    let mut out: Vec<FourMomentum> = jets
        .iter()
        .filter(|j| j.pt() > cuts.pt_min && j.eta().abs() < cuts.abs_eta_max)
        .filter(|j| avoid.iter().all(|a| delta_r(j, a) > cuts.dr_min))
        .copied()
        .collect();
    out.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
    out
}

/// Outcome of a Frixione isolation scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isolation {
    /// False if the running sum ever exceeded the envelope.
    pub passed: bool,
    /// pt summed inside the cone.
    pub sum: f64,
}

/// Frixione isolation of `photon` against `candidates` with cone radius `cone`.
///
/// Candidates are scanned by ascending ΔR; the scan stops at the first one
/// with ΔR ≥ `cone`. After each added candidate the running pt sum must not
/// exceed `pt_γ · (1 − cos ΔR) / (1 − cos cone)`.
pub fn frixione_isolation<I>(photon: &FourMomentum, candidates: I, cone: f64) -> Isolation
where
    I: IntoIterator<Item = FourMomentum>,
{
    let mut by_dr: Vec<(f64, FourMomentum)> =
        candidates.into_iter().map(|c| (delta_r(&c, photon), c)).collect();
    by_dr.sort_by(|a, b| a.0.total_cmp(&b.0));

    let norm = 1.0 - cone.cos();
    let mut iso = Isolation { passed: true, sum: 0.0 };
    for (dr, c) in by_dr {
        if dr >= cone {
            break;
        }
        iso.sum += c.pt();
        if iso.sum > photon.pt() * (1.0 - dr.cos()) / norm {
            iso.passed = false;
        }
    }
    iso
}

/// Cluster transverse mass of a visible system `a + b` and the missing momentum.
///
/// `mT² = (√(m²_ab + pt²_ab) + MET)² − pt²(a + b + met)`, clamped at zero.
pub fn mt_cluster(a: &FourMomentum, b: &FourMomentum, met: &FourMomentum) -> f64 {
    let visible = *a + *b;
    let full = visible + *met;
    let et = (visible.mass2() + visible.pt2()).sqrt() + met.pt();
    let mt2 = et * et - full.pt2();
    if mt2 > 0.0 { mt2.sqrt() } else { 0.0 }
}

/// `|tanh(Δη / 2)|`, the cos θ* proxy for a two-body system.
pub fn cos_theta_star(eta1: f64, eta2: f64) -> f64 {
    ((eta1 - eta2) / 2.0).tanh().abs()
}

/// Kinematics of a two-object system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairKinematics {
    /// Invariant mass.
    pub mass: f64,
    /// Transverse momentum of the sum.
    pub pt: f64,
    /// |rapidity| of the sum.
    pub abs_rapidity: f64,
    /// |Δφ| between the two.
    pub delta_phi: f64,
    /// [`cos_theta_star`] of the two.
    pub cos_theta_star: f64,
}

impl PairKinematics {
    /// Compute from two four-momenta.
    pub fn new(a: &FourMomentum, b: &FourMomentum) -> Self {
        let sum = *a + *b;
        Self {
            mass: sum.mass(),
            pt: sum.pt(),
            abs_rapidity: sum.abs_rapidity(),
            delta_phi: delta_phi(a.phi(), b.phi()),
            cos_theta_star: cos_theta_star(a.eta(), b.eta()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(pt: f64, eta: f64, phi: f64, pid: i32) -> Particle {
        Particle::new(FourMomentum::from_pt_eta_phi_m(pt, eta, phi, 0.0), pid, 0)
    }

    #[test]
    fn test_sorted_and_leading() {
        let ps = vec![p(10.0, 0.0, 0.0, 11), p(50.0, 0.0, 1.0, 11), p(30.0, 0.0, 2.0, 11)];
        let s = sorted_by_pt(&ps);
        assert_relative_eq!(s[0].pt(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(s[2].pt(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(leading(&ps).unwrap().pt(), 50.0, epsilon = 1e-9);
        assert!(leading(&[]).is_none());
    }

    #[test]
    fn test_leading_isolated_from() {
        let lep = FourMomentum::from_pt_eta_phi_m(40.0, 0.0, 0.0, 0.0);
        let photons = vec![p(100.0, 0.0, 0.3, 22), p(35.0, 0.0, 1.0, 22)];
        let chosen = leading_isolated_from(&photons, &lep, 0.7).unwrap();
        assert_relative_eq!(chosen.pt(), 35.0, epsilon = 1e-9);
        assert!(leading_isolated_from(&photons[..1], &lep, 0.7).is_none());
    }

    #[test]
    fn test_select_jets() {
        let lep = FourMomentum::from_pt_eta_phi_m(40.0, 0.0, 0.0, 0.0);
        let jets = vec![
            FourMomentum::from_pt_eta_phi_m(45.0, 0.0, 0.2, 5.0), // overlaps lepton
            FourMomentum::from_pt_eta_phi_m(25.0, 0.0, 2.0, 5.0), // soft
            FourMomentum::from_pt_eta_phi_m(60.0, 3.0, 2.0, 5.0), // forward
            FourMomentum::from_pt_eta_phi_m(35.0, 1.0, -2.0, 5.0),
            FourMomentum::from_pt_eta_phi_m(80.0, -1.0, 2.5, 5.0),
        ];
        let sel = select_jets(&jets, &JetCuts::default(), &[lep]);
        assert_eq!(sel.len(), 2);
        assert!(sel[0].pt() > sel[1].pt());
    }

    #[test]
    fn test_frixione_boundary_excluded() {
        let photon = FourMomentum::from_pt_eta_phi_m(50.0, 0.0, 0.0, 0.0);
        let at_edge = FourMomentum::from_pt_eta_phi_m(500.0, 0.0, 0.4, 0.0);
        let cone = delta_r(&at_edge, &photon);
        let iso = frixione_isolation(&photon, [at_edge], cone);
        assert!(iso.passed);
        assert_eq!(iso.sum, 0.0);
    }

    #[test]
    fn test_frixione_scan_order_and_failure() {
        let photon = FourMomentum::from_pt_eta_phi_m(100.0, 0.0, 0.0, 0.0);
        let near_soft = FourMomentum::from_pt_eta_phi_m(0.5, 0.0, 0.2, 0.0);
        let far = FourMomentum::from_pt_eta_phi_m(1000.0, 0.0, 1.0, 0.0);
        let iso = frixione_isolation(&photon, [far, near_soft], 0.4);
        // envelope at ΔR = 0.2: 100 · (1 − cos 0.2) / (1 − cos 0.4) ≈ 25.2
        assert!(iso.passed);
        assert_relative_eq!(iso.sum, 0.5, epsilon = 1e-9);

        let near_hard = FourMomentum::from_pt_eta_phi_m(30.0, 0.0, 0.2, 0.0);
        let iso = frixione_isolation(&photon, [near_hard], 0.4);
        assert!(!iso.passed);
    }

    #[test]
    fn test_mt_cluster() {
        // massless back-to-back lepton and photon with no MET: visible pt is zero
        let l = FourMomentum::from_pt_eta_phi_m(40.0, 0.0, 0.0, 0.0);
        let g = FourMomentum::from_pt_eta_phi_m(40.0, 0.0, std::f64::consts::PI, 0.0);
        let met = FourMomentum::ZERO;
        assert_relative_eq!(mt_cluster(&l, &g, &met), 80.0, epsilon = 1e-9);

        // collinear massless objects with collinear MET: mT = 0
        let l = FourMomentum::from_pt_eta_phi_m(30.0, 0.0, 0.0, 0.0);
        let g = FourMomentum::from_pt_eta_phi_m(20.0, 0.0, 0.0, 0.0);
        let met = FourMomentum::new(10.0, 0.0, 0.0, 10.0);
        assert_eq!(mt_cluster(&l, &g, &met), 0.0);
    }

    #[test]
    fn test_pair_kinematics() {
        let a = FourMomentum::from_pt_eta_phi_m(40.0, 1.0, 0.5, 0.0);
        let b = FourMomentum::from_pt_eta_phi_m(30.0, -0.5, -2.5, 0.0);
        let k = PairKinematics::new(&a, &b);
        assert_relative_eq!(k.delta_phi, 3.0, epsilon = 1e-9);
        assert_relative_eq!(k.cos_theta_star, (0.75f64).tanh(), epsilon = 1e-10);
        assert_relative_eq!(k.mass, (a + b).mass(), epsilon = 1e-12);
        assert!(k.abs_rapidity >= 0.0);
    }
}
