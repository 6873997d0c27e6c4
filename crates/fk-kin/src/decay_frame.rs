//! Decay angles of a lepton + neutrino + companion system in its own rest frame.
//!
//! The basis is built in the three-body rest frame: `z` along the boosted
//! lepton+neutrino pair, `y = z × n̂` with `n̂` the lab direction of the whole
//! system, `x = y × z`. The lepton azimuth in that basis, shifted by π for
//! non-positive charge, is the signed angle [`DecayFrame::phi`].

use std::f64::consts::{FRAC_PI_2, PI};

use fk_core::{Error, FourMomentum, Result, map_angle_m_pi_pi};
use nalgebra::{Matrix3, Vector3};

/// Vectors shorter than this cannot define an axis.
const MIN_AXIS_NORM: f64 = 1e-12;

/// The three constituents and the lepton+neutrino pair, in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constituents {
    /// Charged lepton.
    pub lepton: FourMomentum,
    /// Neutrino.
    pub neutrino: FourMomentum,
    /// Photon or second lepton.
    pub companion: FourMomentum,
    /// Lepton + neutrino.
    pub pair: FourMomentum,
}

impl Constituents {
    fn map(&self, f: impl Fn(&FourMomentum) -> FourMomentum) -> Self {
        Self {
            lepton: f(&self.lepton),
            neutrino: f(&self.neutrino),
            companion: f(&self.companion),
            pair: f(&self.pair),
        }
    }
}

/// Rest frame of a lepton + neutrino + companion system.
#[derive(Debug, Clone)]
pub struct DecayFrame {
    charge: i32,
    system: FourMomentum,
    rest: Constituents,
    rotated: Constituents,
    basis: Matrix3<f64>,
}

fn unit(v: Vector3<f64>, what: &str) -> Result<Vector3<f64>> {
    let n = v.norm();
    if !n.is_finite() || n < MIN_AXIS_NORM {
        return Err(Error::Validation(format!("degenerate decay frame: {what} has norm {n}")));
    }
    Ok(v / n)
}

impl DecayFrame {
    /// Build the frame from lab-frame momenta.
    ///
    /// Fails when the system is not timelike, is at rest in the lab, or when
    /// the pair direction is collinear with the system direction.
    pub fn new(
        lepton: &FourMomentum,
        charge: i32,
        neutrino: &FourMomentum,
        companion: &FourMomentum,
    ) -> Result<Self> {
        let system = *lepton + *neutrino + *companion;
        if !(system.e > 0.0 && system.mass2() > 0.0) {
            return Err(Error::Validation(format!(
                "degenerate decay frame: system is not timelike (m² = {}, E = {})",
                system.mass2(),
                system.e
            )));
        }

        let beta = system.beta_vec();
        let lab = Constituents { lepton: *lepton, neutrino: *neutrino, companion: *companion, pair: *lepton + *neutrino };
        let mut rest = lab.map(|p| p.boost(&beta));
        rest.pair = rest.lepton + rest.neutrino;

        let n_hat = unit(system.vector3(), "system momentum")?;
        let z = unit(rest.pair.vector3(), "lepton+neutrino momentum")?;
        let y = unit(z.cross(&n_hat), "z × system direction")?;
        let x = unit(y.cross(&z), "y × z")?;
        let basis = Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);

        let rotated = rest.map(|p| p.rotate(&basis));
        Ok(Self { charge, system, rest, rotated, basis })
    }

    /// Signed lepton azimuth in (−π, π].
    pub fn phi(&self) -> f64 {
        let lep_phi = self.rotated.lepton.phi();
        if self.charge > 0 { lep_phi } else { map_angle_m_pi_pi(lep_phi + PI) }
    }

    /// `phi` reflected about ±π/2, keeping its sign; in [−π/2, π/2].
    pub fn folded_phi_signed(&self) -> f64 {
        fold_phi(self.phi())
    }

    /// Magnitude of the folded angle, in [0, π/2].
    pub fn folded_phi(&self) -> f64 {
        self.folded_phi_signed().abs()
    }

    /// Lepton charge the frame was built with.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Lab-frame sum of the three constituents.
    pub fn system(&self) -> &FourMomentum {
        &self.system
    }

    /// Constituents boosted into the system rest frame.
    pub fn rest_frame(&self) -> &Constituents {
        &self.rest
    }

    /// Constituents in the rotated rest-frame basis.
    pub fn rotated(&self) -> &Constituents {
        &self.rotated
    }

    /// Basis matrix; rows are the x, y and z axes.
    pub fn basis(&self) -> &Matrix3<f64> {
        &self.basis
    }
}

/// Reflect an angle in (−π, π] about ±π/2 into [−π/2, π/2].
pub fn fold_phi(phi: f64) -> f64 {
    if phi > FRAC_PI_2 {
        PI - phi
    } else if phi < -FRAC_PI_2 {
        -(PI + phi)
    } else {
        phi
    }
}

/// Cosine of the angle between `a` and `b` in the rest frame of `parent`.
pub fn polarization_cosine(parent: &FourMomentum, a: &FourMomentum, b: &FourMomentum) -> Result<f64> {
    if !(parent.e > 0.0 && parent.mass2() > 0.0) {
        return Err(Error::Validation(format!(
            "polarization angle needs a timelike parent (m² = {})",
            parent.mass2()
        )));
    }
    let ua = unit(a.boost_to_rest_frame_of(parent).vector3(), "first direction")?;
    let ub = unit(b.boost_to_rest_frame_of(parent).vector3(), "second direction")?;
    Ok(ua.dot(&ub).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Rotation3;
    use proptest::prelude::*;

    fn lepton() -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(45.0, 0.4, 0.3, 0.0)
    }

    fn neutrino() -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(38.0, -0.7, 2.6, 0.0)
    }

    fn photon() -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(60.0, 1.1, -1.9, 0.0)
    }

    fn angle_diff(a: f64, b: f64) -> f64 {
        map_angle_m_pi_pi(a - b).abs()
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let f = DecayFrame::new(&lepton(), 1, &neutrino(), &photon()).unwrap();
        let b = f.basis();
        assert_abs_diff_eq!((b * b.transpose() - Matrix3::identity()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rest_frame_is_at_rest() {
        let f = DecayFrame::new(&lepton(), 1, &neutrino(), &photon()).unwrap();
        let r = f.rest_frame();
        let total = r.lepton + r.neutrino + r.companion;
        assert_abs_diff_eq!(total.vector3().norm(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(total.mass(), f.system().mass(), epsilon = 1e-9);
        // pair lies along +z after rotation
        let pair = f.rotated().pair;
        assert_abs_diff_eq!(pair.pt(), 0.0, epsilon = 1e-9);
        assert!(pair.pz > 0.0);
    }

    #[test]
    fn test_charge_flip_shifts_phi_by_pi() {
        let plus = DecayFrame::new(&lepton(), 1, &neutrino(), &photon()).unwrap();
        let minus = DecayFrame::new(&lepton(), -1, &neutrino(), &photon()).unwrap();
        assert_abs_diff_eq!(angle_diff(plus.phi(), minus.phi()), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(plus.folded_phi(), minus.folded_phi(), epsilon = 1e-12);
    }

    #[test]
    fn test_invariant_under_common_rotation() {
        let rot = Rotation3::from_euler_angles(0.3, -1.2, 2.0);
        let m = rot.matrix();
        let f = DecayFrame::new(&lepton(), 1, &neutrino(), &photon()).unwrap();
        let g = DecayFrame::new(&lepton().rotate(m), 1, &neutrino().rotate(m), &photon().rotate(m))
            .unwrap();
        assert_abs_diff_eq!(angle_diff(f.phi(), g.phi()), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invariant_under_boost_along_system() {
        let f = DecayFrame::new(&lepton(), -1, &neutrino(), &photon()).unwrap();
        let dir = f.system().vector3().normalize();
        // frame moving against the system keeps its lab direction
        let beta = dir * -0.6;
        let g = DecayFrame::new(
            &lepton().boost(&beta),
            -1,
            &neutrino().boost(&beta),
            &photon().boost(&beta),
        )
        .unwrap();
        assert_abs_diff_eq!(angle_diff(f.phi(), g.phi()), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.folded_phi(), g.folded_phi(), epsilon = 1e-9);
    }

    #[test]
    fn test_fold_phi() {
        assert_abs_diff_eq!(fold_phi(0.3), 0.3);
        assert_abs_diff_eq!(fold_phi(2.5), PI - 2.5);
        assert_abs_diff_eq!(fold_phi(-2.5), -(PI - 2.5));
        assert_abs_diff_eq!(fold_phi(PI), 0.0);
        assert_abs_diff_eq!(fold_phi(FRAC_PI_2), FRAC_PI_2);
    }

    #[test]
    fn test_system_at_rest_rejected() {
        let a = FourMomentum::new(10.0, 0.0, 0.0, 10.0);
        let b = FourMomentum::new(-5.0, 5.0, 0.0, 50.0f64.sqrt());
        let c = FourMomentum::new(-5.0, -5.0, 0.0, 50.0f64.sqrt());
        assert!(DecayFrame::new(&a, 1, &b, &c).is_err());
    }

    #[test]
    fn test_collinear_pair_rejected() {
        // all along x: the pair and the system point the same way
        let a = FourMomentum::new(10.0, 0.0, 0.0, 10.0);
        let b = FourMomentum::new(20.0, 0.0, 0.0, 20.0);
        let c = FourMomentum::new(-5.0, 0.0, 0.0, 5.0);
        assert!(DecayFrame::new(&a, 1, &b, &c).is_err());
    }

    #[test]
    fn test_polarization_cosine() {
        let top = FourMomentum::new(30.0, 10.0, 80.0, 200.0);
        let lep = FourMomentum::from_pt_eta_phi_m(50.0, 0.5, 0.2, 0.0);
        let spec = FourMomentum::from_pt_eta_phi_m(60.0, 2.5, -2.0, 0.0);
        let cos = polarization_cosine(&top, &lep, &spec).unwrap();
        assert!((-1.0..=1.0).contains(&cos));
        assert_abs_diff_eq!(polarization_cosine(&top, &lep, &lep).unwrap(), 1.0, epsilon = 1e-12);
        assert!(polarization_cosine(&FourMomentum::new(1.0, 0.0, 0.0, 1.0), &lep, &spec).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn prop_folded_phi_in_range(
            pt in proptest::array::uniform3(5.0f64..500.0),
            eta in proptest::array::uniform3(-3.0f64..3.0),
            phi in proptest::array::uniform3(-3.1f64..3.1),
            charge in prop_oneof![Just(-1i32), Just(1i32)],
        ) {
            let p: Vec<FourMomentum> = (0..3)
                .map(|i| FourMomentum::from_pt_eta_phi_m(pt[i], eta[i], phi[i], 0.0))
                .collect();
            let frame = DecayFrame::new(&p[0], charge, &p[1], &p[2]);
            prop_assume!(frame.is_ok());
            let frame = frame.unwrap();
            let folded = frame.folded_phi();
            prop_assert!((0.0..=FRAC_PI_2).contains(&folded), "folded = {}", folded);
            prop_assert!(frame.phi() > -PI && frame.phi() <= PI);
        }
    }
}
