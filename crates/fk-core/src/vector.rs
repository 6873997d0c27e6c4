//! Four-momentum algebra: boosts, rotations and azimuthal-angle mapping.
//!
//! Components are stored as `(px, py, pz, e)` in GeV. Spatial parts are exposed as
//! `nalgebra::Vector3<f64>` so callers can build frames with `cross`/`normalize`.

use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Neg, Sub};

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Lorentz four-momentum `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    /// x-component of the momentum.
    pub px: f64,
    /// y-component of the momentum.
    pub py: f64,
    /// z-component (beam axis) of the momentum.
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// The all-zero vector. Also used as the "no solution" sentinel by reconstructions.
    pub const ZERO: FourMomentum = FourMomentum { px: 0.0, py: 0.0, pz: 0.0, e: 0.0 };

    /// Create from Cartesian components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Create from transverse momentum, pseudorapidity, azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self { px, py, pz, e }
    }

    /// Create from a spatial 3-vector and an energy.
    pub fn from_vector3(p: &Vector3<f64>, e: f64) -> Self {
        Self { px: p.x, py: p.y, pz: p.z, e }
    }

    /// Spatial part.
    pub fn vector3(&self) -> Vector3<f64> {
        Vector3::new(self.px, self.py, self.pz)
    }

    /// True if every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.px == 0.0 && self.py == 0.0 && self.pz == 0.0 && self.e == 0.0
    }

    /// Squared transverse momentum.
    pub fn pt2(&self) -> f64 {
        self.px * self.px + self.py * self.py
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    /// Squared 3-momentum magnitude.
    pub fn p2(&self) -> f64 {
        self.pt2() + self.pz * self.pz
    }

    /// 3-momentum magnitude.
    pub fn p(&self) -> f64 {
        self.p2().sqrt()
    }

    /// Invariant mass squared `E² - |p|²` (may be slightly negative from roundoff).
    pub fn mass2(&self) -> f64 {
        self.e * self.e - self.p2()
    }

    /// Invariant mass; 0 for spacelike vectors.
    pub fn mass(&self) -> f64 {
        let m2 = self.mass2();
        if m2 > 0.0 { m2.sqrt() } else { 0.0 }
    }

    /// Pseudorapidity `asinh(pz / pt)`. Returns `±inf` along the beam, 0 for the null vector.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            if self.pz == 0.0 {
                return 0.0;
            }
            return f64::INFINITY.copysign(self.pz);
        }
        (self.pz / pt).asinh()
    }

    /// Rapidity `0.5 * ln((E + pz) / (E - pz))`.
    pub fn rapidity(&self) -> f64 {
        let num = self.e + self.pz;
        let den = self.e - self.pz;
        if den <= 0.0 {
            return f64::INFINITY;
        }
        if num <= 0.0 {
            return f64::NEG_INFINITY;
        }
        0.5 * (num / den).ln()
    }

    /// Absolute rapidity.
    pub fn abs_rapidity(&self) -> f64 {
        self.rapidity().abs()
    }

    /// Azimuthal angle in (-π, π]; 0 when the transverse momentum vanishes.
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            return 0.0;
        }
        map_angle_m_pi_pi(self.py.atan2(self.px))
    }

    /// Velocity `p / E` of the frame in which this vector is at rest.
    pub fn beta_vec(&self) -> Vector3<f64> {
        if self.e == 0.0 {
            return Vector3::zeros();
        }
        self.vector3() / self.e
    }

    /// Transform into the frame moving with 3-velocity `beta` (|beta| < 1).
    ///
    /// `p.boost(&b).boost(&-b) == p` up to roundoff, and the invariant mass is preserved.
    pub fn boost(&self, beta: &Vector3<f64>) -> Self {
        let b2 = beta.norm_squared();
        if b2 == 0.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let p = self.vector3();
        let bp = beta.dot(&p);
        let k = (gamma - 1.0) / b2 * bp - gamma * self.e;
        let p_new = p + beta * k;
        Self::from_vector3(&p_new, gamma * (self.e - bp))
    }

    /// Transform into the rest frame of `parent`.
    pub fn boost_to_rest_frame_of(&self, parent: &FourMomentum) -> Self {
        self.boost(&parent.beta_vec())
    }

    /// Express the spatial part in the orthonormal basis whose rows are the new axes.
    pub fn rotate(&self, basis: &Matrix3<f64>) -> Self {
        Self::from_vector3(&(basis * self.vector3()), self.e)
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.px + rhs.px, self.py + rhs.py, self.pz + rhs.pz, self.e + rhs.e)
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FourMomentum {
    type Output = FourMomentum;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.px - rhs.px, self.py - rhs.py, self.pz - rhs.pz, self.e - rhs.e)
    }
}

impl Neg for FourMomentum {
    type Output = FourMomentum;

    fn neg(self) -> Self {
        Self::new(-self.px, -self.py, -self.pz, -self.e)
    }
}

impl std::iter::Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourMomentum::ZERO, |acc, p| acc + p)
    }
}

/// Map an angle into (-π, π].
#[inline]
pub fn map_angle_m_pi_pi(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Absolute azimuthal separation in [0, π].
#[inline]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    map_angle_m_pi_pi(phi1 - phi2).abs()
}

/// Angular separation `sqrt(Δη² + Δφ²)` using pseudorapidity.
pub fn delta_r(a: &FourMomentum, b: &FourMomentum) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a.phi(), b.phi());
    (deta * deta + dphi * dphi).sqrt()
}
