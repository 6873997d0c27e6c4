//! Core traits for fidkin
//!
//! [`EventView`] is the read-only capability set an analysis sees for one event.
//! Analyses never look objects up by name; each object category has its own
//! typed accessor, so the reconstruction layer can be swapped (owned JSON
//! records, a generator binding, a test fixture) without touching selections.

use crate::types::Particle;
use crate::vector::FourMomentum;

/// Read-only view of one reconstructed event.
pub trait EventView {
    /// Charged leptons (dressed where the producer supports it).
    fn leptons(&self) -> &[Particle];

    /// Prompt photons not consumed by lepton dressing.
    fn photons(&self) -> &[Particle];

    /// Jets (four-momenta only).
    fn jets(&self) -> &[FourMomentum];

    /// Prompt neutrinos.
    fn neutrinos(&self) -> &[Particle];

    /// Missing transverse momentum with `pz = 0` and `E = |pT|`.
    fn missing_momentum(&self) -> FourMomentum;

    /// Particles entering photon isolation sums.
    fn isolation_particles(&self) -> &[Particle] {
        &[]
    }

    /// Outgoing hard-process partons (alternative isolation source).
    fn outgoing_partons(&self) -> &[Particle] {
        &[]
    }

    /// Partonic top quarks.
    fn partonic_tops(&self) -> &[Particle] {
        &[]
    }

    /// Event weight.
    fn weight(&self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LeptonOnly(Vec<Particle>);

    impl EventView for LeptonOnly {
        fn leptons(&self) -> &[Particle] {
            &self.0
        }

        fn photons(&self) -> &[Particle] {
            &[]
        }

        fn jets(&self) -> &[FourMomentum] {
            &[]
        }

        fn neutrinos(&self) -> &[Particle] {
            &[]
        }

        fn missing_momentum(&self) -> FourMomentum {
            FourMomentum::ZERO
        }
    }

    #[test]
    fn test_default_accessors() {
        let lep = Particle::new(FourMomentum::new(30.0, 0.0, 0.0, 30.0), 13, 1);
        let ev = LeptonOnly(vec![lep]);
        assert_eq!(ev.leptons().len(), 1);
        assert!(ev.isolation_particles().is_empty());
        assert!(ev.partonic_tops().is_empty());
        assert_eq!(ev.weight(), 1.0);
    }
}
