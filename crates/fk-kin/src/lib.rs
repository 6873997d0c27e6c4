//! # fk-kin
//!
//! Reconstruction of quantities that are not measured directly:
//! - real roots of cubics ([`solve_cubic`])
//! - the neutrino longitudinal momentum under a W-mass constraint
//! - decay angles of a lepton + neutrino + companion system in its rest frame

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Cardano cubic solver.
pub mod cubic;
/// Rest-frame basis and decay angles.
pub mod decay_frame;
/// W-mass-constrained neutrino pz.
pub mod neutrino;

pub use cubic::solve_cubic;
pub use decay_frame::{Constituents, DecayFrame, fold_phi, polarization_cosine};
pub use neutrino::{
    NeutrinoSolutionKind, NeutrinoSolutions, W_MASS, reconstruct_neutrino_pz,
    reconstruct_neutrino_pz_with_mass,
};
