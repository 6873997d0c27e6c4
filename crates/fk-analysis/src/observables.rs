//! Per-event observable records.
//!
//! Each record is built fresh for one event, filled by the selection stage and
//! consumed by the routing stage; nothing survives to the next event.

use serde::Serialize;

/// W(ℓν)γ observables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WGammaObservables {
    /// Leading lepton pt.
    pub l0_pt: f64,
    /// Leading lepton η.
    pub l0_eta: f64,
    /// Leading lepton φ.
    pub l0_phi: f64,
    /// Leading lepton mass.
    pub l0_mass: f64,
    /// Leading lepton charge.
    pub l0_charge: i32,
    /// Leading lepton |PDG id|.
    pub l0_abs_pid: i32,

    /// Leading photon pt.
    pub p0_pt: f64,
    /// Leading photon η.
    pub p0_eta: f64,
    /// Leading photon φ.
    pub p0_phi: f64,
    /// Leading photon mass.
    pub p0_mass: f64,
    /// Frixione isolation passed.
    pub p0_frixione: bool,
    /// pt summed in the isolation cone.
    pub p0_frixione_sum: f64,

    /// Leading neutrino pt.
    pub n0_pt: f64,
    /// Leading neutrino η.
    pub n0_eta: f64,
    /// Leading neutrino φ.
    pub n0_phi: f64,
    /// Leading neutrino mass.
    pub n0_mass: f64,

    /// Missing transverse momentum.
    pub met_pt: f64,
    /// Missing transverse momentum azimuth.
    pub met_phi: f64,

    /// ΔR(ℓ, γ).
    pub l0p0_dr: f64,
    /// η(ℓ) − η(γ).
    pub l0p0_deta: f64,
    /// Cluster transverse mass of ℓ, γ and MET.
    pub mt_cluster: f64,
    /// Selected jets.
    pub n_jets: usize,

    /// Signed decay angle; `None` when the decay frame is degenerate.
    pub true_phi: Option<f64>,
    /// Folded decay angle in [0, π/2]; `None` when the decay frame is degenerate.
    pub true_phi_f: Option<f64>,
}

/// WW → eμ observables of the leading lepton pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DibosonObservables {
    /// Leading lepton pt.
    pub lead_pt: f64,
    /// Dilepton mass.
    pub mll: f64,
    /// Dilepton pt.
    pub ptll: f64,
    /// Dilepton |y|.
    pub yll: f64,
    /// |Δφ| between the leptons.
    pub dphill: f64,
    /// |tanh(Δη/2)|.
    pub costhetastar: f64,
    /// Leading selected jet pt, if any jet passed.
    pub lead_jet_pt: Option<f64>,
}

/// t-channel single-top observables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SingleTopObservables {
    /// Reconstructed top pt.
    pub top_pt: f64,
    /// Reconstructed top |y|.
    pub top_abs_y: f64,
    /// Lepton pt.
    pub lepton_pt: f64,
    /// Lepton |y|.
    pub lepton_abs_y: f64,
    /// Reconstructed W pt.
    pub w_pt: f64,
    /// cos(lepton, spectator jet) in the top rest frame.
    pub polarization_cos: f64,
    /// Partonic top charge sign.
    pub top_charge: i32,
}
