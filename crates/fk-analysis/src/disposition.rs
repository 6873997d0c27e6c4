//! What happened to an event, and why.

use serde::{Deserialize, Serialize};

/// Reason an event did not enter the main selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoReason {
    /// No charged lepton candidate.
    NoLepton,
    /// No photon candidate separated from the lepton.
    NoPhoton,
    /// No neutrino candidate.
    NoNeutrino,
    /// Wrong number of leptons.
    LeptonMultiplicity,
    /// Leptons of the same flavour.
    SameFlavour,
    /// Leptons of the same charge.
    SameCharge,
    /// Wrong number of partonic tops.
    TopMultiplicity,
    /// Wrong number of selected jets.
    JetMultiplicity,
    /// Leading jet above the veto threshold.
    JetVeto,
    /// No jet gives a top candidate closer to the top mass than the zero vector.
    NoTopCandidate,
    /// Neutrino reconstruction found no candidate.
    NeutrinoUnsolved,
    /// Reconstruction inputs violated a precondition.
    DegenerateKinematics,
    /// Objects found but no region accepted the event.
    Kinematic,
}

impl VetoReason {
    /// Short name used in logs and the cut flow.
    pub fn as_str(self) -> &'static str {
        match self {
            VetoReason::NoLepton => "no_lepton",
            VetoReason::NoPhoton => "no_photon",
            VetoReason::NoNeutrino => "no_neutrino",
            VetoReason::LeptonMultiplicity => "lepton_multiplicity",
            VetoReason::SameFlavour => "same_flavour",
            VetoReason::SameCharge => "same_charge",
            VetoReason::TopMultiplicity => "top_multiplicity",
            VetoReason::JetMultiplicity => "jet_multiplicity",
            VetoReason::JetVeto => "jet_veto",
            VetoReason::NoTopCandidate => "no_top_candidate",
            VetoReason::NeutrinoUnsolved => "neutrino_unsolved",
            VetoReason::DegenerateKinematics => "degenerate_kinematics",
            VetoReason::Kinematic => "kinematic",
        }
    }
}

impl std::fmt::Display for VetoReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of analysing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The event filled at least one accumulator of the main selection.
    Accepted,
    /// The event was excluded from the main selection.
    Vetoed(VetoReason),
}

impl Disposition {
    /// True for [`Disposition::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Disposition::Accepted)
    }

    /// The veto reason, if any.
    pub fn veto_reason(&self) -> Option<VetoReason> {
        match self {
            Disposition::Accepted => None,
            Disposition::Vetoed(r) => Some(*r),
        }
    }
}

impl From<VetoReason> for Disposition {
    fn from(r: VetoReason) -> Self {
        Disposition::Vetoed(r)
    }
}
