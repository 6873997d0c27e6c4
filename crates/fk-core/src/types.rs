//! Common data types for fidkin: reconstructed particles and the owned event record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::EventView;
use crate::vector::FourMomentum;

/// Coarse particle species derived from the PDG id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// e±
    Electron,
    /// μ±
    Muon,
    /// τ±
    Tau,
    /// Any neutrino flavour.
    Neutrino,
    /// γ
    Photon,
    /// Quarks and gluons.
    Parton,
    /// Top quark (partonic).
    Top,
    /// Anything else (hadrons, unknown ids).
    Other,
}

impl Species {
    /// Classify a PDG id.
    pub fn from_pdg_id(pid: i32) -> Self {
        match pid.abs() {
            11 => Species::Electron,
            13 => Species::Muon,
            15 => Species::Tau,
            12 | 14 | 16 => Species::Neutrino,
            22 => Species::Photon,
            6 => Species::Top,
            1..=5 | 21 => Species::Parton,
            _ => Species::Other,
        }
    }

    /// True for electrons and muons.
    pub fn is_light_lepton(self) -> bool {
        matches!(self, Species::Electron | Species::Muon)
    }
}

/// A reconstructed final-state object as handed over by the reconstruction layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Kinematics.
    pub momentum: FourMomentum,
    /// PDG id (signed).
    #[serde(default)]
    pub pid: i32,
    /// Electric charge in units of e.
    #[serde(default)]
    pub charge: i32,
    /// Not from a hadron decay.
    #[serde(default = "default_true")]
    pub is_prompt: bool,
    /// Descends from a τ decay.
    #[serde(default)]
    pub from_tau: bool,
}

fn default_true() -> bool {
    true
}

impl Particle {
    /// A prompt particle with the given kinematics, id and charge.
    pub fn new(momentum: FourMomentum, pid: i32, charge: i32) -> Self {
        Self { momentum, pid, charge, is_prompt: true, from_tau: false }
    }

    /// Species from the PDG id.
    pub fn species(&self) -> Species {
        Species::from_pdg_id(self.pid)
    }

    /// |PDG id|
    pub fn abs_pid(&self) -> i32 {
        self.pid.abs()
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.momentum.pt()
    }

    /// Pseudorapidity.
    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }

    /// Azimuth in (-π, π].
    pub fn phi(&self) -> f64 {
        self.momentum.phi()
    }
}

/// Owned event record, deserializable from JSON.
///
/// Object lists need not be sorted; analyses sort by descending pt themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Dressed (or bare prompt) charged leptons.
    pub leptons: Vec<Particle>,
    /// Prompt photons not used for lepton dressing.
    pub photons: Vec<Particle>,
    /// Clustered jets.
    pub jets: Vec<FourMomentum>,
    /// Prompt neutrinos.
    pub neutrinos: Vec<Particle>,
    /// Missing transverse momentum `(px, py)`.
    pub met: [f64; 2],
    /// Non-prompt final-state particles used for photon isolation.
    pub isolation_particles: Vec<Particle>,
    /// Outgoing hard-process partons.
    pub outgoing_partons: Vec<Particle>,
    /// Partonic top quarks.
    pub partonic_tops: Vec<Particle>,
    /// Event weights; the first entry is the nominal one.
    pub weights: Vec<f64>,
}

impl Event {
    /// Nominal weight, 1 if none was recorded.
    pub fn nominal_weight(&self) -> f64 {
        self.weights.first().copied().unwrap_or(1.0)
    }

    /// A copy of this event whose nominal weight is `weights[index]`.
    pub fn with_weight_index(&self, index: usize) -> Option<Event> {
        let w = *self.weights.get(index)?;
        let mut ev = self.clone();
        ev.weights = vec![w];
        Some(ev)
    }
}

/// Parse events from a JSON array or a stream of whitespace-separated JSON records.
pub fn parse_events(text: &str) -> Result<Vec<Event>> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<Event>()
        .map(|ev| ev.map_err(Error::from))
        .collect()
}

/// Read and parse an event file (see [`parse_events`]).
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    let text = std::fs::read_to_string(path)?;
    parse_events(&text)
}

impl EventView for Event {
    fn leptons(&self) -> &[Particle] {
        &self.leptons
    }

    fn photons(&self) -> &[Particle] {
        &self.photons
    }

    fn jets(&self) -> &[FourMomentum] {
        &self.jets
    }

    fn neutrinos(&self) -> &[Particle] {
        &self.neutrinos
    }

    fn missing_momentum(&self) -> FourMomentum {
        let [px, py] = self.met;
        FourMomentum::new(px, py, 0.0, (px * px + py * py).sqrt())
    }

    fn isolation_particles(&self) -> &[Particle] {
        &self.isolation_particles
    }

    fn outgoing_partons(&self) -> &[Particle] {
        &self.outgoing_partons
    }

    fn partonic_tops(&self) -> &[Particle] {
        &self.partonic_tops
    }

    fn weight(&self) -> f64 {
        self.nominal_weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_from_pid() {
        assert_eq!(Species::from_pdg_id(-11), Species::Electron);
        assert_eq!(Species::from_pdg_id(14), Species::Neutrino);
        assert_eq!(Species::from_pdg_id(21), Species::Parton);
        assert_eq!(Species::from_pdg_id(-6), Species::Top);
        assert_eq!(Species::from_pdg_id(211), Species::Other);
        assert!(Species::Muon.is_light_lepton());
        assert!(!Species::Tau.is_light_lepton());
    }

    #[test]
    fn test_event_from_partial_json() {
        let json = r#"{
            "leptons": [{"momentum": {"px": 40.0, "py": 0.0, "pz": 0.0, "e": 40.0}, "pid": 11, "charge": -1}],
            "met": [0.0, 45.0]
        }"#;
        let ev: Event = serde_json::from_str(json).unwrap();
        assert_eq!(ev.leptons.len(), 1);
        assert!(ev.leptons[0].is_prompt);
        assert!(!ev.leptons[0].from_tau);
        assert_eq!(ev.weight(), 1.0);
        assert_eq!(ev.missing_momentum().pt(), 45.0);
        assert!(ev.photons.is_empty());
    }

    #[test]
    fn test_parse_events_array_and_stream() {
        let one = r#"{"met": [3.0, 4.0], "weights": [2.0]}"#;
        let arr = parse_events(&format!("[{one}, {one}]")).unwrap();
        assert_eq!(arr.len(), 2);
        let stream = parse_events(&format!("{one}\n{one}\n{one}\n")).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream[2].weight(), 2.0);
        assert_eq!(stream[0].missing_momentum().pt(), 5.0);
        assert!(parse_events("").unwrap().is_empty());
    }

    #[test]
    fn test_event_io_errors() {
        assert!(matches!(parse_events(r#"{"met": [1.0]"#), Err(Error::Json(_))));
        assert!(matches!(parse_events(r#"[{"weights": "x"}]"#), Err(Error::Json(_))));
        let missing = std::env::temp_dir().join("fidkin_core_no_such_events_file.json");
        assert!(matches!(read_events(&missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_weight_index() {
        let ev = Event { weights: vec![1.0, 0.5, 2.0], ..Event::default() };
        assert_eq!(ev.with_weight_index(2).unwrap().weight(), 2.0);
        assert!(ev.with_weight_index(3).is_none());
    }
}
