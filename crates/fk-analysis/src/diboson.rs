//! WW → eμ fiducial cross sections with a jet-veto scan.

use fk_core::{EventView, FourMomentum, Particle, Result};
use fk_hist::{Accumulator, Histo1D, Output};
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, merge_1d};
use crate::disposition::{Disposition, VetoReason};
use crate::finalize::{FinalizeState, RunSummary};
use crate::observables::DibosonObservables;
use crate::selection::{JetCuts, PairKinematics, select_jets, sorted_by_pt};

/// Selection thresholds (GeV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DibosonCuts {
    /// Lepton pt, main region.
    pub lepton_pt: f64,
    /// Lepton pt, simplified region.
    pub simplified_lepton_pt: f64,
    /// Lepton |η|.
    pub lepton_abs_eta: f64,
    /// MET.
    pub missing_pt: f64,
    /// Dilepton mass.
    pub mll: f64,
    /// Dilepton pt.
    pub ptll: f64,
    /// Jet acceptance; no overlap removal against the leptons.
    pub jets: JetCuts,
    /// Leading-jet pt above which the event is vetoed.
    pub jet_veto_pt: f64,
    /// Leading-jet thresholds of the veto scan, one bin each.
    pub jet_veto_scan: Vec<f64>,
}

impl Default for DibosonCuts {
    fn default() -> Self {
        Self {
            lepton_pt: 27.0,
            simplified_lepton_pt: 25.0,
            lepton_abs_eta: 2.5,
            missing_pt: 20.0,
            mll: 55.0,
            ptll: 30.0,
            jets: JetCuts { pt_min: 30.0, abs_eta_max: 4.5, dr_min: 0.0 },
            jet_veto_pt: 35.0,
            jet_veto_scan: vec![30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0],
        }
    }
}

/// Bin edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DibosonBinning {
    /// Jet-veto scan; one bin per threshold.
    pub jetveto: Vec<f64>,
    /// Leading lepton pt.
    pub ptlead: Vec<f64>,
    /// Dilepton mass.
    pub mll: Vec<f64>,
    /// Dilepton pt.
    pub ptll: Vec<f64>,
    /// Dilepton |y|.
    pub yll: Vec<f64>,
    /// |Δφ| between the leptons.
    pub dphill: Vec<f64>,
    /// |cos θ*|.
    pub costhetastarll: Vec<f64>,
    /// Leading lepton pt, simplified region.
    pub ptlead_simpl: Vec<f64>,
    /// Dilepton mass, simplified region.
    pub mll_simpl: Vec<f64>,
    /// Dilepton pt, simplified region.
    pub ptll_simpl: Vec<f64>,
}

impl Default for DibosonBinning {
    fn default() -> Self {
        Self {
            jetveto: vec![27.5, 32.5, 37.5, 42.5, 47.5, 52.5, 57.5, 62.5],
            ptlead: vec![27.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 130.0, 150.0, 175.0, 200.0, 250.0, 300.0, 400.0, 1000.0],
            mll: vec![55.0, 75.0, 85.0, 105.0, 110.0, 120.0, 130.0, 150.0, 175.0, 200.0, 250.0, 300.0, 350.0, 400.0, 500.0, 600.0, 1500.0],
            ptll: vec![30.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0, 80.0, 90.0, 100.0, 110.0, 130.0, 150.0, 175.0, 200.0, 250.0, 300.0, 400.0, 1000.0],
            yll: vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.2, 2.5],
            dphill: vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.2, 2.4, 2.6, 2.8, 3.0, std::f64::consts::PI],
            costhetastarll: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
            ptlead_simpl: vec![25.0, 40.0, 50.0, 60.0, 80.0, 100.0, 150.0, 200.0, 400.0, 1000.0],
            mll_simpl: vec![0.0, 50.0, 75.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1500.0],
            ptll_simpl: vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 150.0, 200.0, 400.0, 1000.0],
        }
    }
}

/// Full configuration of the WW analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DibosonConfig {
    /// Thresholds.
    pub cuts: DibosonCuts,
    /// Bin edges.
    pub binning: DibosonBinning,
}

/// Electrons and muons not from τ decays, prompt, above `pt_min`, by descending pt.
pub fn select_leptons(leptons: &[Particle], pt_min: f64, abs_eta_max: f64) -> Vec<Particle> {
    let passing: Vec<Particle> = leptons
        .iter()
        .filter(|l| l.is_prompt && !l.from_tau && l.species().is_light_lepton())
        .filter(|l| l.pt() > pt_min && l.eta().abs() < abs_eta_max)
        .copied()
        .collect();
    sorted_by_pt(&passing)
}

/// The opposite-flavour, opposite-charge pair, or the first requirement it misses.
pub fn electron_muon_pair(
    leptons: &[Particle],
) -> std::result::Result<(Particle, Particle), VetoReason> {
    let [l0, l1] = leptons else {
        return Err(VetoReason::LeptonMultiplicity);
    };
    if l0.abs_pid() == l1.abs_pid() {
        return Err(VetoReason::SameFlavour);
    }
    if l0.pid * l1.pid > 0 {
        return Err(VetoReason::SameCharge);
    }
    Ok((*l0, *l1))
}

/// Observables of a lepton pair, `l0` being the leading one.
pub fn build_observables(l0: &Particle, l1: &Particle, jets: &[FourMomentum]) -> DibosonObservables {
    let pair = PairKinematics::new(&l0.momentum, &l1.momentum);
    DibosonObservables {
        lead_pt: l0.pt(),
        mll: pair.mass,
        ptll: pair.pt,
        yll: pair.abs_rapidity,
        dphill: pair.delta_phi,
        costhetastar: pair.cos_theta_star,
        lead_jet_pt: jets.first().map(FourMomentum::pt),
    }
}

/// An absolute accumulator and its shape-normalized twin.
#[derive(Debug, Clone)]
pub struct AbsNorm {
    /// Cross-section normalized.
    pub abs: Histo1D,
    /// Unit integral.
    pub norm: Histo1D,
}

impl AbsNorm {
    fn new(name: &str, edges: &[f64]) -> Result<Self> {
        Ok(Self {
            abs: Histo1D::new(name, edges.to_vec())?,
            norm: Histo1D::new(format!("{name}_norm"), edges.to_vec())?,
        })
    }

    fn fill(&mut self, val: f64, weight: f64) {
        self.abs.fill(val, weight);
        self.norm.fill(val, weight);
    }
}

/// Accumulators of the WW analysis.
#[derive(Debug, Clone)]
pub struct DibosonHistograms {
    /// Cross section vs. leading-jet veto threshold.
    pub jetveto: Histo1D,
    /// Leading lepton pt.
    pub ptlead: AbsNorm,
    /// Dilepton mass.
    pub mll: AbsNorm,
    /// Dilepton pt.
    pub ptll: AbsNorm,
    /// Dilepton |y|.
    pub yll: AbsNorm,
    /// |Δφ_ll|.
    pub dphill: AbsNorm,
    /// |cos θ*|.
    pub costhetastarll: AbsNorm,
    /// Simplified-region leading lepton pt.
    pub ptlead_simpl: Histo1D,
    /// Simplified-region dilepton mass.
    pub mll_simpl: Histo1D,
    /// Simplified-region dilepton pt.
    pub ptll_simpl: Histo1D,
}

impl DibosonHistograms {
    /// Book every accumulator; fails on invalid edges.
    pub fn new(b: &DibosonBinning) -> Result<Self> {
        Ok(Self {
            jetveto: Histo1D::new("jetveto", b.jetveto.clone())?,
            ptlead: AbsNorm::new("ptlead", &b.ptlead)?,
            mll: AbsNorm::new("mll", &b.mll)?,
            ptll: AbsNorm::new("ptll", &b.ptll)?,
            yll: AbsNorm::new("yll", &b.yll)?,
            dphill: AbsNorm::new("dphill", &b.dphill)?,
            costhetastarll: AbsNorm::new("costhetastarll", &b.costhetastarll)?,
            ptlead_simpl: Histo1D::new("ptlead_simpl", b.ptlead_simpl.clone())?,
            mll_simpl: Histo1D::new("mll_simpl", b.mll_simpl.clone())?,
            ptll_simpl: Histo1D::new("ptll_simpl", b.ptll_simpl.clone())?,
        })
    }

    fn pairs(&self) -> [&AbsNorm; 6] {
        [&self.ptlead, &self.mll, &self.ptll, &self.yll, &self.dphill, &self.costhetastarll]
    }

    fn pairs_mut(&mut self) -> [&mut AbsNorm; 6] {
        [
            &mut self.ptlead,
            &mut self.mll,
            &mut self.ptll,
            &mut self.yll,
            &mut self.dphill,
            &mut self.costhetastarll,
        ]
    }

    fn all(&self) -> Vec<&Histo1D> {
        let mut v = vec![&self.jetveto];
        for p in self.pairs() {
            v.push(&p.abs);
            v.push(&p.norm);
        }
        v.extend([&self.ptlead_simpl, &self.mll_simpl, &self.ptll_simpl]);
        v
    }

    fn all_mut(&mut self) -> Vec<&mut Histo1D> {
        let Self { jetveto, ptlead, mll, ptll, yll, dphill, costhetastarll, ptlead_simpl, mll_simpl, ptll_simpl } =
            self;
        let mut v = vec![jetveto];
        for p in [ptlead, mll, ptll, yll, dphill, costhetastarll] {
            v.push(&mut p.abs);
            v.push(&mut p.norm);
        }
        v.extend([ptlead_simpl, mll_simpl, ptll_simpl]);
        v
    }
}

/// The WW → eμ analysis.
#[derive(Debug, Clone)]
pub struct Diboson {
    config: DibosonConfig,
    histos: DibosonHistograms,
    finalized: FinalizeState,
}

impl Diboson {
    /// Book the analysis; fails on invalid bin edges.
    pub fn new(config: DibosonConfig) -> Result<Self> {
        let histos = DibosonHistograms::new(&config.binning)?;
        Ok(Self { config, histos, finalized: FinalizeState::default() })
    }

    /// Active configuration.
    pub fn config(&self) -> &DibosonConfig {
        &self.config
    }

    /// Accumulators.
    pub fn histograms(&self) -> &DibosonHistograms {
        &self.histos
    }

    fn fill_simplified(&mut self, event: &dyn EventView, jets: &[FourMomentum], met: f64) {
        let cuts = &self.config.cuts;
        let leptons = select_leptons(event.leptons(), cuts.simplified_lepton_pt, cuts.lepton_abs_eta);
        let Ok((l0, l1)) = electron_muon_pair(&leptons) else {
            return;
        };
        if met <= cuts.missing_pt || !jets.is_empty() {
            return;
        }
        let pair = PairKinematics::new(&l0.momentum, &l1.momentum);
        let w = event.weight();
        self.histos.ptlead_simpl.fill(l0.pt(), w);
        self.histos.ptll_simpl.fill(pair.pt, w);
        self.histos.mll_simpl.fill(pair.mass, w);
    }
}

impl Analysis for Diboson {
    fn name(&self) -> &'static str {
        "diboson"
    }

    fn analyze(&mut self, event: &dyn EventView) -> Disposition {
        let met = event.missing_momentum().pt();
        let jets = select_jets(event.jets(), &self.config.cuts.jets, &[]);
        self.fill_simplified(event, &jets, met);

        let cuts = &self.config.cuts;
        let leptons = select_leptons(event.leptons(), cuts.lepton_pt, cuts.lepton_abs_eta);
        let (l0, l1) = match electron_muon_pair(&leptons) {
            Ok(pair) => pair,
            Err(reason) => return reason.into(),
        };
        let obs = build_observables(&l0, &l1, &jets);
        if met <= cuts.missing_pt || obs.mll <= cuts.mll || obs.ptll <= cuts.ptll {
            return VetoReason::Kinematic.into();
        }

        let w = event.weight();
        for (i, &threshold) in cuts.jet_veto_scan.iter().enumerate() {
            if obs.lead_jet_pt.is_none_or(|pt| pt < threshold) {
                self.histos.jetveto.fill_bin(i, w);
            }
        }
        if obs.lead_jet_pt.is_some_and(|pt| pt > cuts.jet_veto_pt) {
            return VetoReason::JetVeto.into();
        }

        let h = &mut self.histos;
        h.ptlead.fill(obs.lead_pt, w);
        h.mll.fill(obs.mll, w);
        h.ptll.fill(obs.ptll, w);
        h.yll.fill(obs.yll, w);
        h.dphill.fill(obs.dphill, w);
        h.costhetastarll.fill(obs.costhetastar, w);
        Disposition::Accepted
    }

    fn finalize(&mut self, run: &RunSummary) {
        self.finalized.begin(self.name());
        // bins hold integrated cross sections; undo the per-width density
        let width = self.histos.jetveto.bin_width(0);
        self.histos.jetveto.scale(width);
        let sf = run.cross_section_scale();
        for h in self.histos.all_mut() {
            h.scale(sf);
        }
        for p in self.histos.pairs_mut() {
            p.norm.normalize(1.0);
        }
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        merge_1d(self.histos.all_mut(), other.histos.all())
    }

    fn outputs(&self) -> Vec<Output> {
        self.histos.all().into_iter().cloned().map(Output::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fk_core::Event;

    fn lepton(pt: f64, eta: f64, phi: f64, pid: i32) -> Particle {
        let charge = if pid > 0 { -1 } else { 1 };
        Particle::new(FourMomentum::from_pt_eta_phi_m(pt, eta, phi, 0.0), pid, charge)
    }

    fn emu_event() -> Event {
        Event {
            leptons: vec![lepton(60.0, 0.3, 0.0, 11), lepton(40.0, -0.5, 2.5, -13)],
            met: [30.0, 10.0],
            ..Event::default()
        }
    }

    #[test]
    fn test_pair_vetoes_in_order() {
        let e = lepton(50.0, 0.0, 0.0, 11);
        let pos = lepton(40.0, 0.0, 2.0, -11);
        let mu = lepton(40.0, 0.0, 2.0, 13);
        assert_eq!(electron_muon_pair(&[e]), Err(VetoReason::LeptonMultiplicity));
        assert_eq!(electron_muon_pair(&[e, pos]), Err(VetoReason::SameFlavour));
        assert_eq!(electron_muon_pair(&[e, mu]), Err(VetoReason::SameCharge));
        let anti_mu = lepton(40.0, 0.0, 2.0, -13);
        assert!(electron_muon_pair(&[e, anti_mu]).is_ok());
    }

    #[test]
    fn test_lepton_selection() {
        let mut tau_child = lepton(80.0, 0.0, 0.0, 13);
        tau_child.from_tau = true;
        let leptons = [
            lepton(30.0, 0.0, 0.0, 11),
            lepton(26.0, 0.0, 0.0, 11),
            lepton(90.0, 2.6, 0.0, 13),
            lepton(50.0, 0.0, 0.0, 15),
            tau_child,
            lepton(45.0, 1.0, 0.0, -13),
        ];
        let main = select_leptons(&leptons, 27.0, 2.5);
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].pid, -13);
        assert_eq!(select_leptons(&leptons, 25.0, 2.5).len(), 3);
    }

    #[test]
    fn test_accepted_event_fills_all() {
        let mut a = Diboson::new(DibosonConfig::default()).unwrap();
        let ev = emu_event();
        assert_eq!(a.analyze(&ev), Disposition::Accepted);
        let h = a.histograms();
        assert_eq!(h.ptlead.abs.entries, 1);
        assert_eq!(h.costhetastarll.norm.entries, 1);
        assert_eq!(h.jetveto.bin_entries, vec![1; 7]);
        assert_eq!(h.mll_simpl.entries, 1);
    }

    #[test]
    fn test_jet_veto_scan() {
        let mut a = Diboson::new(DibosonConfig::default()).unwrap();
        let mut ev = emu_event();
        ev.jets = vec![FourMomentum::from_pt_eta_phi_m(42.0, 3.0, 1.0, 5.0)];
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::JetVeto));
        let h = a.histograms();
        assert_eq!(h.jetveto.bin_entries, vec![0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(h.ptlead.abs.entries, 0);
        assert_eq!(h.mll_simpl.entries, 0);

        // a jet beyond |η| = 4.5 is ignored
        ev.jets = vec![FourMomentum::from_pt_eta_phi_m(42.0, 4.7, 1.0, 5.0)];
        assert_eq!(a.analyze(&ev), Disposition::Accepted);
    }

    #[test]
    fn test_kinematic_veto_still_fills_simplified() {
        let mut a = Diboson::new(DibosonConfig::default()).unwrap();
        // collinear pair: small mll
        let ev = Event {
            leptons: vec![lepton(60.0, 0.3, 0.0, 11), lepton(40.0, 0.2, 0.1, -13)],
            met: [30.0, 10.0],
            ..Event::default()
        };
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::Kinematic));
        assert_eq!(a.histograms().mll_simpl.entries, 1);
        assert_eq!(a.histograms().mll.abs.entries, 0);
    }

    #[test]
    fn test_finalize() {
        let mut a = Diboson::new(DibosonConfig::default()).unwrap();
        let ev = Event { weights: vec![2.0], ..emu_event() };
        a.analyze(&ev);
        a.analyze(&ev);
        a.finalize(&RunSummary { cross_section: 10.0, sum_of_weights: 8.0, n_events: 4 });
        let h = a.histograms();
        // 4 × 5 × 10 / 8
        assert_relative_eq!(h.jetveto.bin_content[0], 25.0, epsilon = 1e-12);
        assert_relative_eq!(h.ptlead.abs.integral(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(h.ptlead.norm.integral(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(h.mll_simpl.integral(), 5.0, epsilon = 1e-12);
        assert_eq!(a.outputs().len(), 16);
    }
}
