//! t-channel single-top differential cross sections and charge ratios.
//!
//! The W is rebuilt from the lepton and the W-mass-constrained neutrino; the
//! top candidate is W plus whichever of the two jets lands closer to the top
//! mass. The other jet is the spectator used for the polarization angle.

use fk_core::{EventView, FourMomentum, Particle, Result};
use fk_hist::{Accumulator, Histo1D, Output, Scatter};
use fk_kin::{W_MASS, polarization_cosine, reconstruct_neutrino_pz_with_mass};
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, merge_1d};
use crate::disposition::{Disposition, VetoReason};
use crate::finalize::{FinalizeState, RunSummary};
use crate::observables::SingleTopObservables;
use crate::selection::{JetCuts, select_jets};

/// Selection thresholds (GeV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTopCuts {
    /// Lepton pt.
    pub lepton_pt: f64,
    /// Lepton |η|.
    pub lepton_abs_eta: f64,
    /// Jet acceptance and separation from the lepton.
    pub jets: JetCuts,
    /// Mass constraint of the neutrino reconstruction.
    pub w_mass: f64,
    /// Target mass of the top candidate.
    pub top_mass: f64,
}

impl Default for SingleTopCuts {
    fn default() -> Self {
        Self {
            lepton_pt: 26.0,
            lepton_abs_eta: 2.4,
            jets: JetCuts { pt_min: 40.0, abs_eta_max: 4.7, dr_min: 0.4 },
            w_mass: W_MASS,
            top_mass: 172.5,
        }
    }
}

/// Bin edges, shared by the t, t̄ and combined accumulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTopBinning {
    /// Top pt.
    pub top_pt: Vec<f64>,
    /// Top |y|.
    pub top_y: Vec<f64>,
    /// Lepton pt.
    pub lepton_pt: Vec<f64>,
    /// Lepton |y|.
    pub lepton_y: Vec<f64>,
    /// W pt.
    pub w_pt: Vec<f64>,
    /// Polarization cosine.
    pub top_cos: Vec<f64>,
}

impl Default for SingleTopBinning {
    fn default() -> Self {
        Self {
            top_pt: vec![0.0, 50.0, 80.0, 120.0, 180.0, 300.0],
            top_y: vec![0.0, 0.2, 0.5, 0.8, 1.3, 2.6],
            lepton_pt: vec![26.0, 35.0, 45.0, 60.0, 85.0, 200.0],
            lepton_y: vec![0.0, 0.4, 0.8, 1.5, 2.4],
            w_pt: vec![0.0, 50.0, 80.0, 120.0, 200.0, 300.0],
            top_cos: vec![-1.0, -0.6, -0.2, 0.2, 0.6, 1.0],
        }
    }
}

/// Full configuration of the single-top analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTopConfig {
    /// Thresholds.
    pub cuts: SingleTopCuts,
    /// Bin edges.
    pub binning: SingleTopBinning,
}

/// Top candidate and spectator jet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopCandidate {
    /// W + b-jet candidate.
    pub top: FourMomentum,
    /// The jet not used for the top.
    pub light_jet: FourMomentum,
}

/// Pair `w` with the jet giving a mass closest to `top_mass`.
///
/// The running best starts at the zero vector, so a candidate must beat
/// `|0 − top_mass|` to be taken.
pub fn reconstruct_top(w: &FourMomentum, jets: &[FourMomentum; 2], top_mass: f64) -> Option<TopCandidate> {
    let mut best: Option<TopCandidate> = None;
    let mut best_dist = top_mass.abs();
    for (i, jet) in jets.iter().enumerate() {
        let cand = *w + *jet;
        let dist = (cand.mass() - top_mass).abs();
        if dist < best_dist {
            best_dist = dist;
            best = Some(TopCandidate { top: cand, light_jet: jets[1 - i] });
        }
    }
    best
}

/// Build the observables, or the reason the event fails.
pub fn build_observables(
    event: &dyn EventView,
    cuts: &SingleTopCuts,
) -> std::result::Result<SingleTopObservables, VetoReason> {
    let [top_quark] = event.partonic_tops() else {
        return Err(VetoReason::TopMultiplicity);
    };

    let leptons: Vec<&Particle> = event
        .leptons()
        .iter()
        .filter(|l| l.is_prompt && l.species().is_light_lepton())
        .filter(|l| l.pt() > cuts.lepton_pt && l.eta().abs() < cuts.lepton_abs_eta)
        .collect();
    let [lepton] = leptons[..] else {
        return Err(VetoReason::LeptonMultiplicity);
    };

    let jets = select_jets(event.jets(), &cuts.jets, &[lepton.momentum]);
    let [j0, j1] = jets[..] else {
        return Err(VetoReason::JetMultiplicity);
    };

    let met: FourMomentum =
        event.neutrinos().iter().filter(|n| n.is_prompt).map(|n| n.momentum).sum();
    let nu = match reconstruct_neutrino_pz_with_mass(&lepton.momentum, met.px, met.py, cuts.w_mass)
    {
        Ok(sol) if sol.is_solved() => sol.primary,
        Ok(_) => return Err(VetoReason::NeutrinoUnsolved),
        Err(e) => {
            log::debug!("single_top: {e}");
            return Err(VetoReason::DegenerateKinematics);
        }
    };
    let w = nu + lepton.momentum;

    let cand = reconstruct_top(&w, &[j0, j1], cuts.top_mass).ok_or(VetoReason::NoTopCandidate)?;
    let cos = polarization_cosine(&cand.top, &cand.light_jet, &lepton.momentum).map_err(|e| {
        log::debug!("single_top: {e}");
        VetoReason::DegenerateKinematics
    })?;

    Ok(SingleTopObservables {
        top_pt: cand.top.pt(),
        top_abs_y: cand.top.abs_rapidity(),
        lepton_pt: lepton.pt(),
        lepton_abs_y: lepton.momentum.abs_rapidity(),
        w_pt: w.pt(),
        polarization_cos: cos,
        top_charge: top_quark.pid.signum(),
    })
}

/// One observable split by top charge, plus its charge-combined derivations.
#[derive(Debug, Clone)]
pub struct ChargeSplit {
    key: &'static str,
    /// Top events.
    pub t: Histo1D,
    /// Antitop events.
    pub tbar: Histo1D,
    /// t + t̄, once finalized.
    pub abs: Option<Histo1D>,
    /// Unit-integral t + t̄, once finalized.
    pub norm: Option<Histo1D>,
    /// t / (t + t̄), once finalized.
    pub ratio: Option<Scatter>,
}

impl ChargeSplit {
    fn new(key: &'static str, edges: &[f64]) -> Result<Self> {
        Ok(Self {
            key,
            t: Histo1D::new(format!("t_{key}"), edges.to_vec())?,
            tbar: Histo1D::new(format!("tbar_{key}"), edges.to_vec())?,
            abs: None,
            norm: None,
            ratio: None,
        })
    }

    fn fill(&mut self, top_charge: i32, val: f64, weight: f64) {
        if top_charge > 0 { self.t.fill(val, weight) } else { self.tbar.fill(val, weight) }
    }

    fn combine(&mut self, with_ratio: bool) -> Result<()> {
        let abs = self.t.sum(&self.tbar, format!("abs_{}", self.key))?;
        let mut norm = abs.clone();
        norm.name = format!("norm_{}", self.key);
        norm.normalize(1.0);
        self.ratio = if with_ratio {
            Some(Scatter::divide(format!("ratio_{}", self.key), &self.t, &abs)?)
        } else {
            None
        };
        self.abs = Some(abs);
        self.norm = Some(norm);
        Ok(())
    }

    fn outputs(&self, out: &mut Vec<Output>) {
        out.push(self.t.clone().into());
        out.push(self.tbar.clone().into());
        out.extend(self.abs.iter().cloned().map(Output::from));
        out.extend(self.norm.iter().cloned().map(Output::from));
        out.extend(self.ratio.iter().cloned().map(Output::from));
    }
}

/// Accumulators of the single-top analysis.
#[derive(Debug, Clone)]
pub struct SingleTopHistograms {
    /// Top pt.
    pub top_pt: ChargeSplit,
    /// Top |y|.
    pub top_y: ChargeSplit,
    /// Lepton pt.
    pub lepton_pt: ChargeSplit,
    /// Lepton |y|.
    pub lepton_y: ChargeSplit,
    /// W pt.
    pub w_pt: ChargeSplit,
    /// Polarization cosine; no charge ratio.
    pub top_cos: ChargeSplit,
}

impl SingleTopHistograms {
    /// Book every accumulator; fails on invalid edges.
    pub fn new(b: &SingleTopBinning) -> Result<Self> {
        Ok(Self {
            top_pt: ChargeSplit::new("top_pt", &b.top_pt)?,
            top_y: ChargeSplit::new("top_y", &b.top_y)?,
            lepton_pt: ChargeSplit::new("lepton_pt", &b.lepton_pt)?,
            lepton_y: ChargeSplit::new("lepton_y", &b.lepton_y)?,
            w_pt: ChargeSplit::new("w_pt", &b.w_pt)?,
            top_cos: ChargeSplit::new("top_cos", &b.top_cos)?,
        })
    }

    fn splits(&self) -> [&ChargeSplit; 6] {
        [&self.top_pt, &self.top_y, &self.lepton_pt, &self.lepton_y, &self.w_pt, &self.top_cos]
    }

    fn splits_mut(&mut self) -> [&mut ChargeSplit; 6] {
        [
            &mut self.top_pt,
            &mut self.top_y,
            &mut self.lepton_pt,
            &mut self.lepton_y,
            &mut self.w_pt,
            &mut self.top_cos,
        ]
    }

    fn charged(&self) -> Vec<&Histo1D> {
        self.splits().into_iter().flat_map(|s| [&s.t, &s.tbar]).collect()
    }

    fn charged_mut(&mut self) -> Vec<&mut Histo1D> {
        self.splits_mut().into_iter().flat_map(|s| [&mut s.t, &mut s.tbar]).collect()
    }
}

/// The t-channel single-top analysis.
#[derive(Debug, Clone)]
pub struct SingleTop {
    config: SingleTopConfig,
    histos: SingleTopHistograms,
    finalized: FinalizeState,
}

impl SingleTop {
    /// Book the analysis; fails on invalid bin edges.
    pub fn new(config: SingleTopConfig) -> Result<Self> {
        let histos = SingleTopHistograms::new(&config.binning)?;
        Ok(Self { config, histos, finalized: FinalizeState::default() })
    }

    /// Active configuration.
    pub fn config(&self) -> &SingleTopConfig {
        &self.config
    }

    /// Accumulators.
    pub fn histograms(&self) -> &SingleTopHistograms {
        &self.histos
    }
}

impl Analysis for SingleTop {
    fn name(&self) -> &'static str {
        "single_top"
    }

    fn analyze(&mut self, event: &dyn EventView) -> Disposition {
        let obs = match build_observables(event, &self.config.cuts) {
            Ok(obs) => obs,
            Err(reason) => return reason.into(),
        };
        let (q, w) = (obs.top_charge, event.weight());
        let h = &mut self.histos;
        h.top_pt.fill(q, obs.top_pt, w);
        h.top_y.fill(q, obs.top_abs_y, w);
        h.lepton_pt.fill(q, obs.lepton_pt, w);
        h.lepton_y.fill(q, obs.lepton_abs_y, w);
        h.w_pt.fill(q, obs.w_pt, w);
        h.top_cos.fill(q, obs.polarization_cos, w);
        Disposition::Accepted
    }

    fn finalize(&mut self, run: &RunSummary) {
        self.finalized.begin(self.name());
        // average over the two charge channels
        let sf = 0.5 * run.cross_section_scale();
        for h in self.histos.charged_mut() {
            h.scale(sf);
        }
        if self.histos.top_pt.t.num_entries() == 0 || self.histos.top_pt.tbar.num_entries() == 0 {
            log::debug!("single_top: t or tbar empty; skipping combined outputs");
            return;
        }
        for split in self.histos.splits_mut() {
            let with_ratio = split.key != "top_cos";
            if let Err(e) = split.combine(with_ratio) {
                log::warn!("single_top: cannot combine {}: {e}", split.key);
            }
        }
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        merge_1d(self.histos.charged_mut(), other.histos.charged())
    }

    fn outputs(&self) -> Vec<Output> {
        let mut out = Vec::new();
        for split in self.histos.splits() {
            split.outputs(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fk_core::Event;

    fn single_top_event(top_pid: i32) -> Event {
        let lep = FourMomentum::from_pt_eta_phi_m(50.0, 0.0, 0.0, 0.0);
        let nu = FourMomentum::from_pt_eta_phi_m(40.0, 0.2, 2.0, 0.0);
        let b = FourMomentum::from_pt_eta_phi_m(60.0, 0.5, -2.0, 4.8);
        let light = FourMomentum::from_pt_eta_phi_m(80.0, 2.5, 1.0, 0.0);
        Event {
            leptons: vec![Particle::new(lep, -top_pid.signum() * 11, top_pid.signum())],
            neutrinos: vec![Particle::new(nu, top_pid.signum() * 12, 0)],
            jets: vec![b, light],
            partonic_tops: vec![Particle::new(FourMomentum::new(0.0, 0.0, 0.0, 172.5), top_pid, 0)],
            ..Event::default()
        }
    }

    #[test]
    fn test_reconstruct_top_closest_mass() {
        let w = FourMomentum::new(0.0, 0.0, 0.0, 80.4);
        let j1 = FourMomentum::new(100.0, 0.0, 0.0, 100.0);
        let j2 = FourMomentum::new(0.0, 130.0, 0.0, 130.0);
        let cand = reconstruct_top(&w, &[j1, j2], 172.5).unwrap();
        assert_relative_eq!(cand.top.mass(), (210.4f64 * 210.4 - 130.0 * 130.0).sqrt(), epsilon = 1e-9);
        assert_eq!(cand.light_jet, j1);

        let far = FourMomentum::new(1000.0, 0.0, 0.0, 1000.0);
        assert!(reconstruct_top(&w, &[far, -far], 172.5).is_none());
    }

    #[test]
    fn test_vetoes() {
        let mut a = SingleTop::new(SingleTopConfig::default()).unwrap();

        let mut ev = single_top_event(6);
        ev.partonic_tops.clear();
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::TopMultiplicity));

        let mut ev = single_top_event(6);
        ev.leptons.push(ev.leptons[0]);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::LeptonMultiplicity));

        // jet on top of the lepton is removed
        let mut ev = single_top_event(6);
        ev.jets[1] = FourMomentum::from_pt_eta_phi_m(80.0, 0.1, 0.1, 0.0);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::JetMultiplicity));

        // lepton with no transverse energy never reaches the solver: it fails the pt cut
        let mut ev = single_top_event(6);
        ev.leptons[0].momentum = FourMomentum::from_pt_eta_phi_m(20.0, 0.0, 0.0, 0.0);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::LeptonMultiplicity));

        // lepton along y with back-to-back MET: mT > mW and px(lepton) = 0
        let mut ev = single_top_event(6);
        ev.leptons[0].momentum = FourMomentum::new(0.0, 50.0, 0.0, 50.0);
        ev.neutrinos[0].momentum = FourMomentum::new(0.0, -60.0, 0.0, 60.0);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::DegenerateKinematics));
        assert_eq!(a.histograms().top_pt.t.entries, 0);
    }

    #[test]
    fn test_unsolved_neutrino_vetoes() {
        let cuts = SingleTopCuts { w_mass: 0.0, ..SingleTopCuts::default() };
        let mut a = SingleTop::new(SingleTopConfig { cuts: cuts.clone(), ..SingleTopConfig::default() }).unwrap();
        let mut ev = single_top_event(6);
        ev.neutrinos.clear();
        assert_eq!(build_observables(&ev, &cuts).unwrap_err(), VetoReason::NeutrinoUnsolved);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::NeutrinoUnsolved));
        assert_eq!(a.histograms().top_pt.t.entries, 0);
        assert_eq!(a.histograms().top_pt.tbar.entries, 0);
    }

    #[test]
    fn test_fills_by_top_charge() {
        let mut a = SingleTop::new(SingleTopConfig::default()).unwrap();
        assert_eq!(a.analyze(&single_top_event(6)), Disposition::Accepted);
        assert_eq!(a.analyze(&single_top_event(-6)), Disposition::Accepted);
        assert_eq!(a.analyze(&single_top_event(-6)), Disposition::Accepted);
        let h = a.histograms();
        assert_eq!(h.top_pt.t.entries, 1);
        assert_eq!(h.top_pt.tbar.entries, 2);
        let obs = build_observables(&single_top_event(6), &SingleTopCuts::default()).unwrap();
        assert!((-1.0..=1.0).contains(&obs.polarization_cos));
        assert_eq!(obs.top_charge, 1);
        assert_relative_eq!(obs.lepton_pt, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_finalize_combined_outputs() {
        let mut a = SingleTop::new(SingleTopConfig::default()).unwrap();
        a.analyze(&single_top_event(6));
        a.analyze(&single_top_event(-6));
        a.analyze(&single_top_event(-6));
        a.finalize(&RunSummary { cross_section: 6.0, sum_of_weights: 3.0, n_events: 3 });

        let h = a.histograms();
        assert_relative_eq!(h.lepton_pt.t.integral(), 1.0, epsilon = 1e-12);
        let abs = h.lepton_pt.abs.as_ref().unwrap();
        assert_eq!(abs.name, "abs_lepton_pt");
        assert_relative_eq!(abs.integral(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(h.lepton_pt.norm.as_ref().unwrap().integral(), 1.0, epsilon = 1e-12);

        // 50 GeV lepton sits in [45, 60)
        let ratio = h.lepton_pt.ratio.as_ref().unwrap();
        assert_relative_eq!(ratio.points[2].y, 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(ratio.points[0].y, 0.0);
        assert!(h.top_cos.ratio.is_none());
        assert_eq!(a.outputs().len(), 12 + 6 + 6 + 5);
    }

    #[test]
    fn test_finalize_one_charge_only() {
        let mut a = SingleTop::new(SingleTopConfig::default()).unwrap();
        a.analyze(&single_top_event(6));
        a.finalize(&RunSummary { cross_section: 6.0, sum_of_weights: 1.0, n_events: 1 });
        assert!(a.histograms().top_pt.abs.is_none());
        assert_eq!(a.outputs().len(), 12);
    }
}
