//! W(ℓν)γ fiducial cross sections and decay-angle EFT regions.
//!
//! Objects: the leading lepton, the leading photon with ΔR(ℓ, γ) above the
//! separation cut, the leading neutrino and the missing momentum. The photon
//! must pass Frixione isolation. The decay angle comes from the ℓνγ rest frame
//! ([`DecayFrame`]).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6};

use fk_core::{EventView, Result, delta_r};
use fk_hist::{Accumulator, Histo1D, Histo2D, Output};
use fk_kin::DecayFrame;
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, merge_1d, merge_2d};
use crate::disposition::{Disposition, VetoReason};
use crate::finalize::{FinalizeState, RunSummary};
use crate::observables::WGammaObservables;
use crate::selection::{
    JetCuts, frixione_isolation, leading, leading_isolated_from, mt_cluster, select_jets,
};

/// Upper edges of the three folded-angle slices.
const PHI_SLICES: [f64; 4] = [0.0, FRAC_PI_6, FRAC_PI_3, FRAC_PI_2];

/// Selection thresholds (GeV, radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WGammaCuts {
    /// Frixione cone radius.
    pub photon_iso_dr: f64,
    /// Lepton pt.
    pub lepton_pt: f64,
    /// Lepton |η|.
    pub lepton_abs_eta: f64,
    /// Photon pt.
    pub photon_pt: f64,
    /// Photon |η|.
    pub photon_abs_eta: f64,
    /// MET.
    pub missing_pt: f64,
    /// ΔR(ℓ, γ), also used when picking the photon.
    pub lepton_photon_dr: f64,
    /// mTcluster for the radiation-amplitude-zero region.
    pub raz_mt_cluster: f64,
    /// EFT lepton pt.
    pub eft_lepton_pt: f64,
    /// EFT photon pt.
    pub eft_photon_pt: f64,
    /// EFT MET split between the `met1` and `main` regions.
    pub eft_missing_pt: f64,
    /// EFT MET lower bound.
    pub eft_missing_pt_met1: f64,
    /// EFT ΔR(ℓ, γ) for the 2D regions.
    pub eft_lepton_photon_dr: f64,
    /// Jet selection; ΔR is taken to the lepton and the photon.
    pub jets: JetCuts,
}

impl Default for WGammaCuts {
    fn default() -> Self {
        Self {
            photon_iso_dr: 0.4,
            lepton_pt: 30.0,
            lepton_abs_eta: 2.5,
            photon_pt: 30.0,
            photon_abs_eta: 2.5,
            missing_pt: 40.0,
            lepton_photon_dr: 0.7,
            raz_mt_cluster: 150.0,
            eft_lepton_pt: 80.0,
            eft_photon_pt: 150.0,
            eft_missing_pt: 80.0,
            eft_missing_pt_met1: 40.0,
            eft_lepton_photon_dr: 3.0,
            jets: JetCuts { pt_min: 30.0, abs_eta_max: 2.5, dr_min: 0.4 },
        }
    }
}

/// Which objects enter the photon isolation sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationSource {
    /// Isolation particles supplied by the event, minus τ descendants.
    ///
    /// No jets are clustered here: each supplied particle stands in for an isolation jet.
    #[default]
    NonPrompt,
    /// Outgoing hard-process partons.
    Partons,
}

/// Bin edges for every accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WGammaBinning {
    /// Baseline photon pt.
    pub photon_pt: Vec<f64>,
    /// Baseline photon η.
    pub photon_eta: Vec<f64>,
    /// Baseline ΔR(ℓ, γ).
    pub leppho_dr: Vec<f64>,
    /// Baseline η(ℓ) − η(γ).
    pub leppho_deta: Vec<f64>,
    /// Baseline mTcluster.
    pub mt_cluster: Vec<f64>,
    /// Baseline jet multiplicity.
    pub njet: Vec<f64>,
    /// Radiation-amplitude-zero Δη.
    pub raz_leppho_deta: Vec<f64>,
    /// Photon pt in the EFT regions (1D slices and 2D x axis).
    pub eft_photon_pt: Vec<f64>,
    /// Folded angle (2D y axis).
    pub eft_phi: Vec<f64>,
}

impl Default for WGammaBinning {
    fn default() -> Self {
        let deta = vec![-4.5, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.5];
        Self {
            photon_pt: vec![30.0, 50.0, 70.0, 100.0, 150.0, 200.0, 300.0, 500.0, 800.0, 1200.0],
            photon_eta: vec![-2.5, -2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0, 2.5],
            leppho_dr: vec![0.7, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 5.0],
            leppho_deta: deta.clone(),
            mt_cluster: vec![0.0, 50.0, 75.0, 100.0, 125.0, 150.0, 200.0, 300.0, 400.0, 600.0, 1000.0],
            njet: vec![-0.5, 0.5, 1.5, 2.5],
            raz_leppho_deta: deta,
            eft_photon_pt: vec![150.0, 200.0, 300.0, 500.0, 800.0, 1200.0],
            eft_phi: PHI_SLICES.to_vec(),
        }
    }
}

/// Full configuration of the W(ℓν)γ analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WGammaConfig {
    /// Thresholds.
    pub cuts: WGammaCuts,
    /// Bin edges.
    pub binning: WGammaBinning,
    /// Extra factor applied with the cross-section scale (1.5 when τ events are vetoed).
    pub flavor_factor: f64,
    /// Isolation candidates.
    pub isolation: IsolationSource,
}

impl Default for WGammaConfig {
    fn default() -> Self {
        Self {
            cuts: WGammaCuts::default(),
            binning: WGammaBinning::default(),
            flavor_factor: 1.0,
            isolation: IsolationSource::NonPrompt,
        }
    }
}

/// MET window of a 2D region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetBin {
    /// Above the MET split.
    Main,
    /// Between the lower bound and the split.
    Met1,
}

/// Closed set of W(ℓν)γ regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WGammaRegion {
    /// Baseline fiducial region.
    Baseline,
    /// Baseline, no jets and large mTcluster.
    BaselineRaz,
    /// Baseline objects, photon pt × folded angle.
    Baseline2d {
        /// MET window.
        met: MetBin,
        /// Zero-jet subset.
        jet_veto: bool,
    },
    /// EFT objects, photon pt × folded angle.
    Eft2d {
        /// MET window.
        met: MetBin,
        /// Zero-jet subset.
        jet_veto: bool,
    },
    /// EFT zero-jet region, one folded-angle slice.
    EftPhiSlice(usize),
}

/// Index of the folded-angle slice `(kπ/6, (k+1)π/6]` containing `abs_phi`.
pub fn phi_slice(abs_phi: f64) -> Option<usize> {
    PHI_SLICES.windows(2).position(|w| abs_phi > w[0] && abs_phi <= w[1])
}

/// Build the observables of one event, or the reason it has none.
pub fn build_observables(
    event: &dyn EventView,
    config: &WGammaConfig,
) -> std::result::Result<WGammaObservables, VetoReason> {
    let cuts = &config.cuts;
    let l0 = leading(event.leptons()).ok_or(VetoReason::NoLepton)?;
    let p0 = leading_isolated_from(event.photons(), &l0.momentum, cuts.lepton_photon_dr)
        .ok_or(VetoReason::NoPhoton)?;
    let n0 = leading(event.neutrinos()).ok_or(VetoReason::NoNeutrino)?;
    let met = event.missing_momentum();

    let jets = select_jets(event.jets(), &cuts.jets, &[l0.momentum, p0.momentum]);

    let iso = match config.isolation {
        IsolationSource::NonPrompt => frixione_isolation(
            &p0.momentum,
            event
                .isolation_particles()
                .iter()
                .filter(|p| !p.from_tau && **p != l0 && **p != p0 && **p != n0)
                .map(|p| p.momentum),
            cuts.photon_iso_dr,
        ),
        IsolationSource::Partons => frixione_isolation(
            &p0.momentum,
            event.outgoing_partons().iter().map(|p| p.momentum),
            cuts.photon_iso_dr,
        ),
    };

    let (true_phi, true_phi_f) =
        match DecayFrame::new(&l0.momentum, l0.charge, &n0.momentum, &p0.momentum) {
            Ok(frame) => (Some(frame.phi()), Some(frame.folded_phi())),
            Err(e) => {
                log::debug!("wgamma: no decay angle: {e}");
                (None, None)
            }
        };

    Ok(WGammaObservables {
        l0_pt: l0.pt(),
        l0_eta: l0.eta(),
        l0_phi: l0.phi(),
        l0_mass: l0.momentum.mass(),
        l0_charge: l0.charge,
        l0_abs_pid: l0.abs_pid(),
        p0_pt: p0.pt(),
        p0_eta: p0.eta(),
        p0_phi: p0.phi(),
        p0_mass: p0.momentum.mass(),
        p0_frixione: iso.passed,
        p0_frixione_sum: iso.sum,
        n0_pt: n0.pt(),
        n0_eta: n0.eta(),
        n0_phi: n0.phi(),
        n0_mass: n0.momentum.mass(),
        met_pt: met.pt(),
        met_phi: met.phi(),
        l0p0_dr: delta_r(&l0.momentum, &p0.momentum),
        l0p0_deta: l0.eta() - p0.eta(),
        mt_cluster: mt_cluster(&l0.momentum, &p0.momentum, &met),
        n_jets: jets.len(),
        true_phi,
        true_phi_f,
    })
}

/// Every region whose predicate holds for `obs`.
pub fn regions(obs: &WGammaObservables, cuts: &WGammaCuts) -> Vec<WGammaRegion> {
    let lepton_ok = |pt: f64| obs.l0_pt > pt && obs.l0_eta.abs() < cuts.lepton_abs_eta;
    let photon_ok =
        |pt: f64| obs.p0_pt > pt && obs.p0_eta.abs() < cuts.photon_abs_eta && obs.p0_frixione;
    let no_jets = obs.n_jets == 0;
    let mut out = Vec::new();

    let baseline_objects =
        lepton_ok(cuts.lepton_pt) && photon_ok(cuts.photon_pt) && obs.l0p0_dr > cuts.lepton_photon_dr;
    if baseline_objects && obs.met_pt > cuts.missing_pt {
        out.push(WGammaRegion::Baseline);
        if no_jets && obs.mt_cluster > cuts.raz_mt_cluster {
            out.push(WGammaRegion::BaselineRaz);
        }
    }
    if baseline_objects && obs.met_pt > 0.0 {
        let met = if obs.met_pt <= cuts.missing_pt { MetBin::Met1 } else { MetBin::Main };
        out.push(WGammaRegion::Baseline2d { met, jet_veto: false });
        if no_jets {
            out.push(WGammaRegion::Baseline2d { met, jet_veto: true });
        }
    }

    let eft_objects = lepton_ok(cuts.eft_lepton_pt) && photon_ok(cuts.eft_photon_pt);
    if eft_objects
        && obs.l0p0_dr > cuts.eft_lepton_photon_dr
        && obs.met_pt > cuts.eft_missing_pt_met1
    {
        let met = if obs.met_pt <= cuts.eft_missing_pt { MetBin::Met1 } else { MetBin::Main };
        out.push(WGammaRegion::Eft2d { met, jet_veto: false });
        if no_jets {
            out.push(WGammaRegion::Eft2d { met, jet_veto: true });
        }
    }
    if eft_objects
        && obs.l0p0_dr > cuts.lepton_photon_dr
        && obs.met_pt > cuts.missing_pt
        && no_jets
        && let Some(k) = obs.true_phi_f.and_then(phi_slice)
    {
        out.push(WGammaRegion::EftPhiSlice(k));
    }
    out
}

/// Accumulators of the W(ℓν)γ analysis.
#[derive(Debug, Clone)]
pub struct WGammaHistograms {
    /// Baseline photon pt.
    pub baseline_photon_pt: Histo1D,
    /// Baseline photon η.
    pub baseline_photon_eta: Histo1D,
    /// Baseline ΔR(ℓ, γ).
    pub baseline_leppho_dr: Histo1D,
    /// Baseline η(ℓ) − η(γ).
    pub baseline_leppho_deta: Histo1D,
    /// Baseline mTcluster.
    pub baseline_mt_cluster: Histo1D,
    /// Baseline jet multiplicity, capped at 2.
    pub baseline_njet: Histo1D,
    /// Radiation-amplitude-zero η(ℓ) − η(γ).
    pub raz_leppho_deta: Histo1D,
    /// EFT photon pt per folded-angle slice.
    pub eft_photon_pt_phi: [Histo1D; 3],
    /// Baseline 2D, MET above the split.
    pub baseline_main: Histo2D,
    /// Baseline 2D, MET above the split, no jets.
    pub baseline_main_jveto: Histo2D,
    /// Baseline 2D, low MET.
    pub baseline_met1: Histo2D,
    /// Baseline 2D, low MET, no jets.
    pub baseline_met1_jveto: Histo2D,
    /// EFT 2D, MET above the split.
    pub eft_main: Histo2D,
    /// EFT 2D, MET above the split, no jets.
    pub eft_main_jveto: Histo2D,
    /// EFT 2D, low MET.
    pub eft_met1: Histo2D,
    /// EFT 2D, low MET, no jets.
    pub eft_met1_jveto: Histo2D,
}

impl WGammaHistograms {
    /// Book every accumulator; fails on invalid edges.
    pub fn new(b: &WGammaBinning) -> Result<Self> {
        let h1 = |name: &str, edges: &[f64]| Histo1D::new(name, edges.to_vec());
        let h2 = |name: &str| Histo2D::new(name, b.eft_photon_pt.clone(), b.eft_phi.clone());
        Ok(Self {
            baseline_photon_pt: h1("baseline_photon_pt", &b.photon_pt)?,
            baseline_photon_eta: h1("baseline_photon_eta", &b.photon_eta)?,
            baseline_leppho_dr: h1("baseline_leppho_dr", &b.leppho_dr)?,
            baseline_leppho_deta: h1("baseline_leppho_deta", &b.leppho_deta)?,
            baseline_mt_cluster: h1("baseline_mt_cluster", &b.mt_cluster)?,
            baseline_njet: h1("baseline_njet", &b.njet)?,
            raz_leppho_deta: h1("raz_leppho_deta", &b.raz_leppho_deta)?,
            eft_photon_pt_phi: [
                h1("eft_photon_pt_phi_0", &b.eft_photon_pt)?,
                h1("eft_photon_pt_phi_1", &b.eft_photon_pt)?,
                h1("eft_photon_pt_phi_2", &b.eft_photon_pt)?,
            ],
            baseline_main: h2("baseline_main_photon_pt_phi")?,
            baseline_main_jveto: h2("baseline_main_photon_pt_phi_jveto")?,
            baseline_met1: h2("baseline_met1_photon_pt_phi")?,
            baseline_met1_jveto: h2("baseline_met1_photon_pt_phi_jveto")?,
            eft_main: h2("eft_main_photon_pt_phi")?,
            eft_main_jveto: h2("eft_main_photon_pt_phi_jveto")?,
            eft_met1: h2("eft_met1_photon_pt_phi")?,
            eft_met1_jveto: h2("eft_met1_photon_pt_phi_jveto")?,
        })
    }

    fn histo_2d(&mut self, eft: bool, met: MetBin, jet_veto: bool) -> &mut Histo2D {
        match (eft, met, jet_veto) {
            (false, MetBin::Main, false) => &mut self.baseline_main,
            (false, MetBin::Main, true) => &mut self.baseline_main_jveto,
            (false, MetBin::Met1, false) => &mut self.baseline_met1,
            (false, MetBin::Met1, true) => &mut self.baseline_met1_jveto,
            (true, MetBin::Main, false) => &mut self.eft_main,
            (true, MetBin::Main, true) => &mut self.eft_main_jveto,
            (true, MetBin::Met1, false) => &mut self.eft_met1,
            (true, MetBin::Met1, true) => &mut self.eft_met1_jveto,
        }
    }

    /// Route one event's observables into the accumulators of `region`.
    pub fn fill(&mut self, region: WGammaRegion, obs: &WGammaObservables, weight: f64) {
        match region {
            WGammaRegion::Baseline => {
                self.baseline_photon_pt.fill(obs.p0_pt, weight);
                self.baseline_photon_eta.fill(obs.p0_eta, weight);
                self.baseline_leppho_dr.fill(obs.l0p0_dr, weight);
                self.baseline_leppho_deta.fill(obs.l0p0_deta, weight);
                self.baseline_mt_cluster.fill(obs.mt_cluster, weight);
                self.baseline_njet.fill(obs.n_jets.min(2) as f64, weight);
            }
            WGammaRegion::BaselineRaz => self.raz_leppho_deta.fill(obs.l0p0_deta, weight),
            WGammaRegion::Baseline2d { met, jet_veto } => {
                if let Some(phi) = obs.true_phi_f {
                    self.histo_2d(false, met, jet_veto).fill(obs.p0_pt, phi, weight);
                }
            }
            WGammaRegion::Eft2d { met, jet_veto } => {
                if let Some(phi) = obs.true_phi_f {
                    self.histo_2d(true, met, jet_veto).fill(obs.p0_pt, phi, weight);
                }
            }
            WGammaRegion::EftPhiSlice(k) => self.eft_photon_pt_phi[k].fill(obs.p0_pt, weight),
        }
    }

    fn all_1d(&self) -> Vec<&Histo1D> {
        let mut v = vec![
            &self.baseline_photon_pt,
            &self.baseline_photon_eta,
            &self.baseline_leppho_dr,
            &self.baseline_leppho_deta,
            &self.baseline_mt_cluster,
            &self.baseline_njet,
            &self.raz_leppho_deta,
        ];
        v.extend(self.eft_photon_pt_phi.iter());
        v
    }

    fn all_1d_mut(&mut self) -> Vec<&mut Histo1D> {
        let mut v = vec![
            &mut self.baseline_photon_pt,
            &mut self.baseline_photon_eta,
            &mut self.baseline_leppho_dr,
            &mut self.baseline_leppho_deta,
            &mut self.baseline_mt_cluster,
            &mut self.baseline_njet,
            &mut self.raz_leppho_deta,
        ];
        v.extend(self.eft_photon_pt_phi.iter_mut());
        v
    }

    fn all_2d(&self) -> Vec<&Histo2D> {
        vec![
            &self.baseline_main,
            &self.baseline_main_jveto,
            &self.baseline_met1,
            &self.baseline_met1_jveto,
            &self.eft_main,
            &self.eft_main_jveto,
            &self.eft_met1,
            &self.eft_met1_jveto,
        ]
    }

    fn all_2d_mut(&mut self) -> Vec<&mut Histo2D> {
        vec![
            &mut self.baseline_main,
            &mut self.baseline_main_jveto,
            &mut self.baseline_met1,
            &mut self.baseline_met1_jveto,
            &mut self.eft_main,
            &mut self.eft_main_jveto,
            &mut self.eft_met1,
            &mut self.eft_met1_jveto,
        ]
    }
}

/// The W(ℓν)γ analysis.
#[derive(Debug, Clone)]
pub struct WGamma {
    config: WGammaConfig,
    histos: WGammaHistograms,
    finalized: FinalizeState,
}

impl WGamma {
    /// Book the analysis; fails on invalid bin edges.
    pub fn new(config: WGammaConfig) -> Result<Self> {
        let histos = WGammaHistograms::new(&config.binning)?;
        Ok(Self { config, histos, finalized: FinalizeState::default() })
    }

    /// Active configuration.
    pub fn config(&self) -> &WGammaConfig {
        &self.config
    }

    /// Accumulators.
    pub fn histograms(&self) -> &WGammaHistograms {
        &self.histos
    }
}

impl Analysis for WGamma {
    fn name(&self) -> &'static str {
        "wgamma"
    }

    fn analyze(&mut self, event: &dyn EventView) -> Disposition {
        let obs = match build_observables(event, &self.config) {
            Ok(obs) => obs,
            Err(reason) => return reason.into(),
        };
        let regions = regions(&obs, &self.config.cuts);
        if regions.is_empty() {
            return VetoReason::Kinematic.into();
        }
        let weight = event.weight();
        for region in regions {
            self.histos.fill(region, &obs, weight);
        }
        Disposition::Accepted
    }

    fn finalize(&mut self, run: &RunSummary) {
        self.finalized.begin(self.name());
        let sf = self.config.flavor_factor * run.cross_section_scale();
        for h in self.histos.all_1d_mut() {
            h.scale(sf);
        }
        for h in self.histos.all_2d_mut() {
            h.scale(sf);
        }
        // the slices are really 2D: divide by the angular width
        for h in &mut self.histos.eft_photon_pt_phi {
            h.scale(1.0 / FRAC_PI_6);
        }
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        merge_1d(self.histos.all_1d_mut(), other.histos.all_1d())?;
        merge_2d(self.histos.all_2d_mut(), other.histos.all_2d())
    }

    fn outputs(&self) -> Vec<Output> {
        let mut out: Vec<Output> = self.histos.all_1d().into_iter().cloned().map(Output::from).collect();
        out.extend(self.histos.all_2d().into_iter().cloned().map(Output::from));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fk_core::{Event, FourMomentum, Particle};

    fn obs() -> WGammaObservables {
        WGammaObservables {
            l0_pt: 100.0,
            l0_eta: 0.1,
            p0_pt: 200.0,
            p0_eta: -0.2,
            p0_frixione: true,
            met_pt: 90.0,
            l0p0_dr: 3.2,
            mt_cluster: 400.0,
            n_jets: 0,
            true_phi_f: Some(0.9),
            ..WGammaObservables::default()
        }
    }

    fn event() -> Event {
        let lep = FourMomentum::from_pt_eta_phi_m(40.0, 0.0, 0.0, 0.0);
        let pho = FourMomentum::from_pt_eta_phi_m(35.0, 0.0, 1.0, 0.0);
        let nu = FourMomentum::from_pt_eta_phi_m(45.0, 0.3, -2.5, 0.0);
        Event {
            leptons: vec![Particle::new(lep, 11, -1)],
            photons: vec![Particle::new(pho, 22, 0)],
            neutrinos: vec![Particle::new(nu, -12, 0)],
            met: [nu.px, nu.py],
            ..Event::default()
        }
    }

    #[test]
    fn test_phi_slice_edges() {
        assert_eq!(phi_slice(0.0), None);
        assert_eq!(phi_slice(1e-6), Some(0));
        assert_eq!(phi_slice(FRAC_PI_6), Some(0));
        assert_eq!(phi_slice(FRAC_PI_6 + 1e-9), Some(1));
        assert_eq!(phi_slice(FRAC_PI_2), Some(2));
        assert_eq!(phi_slice(FRAC_PI_2 + 1e-9), None);
    }

    #[test]
    fn test_regions_eft_event() {
        let r = regions(&obs(), &WGammaCuts::default());
        assert!(r.contains(&WGammaRegion::Baseline));
        assert!(r.contains(&WGammaRegion::BaselineRaz));
        assert!(r.contains(&WGammaRegion::Baseline2d { met: MetBin::Main, jet_veto: true }));
        assert!(r.contains(&WGammaRegion::Eft2d { met: MetBin::Main, jet_veto: false }));
        assert!(r.contains(&WGammaRegion::Eft2d { met: MetBin::Main, jet_veto: true }));
        assert!(r.contains(&WGammaRegion::EftPhiSlice(1)));
        assert_eq!(r.len(), 7);
    }

    #[test]
    fn test_regions_low_met_with_jet() {
        let o = WGammaObservables { met_pt: 60.0, n_jets: 1, ..obs() };
        let r = regions(&o, &WGammaCuts::default());
        assert_eq!(
            r,
            vec![
                WGammaRegion::Baseline,
                WGammaRegion::Baseline2d { met: MetBin::Main, jet_veto: false },
                WGammaRegion::Eft2d { met: MetBin::Met1, jet_veto: false },
            ]
        );
    }

    #[test]
    fn test_regions_fail_isolation() {
        let o = WGammaObservables { p0_frixione: false, ..obs() };
        assert!(regions(&o, &WGammaCuts::default()).is_empty());
    }

    #[test]
    fn test_regions_without_angle() {
        let o = WGammaObservables { true_phi_f: None, ..obs() };
        let r = regions(&o, &WGammaCuts::default());
        assert!(!r.iter().any(|x| matches!(x, WGammaRegion::EftPhiSlice(_))));
    }

    #[test]
    fn test_missing_objects_veto() {
        let mut a = WGamma::new(WGammaConfig::default()).unwrap();
        let mut ev = event();
        ev.neutrinos.clear();
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::NoNeutrino));

        // photon too close to the lepton
        let mut ev = event();
        ev.photons[0].momentum = FourMomentum::from_pt_eta_phi_m(35.0, 0.0, 0.5, 0.0);
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::NoPhoton));

        let mut ev = event();
        ev.leptons.clear();
        assert_eq!(a.analyze(&ev), Disposition::Vetoed(VetoReason::NoLepton));
        assert_eq!(a.histograms().baseline_photon_pt.entries, 0);
    }

    #[test]
    fn test_isolation_uses_non_tau_particles() {
        let mut ev = event();
        let pho = ev.photons[0].momentum;
        let near = FourMomentum::from_pt_eta_phi_m(30.0, 0.05, pho.phi() + 0.05, 0.0);
        let mut hadron = Particle::new(near, 211, 1);
        hadron.is_prompt = false;
        hadron.from_tau = true;
        ev.isolation_particles = vec![hadron];
        let cfg = WGammaConfig::default();
        assert!(build_observables(&ev, &cfg).unwrap().p0_frixione);

        ev.isolation_particles[0].from_tau = false;
        let o = build_observables(&ev, &cfg).unwrap();
        assert!(!o.p0_frixione);
        assert_relative_eq!(o.p0_frixione_sum, 30.0, epsilon = 1e-9);

        let parton_cfg = WGammaConfig { isolation: IsolationSource::Partons, ..cfg };
        assert!(build_observables(&ev, &parton_cfg).unwrap().p0_frixione);
    }

    #[test]
    fn test_observables_of_event() {
        let o = build_observables(&event(), &WGammaConfig::default()).unwrap();
        assert_relative_eq!(o.l0p0_dr, 1.0, epsilon = 1e-9);
        assert_relative_eq!(o.met_pt, 45.0, epsilon = 1e-9);
        assert_eq!(o.l0_charge, -1);
        assert_eq!(o.l0_abs_pid, 11);
        assert_eq!(o.n_jets, 0);
        let phi_f = o.true_phi_f.unwrap();
        assert!((0.0..=FRAC_PI_2).contains(&phi_f));
    }

    #[test]
    fn test_finalize_scales_slices_by_angular_width() {
        let mut a = WGamma::new(WGammaConfig { flavor_factor: 1.5, ..WGammaConfig::default() }).unwrap();
        let o = obs();
        a.histos.fill(WGammaRegion::EftPhiSlice(0), &o, 1.0);
        a.histos.fill(WGammaRegion::Baseline, &o, 1.0);
        a.finalize(&RunSummary { cross_section: 10.0, sum_of_weights: 2.0, n_events: 2 });
        // 200 GeV: bin 1 of the EFT binning, bin 5 of the baseline one
        let slice = &a.histograms().eft_photon_pt_phi[0];
        assert_relative_eq!(slice.bin_content[1], 7.5 * 6.0 / std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(a.histograms().baseline_photon_pt.bin_content[5], 7.5, epsilon = 1e-12);
    }

    #[test]
    fn test_merge_replicas() {
        let proto = WGamma::new(WGammaConfig::default()).unwrap();
        let mut a = proto.clone();
        let mut b = proto.clone();
        a.analyze(&event());
        b.analyze(&event());
        a.merge(&b).unwrap();
        assert_eq!(a.histograms().baseline_photon_pt.bin_entries[0], 2);
        assert_eq!(a.outputs().len(), 18);
    }
}
