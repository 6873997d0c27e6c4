//! Z → νν template: boson pt from the summed invisible momenta.

use fk_core::{EventView, FourMomentum, Result};
use fk_hist::{Accumulator, Histo1D, Output};
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, merge_1d};
use crate::disposition::{Disposition, VetoReason};
use crate::finalize::{FinalizeState, RunSummary};

/// Configuration of the Z → νν template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZvvConfig {
    /// Minimum boson pt (exclusive).
    pub pt_min: f64,
    /// Fill values are capped just below the last published edge.
    pub pt_cap: f64,
    /// Edges of the absolute and normalized spectra.
    pub z_pt: Vec<f64>,
    /// Bins of the uniform spectrum.
    pub uniform_bins: usize,
    /// Lower edge of the uniform spectrum.
    pub uniform_lo: f64,
    /// Upper edge of the uniform spectrum.
    pub uniform_hi: f64,
}

impl Default for ZvvConfig {
    fn default() -> Self {
        Self {
            pt_min: 200.0,
            pt_cap: 1499.999,
            z_pt: vec![200.0, 250.0, 300.0, 350.0, 400.0, 500.0, 600.0, 800.0, 1000.0, 1500.0],
            uniform_bins: 80,
            uniform_lo: 200.0,
            uniform_hi: 1000.0,
        }
    }
}

/// Accumulators of the Z → νν template.
#[derive(Debug, Clone)]
pub struct ZvvHistograms {
    /// Cross-section normalized boson pt.
    pub z_pt: Histo1D,
    /// Width-weighted, unit-integral boson pt.
    pub z_pt_norm: Histo1D,
    /// Uniformly binned boson pt.
    pub pt_z: Histo1D,
}

/// The Z → νν template analysis.
///
/// The boson pt sums the prompt neutrinos only; neutrinos flagged non-prompt
/// (hadron decays) never enter it.
#[derive(Debug, Clone)]
pub struct ZvvTemplate {
    config: ZvvConfig,
    histos: ZvvHistograms,
    finalized: FinalizeState,
}

impl ZvvTemplate {
    /// Book the analysis; fails on invalid bin edges.
    pub fn new(config: ZvvConfig) -> Result<Self> {
        let histos = ZvvHistograms {
            z_pt: Histo1D::new("h_Z_pt", config.z_pt.clone())?,
            z_pt_norm: Histo1D::new("h_Z_pt_norm", config.z_pt.clone())?,
            pt_z: Histo1D::uniform("pT_Z", config.uniform_bins, config.uniform_lo, config.uniform_hi)?,
        };
        Ok(Self { config, histos, finalized: FinalizeState::default() })
    }

    /// Active configuration.
    pub fn config(&self) -> &ZvvConfig {
        &self.config
    }

    /// Accumulators.
    pub fn histograms(&self) -> &ZvvHistograms {
        &self.histos
    }

    fn all(&self) -> Vec<&Histo1D> {
        vec![&self.histos.z_pt, &self.histos.z_pt_norm, &self.histos.pt_z]
    }

    fn all_mut(&mut self) -> Vec<&mut Histo1D> {
        let h = &mut self.histos;
        vec![&mut h.z_pt, &mut h.z_pt_norm, &mut h.pt_z]
    }
}

impl Analysis for ZvvTemplate {
    fn name(&self) -> &'static str {
        "zvv_template"
    }

    fn analyze(&mut self, event: &dyn EventView) -> Disposition {
        let mut prompt = event.neutrinos().iter().filter(|n| n.is_prompt).peekable();
        if prompt.peek().is_none() {
            return VetoReason::NoNeutrino.into();
        }
        let invisible: FourMomentum = prompt.map(|n| n.momentum).sum();
        let pt = invisible.pt();
        if pt <= self.config.pt_min {
            return VetoReason::Kinematic.into();
        }
        let val = pt.min(self.config.pt_cap);
        let w = event.weight();
        for h in self.all_mut() {
            h.fill(val, w);
        }
        Disposition::Accepted
    }

    fn finalize(&mut self, run: &RunSummary) {
        self.finalized.begin(self.name());
        let sf = run.cross_section_scale();
        self.histos.z_pt.scale(sf);
        self.histos.pt_z.scale(sf);

        let norm = &mut self.histos.z_pt_norm;
        norm.multiply_by_bin_width();
        if norm.integral() > 0.0 {
            norm.normalize(1.0);
        }
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        merge_1d(self.all_mut(), other.all())
    }

    fn outputs(&self) -> Vec<Output> {
        self.all().into_iter().cloned().map(Output::from).collect()
    }
}
