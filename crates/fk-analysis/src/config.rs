//! Analysis selection by name and configuration loading.

use fk_core::{Error, EventView, Result};
use fk_hist::Output;
use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::diboson::{Diboson, DibosonConfig};
use crate::disposition::Disposition;
use crate::finalize::RunSummary;
use crate::single_top::{SingleTop, SingleTopConfig};
use crate::wgamma::{WGamma, WGammaConfig};
use crate::zvv::{ZvvConfig, ZvvTemplate};

/// Configuration of any analysis, tagged by name.
///
/// ```json
/// {"analysis": "wgamma", "flavor_factor": 1.5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisConfig {
    /// W(ℓν)γ.
    Wgamma(WGammaConfig),
    /// WW → eμ.
    Diboson(DibosonConfig),
    /// t-channel single top.
    SingleTop(SingleTopConfig),
    /// Z → νν template.
    ZvvTemplate(ZvvConfig),
}

impl AnalysisConfig {
    /// Names accepted by [`default_for`](Self::default_for).
    pub fn names() -> &'static [&'static str] {
        &["wgamma", "diboson", "single_top", "zvv_template"]
    }

    /// Published defaults of the analysis called `name`.
    pub fn default_for(name: &str) -> Result<Self> {
        match name {
            "wgamma" => Ok(Self::Wgamma(WGammaConfig::default())),
            "diboson" => Ok(Self::Diboson(DibosonConfig::default())),
            "single_top" => Ok(Self::SingleTop(SingleTopConfig::default())),
            "zvv_template" => Ok(Self::ZvvTemplate(ZvvConfig::default())),
            other => Err(Error::Validation(format!(
                "unknown analysis '{other}' (expected one of: {})",
                Self::names().join(", ")
            ))),
        }
    }

    /// Name of the configured analysis.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wgamma(_) => "wgamma",
            Self::Diboson(_) => "diboson",
            Self::SingleTop(_) => "single_top",
            Self::ZvvTemplate(_) => "zvv_template",
        }
    }

    /// Book the analysis; fails on invalid bin edges.
    pub fn build(self) -> Result<AnyAnalysis> {
        Ok(match self {
            Self::Wgamma(c) => AnyAnalysis::Wgamma(WGamma::new(c)?),
            Self::Diboson(c) => AnyAnalysis::Diboson(Diboson::new(c)?),
            Self::SingleTop(c) => AnyAnalysis::SingleTop(SingleTop::new(c)?),
            Self::ZvvTemplate(c) => AnyAnalysis::ZvvTemplate(ZvvTemplate::new(c)?),
        })
    }
}

/// Any booked analysis.
#[derive(Debug, Clone)]
pub enum AnyAnalysis {
    /// W(ℓν)γ.
    Wgamma(WGamma),
    /// WW → eμ.
    Diboson(Diboson),
    /// t-channel single top.
    SingleTop(SingleTop),
    /// Z → νν template.
    ZvvTemplate(ZvvTemplate),
}

impl Analysis for AnyAnalysis {
    fn name(&self) -> &'static str {
        match self {
            Self::Wgamma(a) => a.name(),
            Self::Diboson(a) => a.name(),
            Self::SingleTop(a) => a.name(),
            Self::ZvvTemplate(a) => a.name(),
        }
    }

    fn analyze(&mut self, event: &dyn EventView) -> Disposition {
        match self {
            Self::Wgamma(a) => a.analyze(event),
            Self::Diboson(a) => a.analyze(event),
            Self::SingleTop(a) => a.analyze(event),
            Self::ZvvTemplate(a) => a.analyze(event),
        }
    }

    fn finalize(&mut self, run: &RunSummary) {
        match self {
            Self::Wgamma(a) => a.finalize(run),
            Self::Diboson(a) => a.finalize(run),
            Self::SingleTop(a) => a.finalize(run),
            Self::ZvvTemplate(a) => a.finalize(run),
        }
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        match (self, other) {
            (Self::Wgamma(a), Self::Wgamma(b)) => a.merge(b),
            (Self::Diboson(a), Self::Diboson(b)) => a.merge(b),
            (Self::SingleTop(a), Self::SingleTop(b)) => a.merge(b),
            (Self::ZvvTemplate(a), Self::ZvvTemplate(b)) => a.merge(b),
            (a, b) => Err(Error::Validation(format!(
                "cannot merge '{}' into '{}'",
                b.name(),
                a.name()
            ))),
        }
    }

    fn outputs(&self) -> Vec<Output> {
        match self {
            Self::Wgamma(a) => a.outputs(),
            Self::Diboson(a) => a.outputs(),
            Self::SingleTop(a) => a.outputs(),
            Self::ZvvTemplate(a) => a.outputs(),
        }
    }
}
