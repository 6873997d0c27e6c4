//! # fk-analysis
//!
//! Fiducial analyses on top of [`fk_core::EventView`]: object selection,
//! per-event observables, region routing into [`fk_hist`] accumulators and the
//! run-level finalization (cross-section scaling, shape normalization, charge
//! ratios).
//!
//! ```no_run
//! use fk_analysis::{Analysis, AnalysisConfig, RunInfo, Runner};
//! use fk_core::Event;
//!
//! # fn main() -> fk_core::Result<()> {
//! let events: Vec<Event> = Vec::new();
//! let mut runner = Runner::new(AnalysisConfig::default_for("wgamma")?.build()?);
//! for ev in &events {
//!     runner.process(ev);
//! }
//! runner.finalize(&RunInfo { cross_section: 100.0 });
//! let outputs = runner.analysis().outputs();
//! # let _ = outputs;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod diboson;
pub mod disposition;
pub mod finalize;
pub mod observables;
pub mod reweight;
pub mod runner;
pub mod selection;
pub mod single_top;
pub mod wgamma;
pub mod zvv;

pub use analysis::Analysis;
pub use config::{AnalysisConfig, AnyAnalysis};
pub use diboson::{Diboson, DibosonConfig};
pub use disposition::{Disposition, VetoReason};
pub use finalize::{RunInfo, RunSummary, RunTotals};
pub use reweight::{correct_eft_weights, operator_count};
pub use runner::{CutFlow, Runner, run_parallel};
pub use single_top::{SingleTop, SingleTopConfig};
pub use wgamma::{WGamma, WGammaConfig};
pub use zvv::{ZvvConfig, ZvvTemplate};
