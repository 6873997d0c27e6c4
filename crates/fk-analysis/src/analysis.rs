//! The per-event analysis interface.

use fk_core::{Error, EventView, Result};
use fk_hist::{Histo1D, Histo2D, Output};

use crate::disposition::Disposition;
use crate::finalize::RunSummary;

/// A fiducial analysis: per-event selection and routing, then one finalization pass.
///
/// Implementations own their accumulators as named fields. Parallel runs clone
/// an unfilled instance per worker and [`merge`](Analysis::merge) the replicas
/// before finalizing.
pub trait Analysis: Send {
    /// Identifier used in outputs and logs.
    fn name(&self) -> &'static str;

    /// Select, reconstruct and fill for one event.
    fn analyze(&mut self, event: &dyn EventView) -> Disposition;

    /// Convert summed weights into the published normalization.
    ///
    /// Every call rescales again; calling it twice is a caller error that is
    /// logged, not prevented.
    fn finalize(&mut self, run: &RunSummary);

    /// Add another replica's accumulators into this one.
    fn merge(&mut self, other: &Self) -> Result<()>
    where
        Self: Sized;

    /// Snapshots of every accumulator, in a stable order.
    fn outputs(&self) -> Vec<Output>;
}

/// Add `src` histograms into `dst` pairwise.
pub(crate) fn merge_1d(dst: Vec<&mut Histo1D>, src: Vec<&Histo1D>) -> Result<()> {
    if dst.len() != src.len() {
        return Err(Error::Validation(format!(
            "cannot merge {} histograms into {}",
            src.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.into_iter().zip(src) {
        d.add(s)?;
    }
    Ok(())
}

/// Add `src` 2D histograms into `dst` pairwise.
pub(crate) fn merge_2d(dst: Vec<&mut Histo2D>, src: Vec<&Histo2D>) -> Result<()> {
    if dst.len() != src.len() {
        return Err(Error::Validation(format!(
            "cannot merge {} histograms into {}",
            src.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.into_iter().zip(src) {
        d.add(s)?;
    }
    Ok(())
}
