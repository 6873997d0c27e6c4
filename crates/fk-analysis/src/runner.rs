//! Event loop driver: totals, cut flow and the parallel fold/merge path.

use std::collections::BTreeMap;

use fk_core::{Error, EventView, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::Analysis;
use crate::disposition::{Disposition, VetoReason};
use crate::finalize::{RunInfo, RunSummary, RunTotals};

/// Per-reason event counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CutFlow {
    /// Events seen.
    pub processed: u64,
    /// Events accepted by the main selection.
    pub accepted: u64,
    /// Vetoed events by reason.
    pub vetoed: BTreeMap<VetoReason, u64>,
}

impl CutFlow {
    /// Count one disposition.
    pub fn record(&mut self, disposition: Disposition) {
        self.processed += 1;
        match disposition {
            Disposition::Accepted => self.accepted += 1,
            Disposition::Vetoed(reason) => *self.vetoed.entry(reason).or_default() += 1,
        }
    }

    /// Add another worker's counts.
    pub fn merge(&mut self, other: &CutFlow) {
        self.processed += other.processed;
        self.accepted += other.accepted;
        for (reason, n) in &other.vetoed {
            *self.vetoed.entry(*reason).or_default() += n;
        }
    }
}

/// Drives one analysis over a stream of events.
#[derive(Debug, Clone)]
pub struct Runner<A> {
    analysis: A,
    totals: RunTotals,
    cut_flow: CutFlow,
}

impl<A: Analysis> Runner<A> {
    /// Wrap a freshly booked analysis.
    pub fn new(analysis: A) -> Self {
        Self { analysis, totals: RunTotals::default(), cut_flow: CutFlow::default() }
    }

    /// Count the event weight and analyze the event.
    pub fn process(&mut self, event: &dyn EventView) -> Disposition {
        self.totals.record(event.weight());
        let disposition = self.analysis.analyze(event);
        if let Disposition::Vetoed(reason) = disposition {
            log::debug!("{}: event {} vetoed: {reason}", self.analysis.name(), self.totals.n_events);
        }
        self.cut_flow.record(disposition);
        disposition
    }

    /// Add another runner's accumulators, totals and cut flow.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.analysis.merge(&other.analysis)?;
        self.totals.merge(&other.totals);
        self.cut_flow.merge(&other.cut_flow);
        Ok(())
    }

    /// Run the finalization pass with the totals seen so far.
    pub fn finalize(&mut self, info: &RunInfo) -> RunSummary {
        let summary = RunSummary::new(info, &self.totals);
        log::debug!(
            "{}: finalizing {} events, sumw = {}, xs = {}",
            self.analysis.name(),
            summary.n_events,
            summary.sum_of_weights,
            summary.cross_section
        );
        self.analysis.finalize(&summary);
        summary
    }

    /// The wrapped analysis.
    pub fn analysis(&self) -> &A {
        &self.analysis
    }

    /// Event totals.
    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Cut flow.
    pub fn cut_flow(&self) -> &CutFlow {
        &self.cut_flow
    }

    /// Unwrap the analysis.
    pub fn into_analysis(self) -> A {
        self.analysis
    }
}

/// Process `events` on the current rayon pool and merge the per-worker replicas.
///
/// Every worker starts from a clone of the unfilled `prototype`. The result is
/// not finalized.
pub fn run_parallel<A, E>(prototype: &A, events: &[E]) -> Result<Runner<A>>
where
    A: Analysis + Clone + Sync,
    E: EventView + Sync,
{
    events
        .par_iter()
        .fold(
            || Runner::new(prototype.clone()),
            |mut runner, event| {
                runner.process(event);
                runner
            },
        )
        .map(Ok::<_, Error>)
        .try_reduce(
            || Runner::new(prototype.clone()),
            |mut a, b| {
                a.merge(&b)?;
                Ok(a)
            },
        )
}
