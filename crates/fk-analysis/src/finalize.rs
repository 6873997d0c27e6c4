//! Run-level inputs to the finalization pass and the cross-section scale rule.

use serde::{Deserialize, Serialize};

/// Run-level information supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Integrated cross section in the unit the outputs should carry;
    /// negative when unknown.
    pub cross_section: f64,
}

impl RunInfo {
    /// Cross section not available.
    pub const UNKNOWN: RunInfo = RunInfo { cross_section: -1.0 };
}

/// Event counters accumulated while processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Events processed.
    pub n_events: u64,
    /// Sum of event weights.
    pub sum_of_weights: f64,
    /// Sum of squared event weights.
    pub sum_of_weights2: f64,
}

impl RunTotals {
    /// Count one event.
    pub fn record(&mut self, weight: f64) {
        self.n_events += 1;
        self.sum_of_weights += weight;
        self.sum_of_weights2 += weight * weight;
    }

    /// Add another worker's totals.
    pub fn merge(&mut self, other: &RunTotals) {
        self.n_events += other.n_events;
        self.sum_of_weights += other.sum_of_weights;
        self.sum_of_weights2 += other.sum_of_weights2;
    }
}

/// Everything the finalization pass needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Cross section; negative when unknown.
    pub cross_section: f64,
    /// Sum of event weights.
    pub sum_of_weights: f64,
    /// Events processed.
    pub n_events: u64,
}

impl RunSummary {
    /// Combine host information with processed totals.
    pub fn new(info: &RunInfo, totals: &RunTotals) -> Self {
        Self {
            cross_section: info.cross_section,
            sum_of_weights: totals.sum_of_weights,
            n_events: totals.n_events,
        }
    }

    /// Factor turning summed weights into a cross section.
    ///
    /// `cross_section / sum_of_weights`; `1 / n_events` when the cross section
    /// is negative; `1` (with a warning) when the denominator is zero.
    pub fn cross_section_scale(&self) -> f64 {
        if self.cross_section < 0.0 {
            if self.n_events == 0 {
                log::warn!("cross section unknown and no events processed; not scaling");
                return 1.0;
            }
            return 1.0 / self.n_events as f64;
        }
        if self.sum_of_weights == 0.0 {
            log::warn!("sum of weights is zero; not scaling");
            return 1.0;
        }
        self.cross_section / self.sum_of_weights
    }
}

/// Tracks whether an analysis was already finalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeState {
    calls: u32,
}

impl FinalizeState {
    /// Record a finalize call for `analysis`; warns from the second call on.
    pub fn begin(&mut self, analysis: &str) {
        self.calls += 1;
        if self.calls > 1 {
            log::warn!("{analysis}: finalize called {} times; scaling is applied again", self.calls);
        }
    }

    /// True once finalize ran at least once.
    pub fn is_finalized(&self) -> bool {
        self.calls > 0
    }
}
