//! Weighted 1D histogram with under/overflow.

use fk_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::accumulator::Accumulator;
use crate::axis::{Axis, BinLocation};

/// Weighted 1D histogram.
///
/// Per bin it keeps the sum of weights, the sum of squared weights and the
/// raw fill count. Out-of-range fills go to the flow bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo1D {
    /// Histogram name.
    pub name: String,
    /// Bin edges.
    pub axis: Axis,
    /// Sum of weights per bin.
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Fill count per bin.
    pub bin_entries: Vec<u64>,
    /// Underflow sum of weights.
    pub underflow: f64,
    /// Overflow sum of weights.
    pub overflow: f64,
    /// Underflow sum of weights squared.
    pub underflow_sumw2: f64,
    /// Overflow sum of weights squared.
    pub overflow_sumw2: f64,
    /// Total fills, flows included.
    pub entries: u64,
}

impl Histo1D {
    /// Empty histogram on validated edges.
    pub fn new(name: impl Into<String>, edges: Vec<f64>) -> Result<Self> {
        Ok(Self::with_axis(name, Axis::new(edges)?))
    }

    /// Empty histogram with `n_bins` equal bins on `[lo, hi)`.
    pub fn uniform(name: impl Into<String>, n_bins: usize, lo: f64, hi: f64) -> Result<Self> {
        Ok(Self::with_axis(name, Axis::uniform(n_bins, lo, hi)?))
    }

    /// Empty histogram on an existing axis.
    pub fn with_axis(name: impl Into<String>, axis: Axis) -> Self {
        let n = axis.n_bins();
        Self {
            name: name.into(),
            axis,
            bin_content: vec![0.0; n],
            sumw2: vec![0.0; n],
            bin_entries: vec![0; n],
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: 0.0,
            overflow_sumw2: 0.0,
            entries: 0,
        }
    }

    /// Empty copy with a new name and the same binning.
    pub fn empty_like(&self, name: impl Into<String>) -> Self {
        Self::with_axis(name, self.axis.clone())
    }

    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.axis.n_bins()
    }

    /// Add `weight` at `val`. NaN values are dropped.
    pub fn fill(&mut self, val: f64, weight: f64) {
        match self.axis.find_bin(val) {
            BinLocation::Bin(i) => self.fill_bin(i, weight),
            BinLocation::Underflow => {
                self.underflow += weight;
                self.underflow_sumw2 += weight * weight;
                self.entries += 1;
            }
            BinLocation::Overflow => {
                self.overflow += weight;
                self.overflow_sumw2 += weight * weight;
                self.entries += 1;
            }
            BinLocation::Invalid => {
                log::debug!("{}: dropping NaN fill", self.name);
            }
        }
    }

    /// Add `weight` directly to in-range bin `i`; out-of-range indices go to overflow.
    pub fn fill_bin(&mut self, i: usize, weight: f64) {
        if i >= self.n_bins() {
            self.overflow += weight;
            self.overflow_sumw2 += weight * weight;
        } else {
            self.bin_content[i] += weight;
            self.sumw2[i] += weight * weight;
            self.bin_entries[i] += 1;
        }
        self.entries += 1;
    }

    /// Statistical error per bin, `sqrt(sumw2)`.
    pub fn errors(&self) -> Vec<f64> {
        self.sumw2.iter().map(|s| s.sqrt()).collect()
    }

    /// Width of bin `i`.
    pub fn bin_width(&self, i: usize) -> f64 {
        self.axis.width(i)
    }

    /// Sum of weights, optionally with the flow bins.
    pub fn sum_w(&self, include_flows: bool) -> f64 {
        let inner: f64 = self.bin_content.iter().sum();
        if include_flows { inner + self.underflow + self.overflow } else { inner }
    }

    /// Multiply each in-range bin by its width; flow bins are untouched.
    pub fn multiply_by_bin_width(&mut self) {
        for i in 0..self.n_bins() {
            let w = self.axis.width(i);
            self.bin_content[i] *= w;
            self.sumw2[i] *= w * w;
        }
    }

    /// Add another histogram with identical binning.
    pub fn add(&mut self, other: &Histo1D) -> Result<()> {
        if self.axis != other.axis {
            return Err(Error::Validation(format!(
                "cannot add '{}' to '{}': binning differs",
                other.name, self.name
            )));
        }
        for i in 0..self.n_bins() {
            self.bin_content[i] += other.bin_content[i];
            self.sumw2[i] += other.sumw2[i];
            self.bin_entries[i] += other.bin_entries[i];
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.underflow_sumw2 += other.underflow_sumw2;
        self.overflow_sumw2 += other.overflow_sumw2;
        self.entries += other.entries;
        Ok(())
    }

    /// `self + other` under a new name.
    pub fn sum(&self, other: &Histo1D, name: impl Into<String>) -> Result<Histo1D> {
        let mut out = self.clone();
        out.name = name.into();
        out.add(other)?;
        Ok(out)
    }
}

impl Accumulator for Histo1D {
    fn name(&self) -> &str {
        &self.name
    }

    fn scale(&mut self, factor: f64) {
        for (c, s) in self.bin_content.iter_mut().zip(self.sumw2.iter_mut()) {
            *c *= factor;
            *s *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
        self.underflow_sumw2 *= factor * factor;
        self.overflow_sumw2 *= factor * factor;
    }

    fn integral(&self) -> f64 {
        self.sum_w(true)
    }

    fn num_entries(&self) -> u64 {
        self.entries
    }
}
