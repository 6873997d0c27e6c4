//! Weighted 2D histogram on two non-uniform axes.

use fk_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::accumulator::Accumulator;
use crate::axis::{Axis, BinLocation};

/// Weighted 2D histogram; bins are stored row-major in x (`ix * ny + iy`).
///
/// Fills outside either axis are summed into a single out-of-range total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histo2D {
    /// Histogram name.
    pub name: String,
    /// x binning.
    pub x_axis: Axis,
    /// y binning.
    pub y_axis: Axis,
    /// Sum of weights per bin.
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Fill count per bin.
    pub bin_entries: Vec<u64>,
    /// Sum of weights outside the grid.
    pub out_of_range: f64,
    /// Sum of weights squared outside the grid.
    pub out_of_range_sumw2: f64,
    /// Total fills.
    pub entries: u64,
}

impl Histo2D {
    /// Empty histogram on validated edges.
    pub fn new(name: impl Into<String>, x_edges: Vec<f64>, y_edges: Vec<f64>) -> Result<Self> {
        Ok(Self::with_axes(name, Axis::new(x_edges)?, Axis::new(y_edges)?))
    }

    /// Empty histogram on existing axes.
    pub fn with_axes(name: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        let n = x_axis.n_bins() * y_axis.n_bins();
        Self {
            name: name.into(),
            x_axis,
            y_axis,
            bin_content: vec![0.0; n],
            sumw2: vec![0.0; n],
            bin_entries: vec![0; n],
            out_of_range: 0.0,
            out_of_range_sumw2: 0.0,
            entries: 0,
        }
    }

    fn index(&self, ix: usize, iy: usize) -> usize {
        ix * self.y_axis.n_bins() + iy
    }

    /// Add `weight` at `(x, y)`. NaN coordinates are dropped.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        match (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            (BinLocation::Invalid, _) | (_, BinLocation::Invalid) => {
                log::debug!("{}: dropping NaN fill", self.name);
            }
            (BinLocation::Bin(ix), BinLocation::Bin(iy)) => {
                let k = self.index(ix, iy);
                self.bin_content[k] += weight;
                self.sumw2[k] += weight * weight;
                self.bin_entries[k] += 1;
                self.entries += 1;
            }
            _ => {
                self.out_of_range += weight;
                self.out_of_range_sumw2 += weight * weight;
                self.entries += 1;
            }
        }
    }

    /// Sum of weights in bin `(ix, iy)`.
    pub fn content(&self, ix: usize, iy: usize) -> f64 {
        self.bin_content[self.index(ix, iy)]
    }

    /// Add another histogram with identical binning.
    pub fn add(&mut self, other: &Histo2D) -> Result<()> {
        if self.x_axis != other.x_axis || self.y_axis != other.y_axis {
            return Err(Error::Validation(format!(
                "cannot add '{}' to '{}': binning differs",
                other.name, self.name
            )));
        }
        for k in 0..self.bin_content.len() {
            self.bin_content[k] += other.bin_content[k];
            self.sumw2[k] += other.sumw2[k];
            self.bin_entries[k] += other.bin_entries[k];
        }
        self.out_of_range += other.out_of_range;
        self.out_of_range_sumw2 += other.out_of_range_sumw2;
        self.entries += other.entries;
        Ok(())
    }
}

impl Accumulator for Histo2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn scale(&mut self, factor: f64) {
        for (c, s) in self.bin_content.iter_mut().zip(self.sumw2.iter_mut()) {
            *c *= factor;
            *s *= factor * factor;
        }
        self.out_of_range *= factor;
        self.out_of_range_sumw2 *= factor * factor;
    }

    fn integral(&self) -> f64 {
        self.bin_content.iter().sum::<f64>() + self.out_of_range
    }

    fn num_entries(&self) -> u64 {
        self.entries
    }
}
