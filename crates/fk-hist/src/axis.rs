//! Bin edges and bin lookup.

use fk_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a value lands on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLocation {
    /// Below the first edge.
    Underflow,
    /// In-range bin index.
    Bin(usize),
    /// At or above the last edge.
    Overflow,
    /// NaN; not binned anywhere.
    Invalid,
}

/// Sorted, possibly non-uniform bin edges (`n_bins + 1` values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Axis {
    edges: Vec<f64>,
}

impl Axis {
    /// Validate and wrap bin edges: at least two, finite, strictly increasing.
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation(format!(
                "an axis needs at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(Error::Validation(format!("non-finite bin edge: {bad}")));
        }
        if let Some(w) = edges.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::Validation(format!(
                "bin edges must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self { edges })
    }

    /// `n_bins` equal-width bins on `[lo, hi)`.
    pub fn uniform(n_bins: usize, lo: f64, hi: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Validation("an axis needs at least one bin".into()));
        }
        let width = (hi - lo) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| lo + width * i as f64).collect();
        edges.push(hi);
        Self::new(edges)
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lower edge of the first bin.
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin.
    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Width of bin `i`.
    pub fn width(&self, i: usize) -> f64 {
        self.edges[i + 1] - self.edges[i]
    }

    /// Centre of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        0.5 * (self.edges[i] + self.edges[i + 1])
    }

    /// Locate `val`; bins are closed below and open above.
    pub fn find_bin(&self, val: f64) -> BinLocation {
        if val.is_nan() {
            return BinLocation::Invalid;
        }
        if val < self.lower() {
            return BinLocation::Underflow;
        }
        if val >= self.upper() {
            return BinLocation::Overflow;
        }
        // at least the first edge is <= val here
        BinLocation::Bin(self.edges.partition_point(|&e| e <= val) - 1)
    }
}

impl TryFrom<Vec<f64>> for Axis {
    type Error = Error;

    fn try_from(edges: Vec<f64>) -> Result<Self> {
        Axis::new(edges)
    }
}

impl From<Axis> for Vec<f64> {
    fn from(axis: Axis) -> Self {
        axis.edges
    }
}
