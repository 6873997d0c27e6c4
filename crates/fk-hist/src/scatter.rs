//! Point sets produced by dividing histograms.

use fk_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::accumulator::Accumulator;
use crate::histo1d::Histo1D;

/// One point with symmetric errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Bin centre.
    pub x: f64,
    /// Half bin width.
    pub x_err: f64,
    /// Value.
    pub y: f64,
    /// Error on the value.
    pub y_err: f64,
}

/// Named list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    /// Name used in outputs.
    pub name: String,
    /// Points, one per source bin.
    pub points: Vec<Point>,
}

impl Scatter {
    /// Bin-by-bin `numerator / denominator` with uncorrelated error propagation.
    ///
    /// Bins with a zero denominator give `0 ± 0`.
    pub fn divide(
        name: impl Into<String>,
        numerator: &Histo1D,
        denominator: &Histo1D,
    ) -> Result<Self> {
        if numerator.axis != denominator.axis {
            return Err(Error::Validation(format!(
                "cannot divide '{}' by '{}': binning differs",
                numerator.name, denominator.name
            )));
        }
        let points = (0..numerator.n_bins())
            .map(|i| {
                let (n, d) = (numerator.bin_content[i], denominator.bin_content[i]);
                let (y, y_err) = if d == 0.0 {
                    (0.0, 0.0)
                } else {
                    let rel2 = numerator.sumw2[i] / (d * d)
                        + n * n * denominator.sumw2[i] / (d * d * d * d);
                    (n / d, rel2.sqrt())
                };
                Point {
                    x: numerator.axis.center(i),
                    x_err: 0.5 * numerator.axis.width(i),
                    y,
                    y_err,
                }
            })
            .collect();
        Ok(Self { name: name.into(), points })
    }
}

impl Accumulator for Scatter {
    fn name(&self) -> &str {
        &self.name
    }

    fn scale(&mut self, factor: f64) {
        for p in &mut self.points {
            p.y *= factor;
            p.y_err *= factor.abs();
        }
    }

    fn integral(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum()
    }

    fn num_entries(&self) -> u64 {
        self.points.len() as u64
    }
}
