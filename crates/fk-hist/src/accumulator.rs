//! Operations shared by every accumulator type.

use serde::{Deserialize, Serialize};

use crate::histo1d::Histo1D;
use crate::histo2d::Histo2D;
use crate::scatter::Scatter;

/// A mutable weighted accumulator that can be rescaled after filling.
pub trait Accumulator {
    /// Name used in outputs.
    fn name(&self) -> &str;

    /// Multiply every sum of weights by `factor` (sums of squares by `factor²`).
    fn scale(&mut self, factor: f64);

    /// Total sum of weights, out-of-range contributions included.
    fn integral(&self) -> f64;

    /// Number of fills.
    fn num_entries(&self) -> u64;

    /// Scale so that [`integral`](Self::integral) equals `target`.
    ///
    /// Returns `false` and leaves the content untouched when the integral is
    /// zero or not finite.
    fn normalize(&mut self, target: f64) -> bool {
        let total = self.integral();
        if total == 0.0 || !total.is_finite() {
            log::warn!("{}: cannot normalize, integral is {total}", self.name());
            return false;
        }
        self.scale(target / total);
        true
    }
}

/// A finalized accumulator of any kind, as written to the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    /// 1D histogram.
    Histo1d(Histo1D),
    /// 2D histogram.
    Histo2d(Histo2D),
    /// Point set (ratios).
    Scatter(Scatter),
}

impl Output {
    /// Name of the wrapped accumulator.
    pub fn name(&self) -> &str {
        match self {
            Output::Histo1d(h) => &h.name,
            Output::Histo2d(h) => &h.name,
            Output::Scatter(s) => &s.name,
        }
    }
}

impl From<Histo1D> for Output {
    fn from(h: Histo1D) -> Self {
        Output::Histo1d(h)
    }
}

impl From<Histo2D> for Output {
    fn from(h: Histo2D) -> Self {
        Output::Histo2d(h)
    }
}

impl From<Scatter> for Output {
    fn from(s: Scatter) -> Self {
        Output::Scatter(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_tagged() {
        let h = Histo1D::new("mll", vec![55.0, 75.0]).unwrap();
        let out = Output::from(h);
        assert_eq!(out.name(), "mll");
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["kind"], "histo1d");
        assert_eq!(v["name"], "mll");
    }
}
