//! # fk-hist
//!
//! Weighted accumulators filled once per event and rescaled once per run:
//! [`Histo1D`], [`Histo2D`] on non-uniform [`Axis`] edges, and [`Scatter`]
//! point sets for ratios. The [`Accumulator`] trait carries the operations the
//! finalization pass needs (scale, integral, normalize).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod axis;
pub mod histo1d;
pub mod histo2d;
pub mod scatter;

pub use accumulator::{Accumulator, Output};
pub use axis::{Axis, BinLocation};
pub use histo1d::Histo1D;
pub use histo2d::Histo2D;
pub use scatter::{Point, Scatter};
