//! # fk-core
//!
//! Shared building blocks for fidkin: the error type, four-momentum algebra,
//! the particle/event data model and the [`EventView`] capability trait that
//! decouples analyses from whatever produced the reconstructed objects.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

pub use error::{Error, Result};
pub use traits::EventView;
pub use types::{Event, Particle, Species, parse_events, read_events};
pub use vector::{FourMomentum, delta_phi, delta_r, map_angle_m_pi_pi};

/// Crate version, shared by every workspace member.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
