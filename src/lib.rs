//! Split-probe design for HCR in-situ hybridisation.
//!
//! A target is tiled into antisense windows, the windows are filtered on
//! sequence, structure, genome uniqueness and thermodynamics, and a greedy
//! pass picks non-overlapping tiles closest to a target ΔG. Each pick is cut
//! into two half-probes carrying the initiators of an amplifier channel.

pub mod libs;

pub use crate::libs::error::{DesignError, Result};
pub use crate::libs::io::*;
