//! Subcommand modules for the `hcrpd` binary.

pub mod channels;
pub mod design;
pub mod index;
pub mod tiles;
