pub mod config;
pub mod design;
pub mod error;
pub mod filter;
pub mod io;
pub mod mask;
pub mod nt;
pub mod predict;
pub mod probe;
pub mod report;
pub mod scan;
pub mod select;
pub mod thermo;
pub mod tile;
