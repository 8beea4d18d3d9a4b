//! Reading structure coordinates and rendering simulation configuration files.

pub mod conf;
pub mod pdb;
pub(crate) mod staging;
