//! # Core Module
//!
//! Stateless building blocks of the preparation pipeline.
//!
//! - **File formats** ([`io`]) - PDB coordinate records and simulation configuration templates
//! - **Data models** ([`models`]) - Jobs and the periodic cell derived from a structure
//! - **Utilities** ([`utils`]) - Natural ordering of job names

pub mod io;
pub mod models;
pub mod utils;
