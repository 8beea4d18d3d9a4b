//! # mdprep Core Library
//!
//! Batch preparation of predicted protein structures for molecular dynamics.
//! Each job directory holding a predicted model is taken through format
//! conversion, protonation at a target pH, solvation and ionization, and
//! finally a simulation configuration derived from a shared template.
//!
//! ## Architecture
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: Data and formats.** Job descriptions, the periodic cell
//!   model, PDB coordinate reading, configuration templates and natural
//!   ordering of job names.
//!
//! - **[`engine`]: Pipeline machinery.** Configuration, error types, job
//!   state tracking, progress reporting and the external tool adapters
//!   (structure conversion, protonation, system building).
//!
//! - **[`workflows`]: The public entry points.** A per-job pipeline and the
//!   batch driver that runs it over every job under an input root.

pub mod core;
pub mod engine;
pub mod workflows;
