//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Job Preparation** ([`prepare`]) - Runs one job from structure discovery to its
//!   simulation configuration, capturing any failure in a report.
//! - **Batch Processing** ([`batch`]) - Discovers jobs under an input root, orders them
//!   naturally and runs each one in isolation, with optional cancellation between jobs.

pub mod batch;
pub mod prepare;
