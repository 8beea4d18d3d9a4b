//! # Engine Module
//!
//! The machinery that moves a job through its preparation stages.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Tool locations, protonation and system building parameters
//! - **State Tracking** ([`state`]) - Job states, stages, artifacts and per-job reports
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - Job-level and batch-level error types
//! - **External Tools** ([`tools`]) - Adapters for the converter, protonator and system builder,
//!   plus the dependency preflight check

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub mod tools;
