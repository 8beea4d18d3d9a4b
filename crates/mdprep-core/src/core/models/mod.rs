//! # Core Models Module
//!
//! - [`job`] - A prediction job and the paths derived from its identifier
//! - [`bounding_box`] - The periodic cell enclosing a solvated system

pub mod bounding_box;
pub mod job;
