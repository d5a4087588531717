//! Unified error handling for the planning engine.
//!
//! Only contract violations on direct inputs are errors. Expected
//! infeasibility (a route over capacity, a tour over the distance ceiling)
//! is resolved by splitting or salvaging and reported through
//! [`crate::Diagnostics`], never raised here.

use thiserror::Error;

/// Result alias using [`PlanError`].
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors raised for malformed inputs.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A stop or depot record carried a non-finite or out-of-range coordinate.
    #[error("invalid coordinate for '{id}': ({latitude}, {longitude})")]
    InvalidCoordinate {
        id: String,
        latitude: f64,
        longitude: f64,
    },

    /// A stop record carried a negative student count.
    #[error("invalid student count for stop '{stop_id}': {count}")]
    InvalidStudentCount { stop_id: String, count: i64 },

    /// No stops were supplied.
    #[error("no stops provided for planning")]
    EmptyStops,

    /// No depots were supplied.
    #[error("no depots provided for planning")]
    EmptyDepots,

    /// Vehicle capacity must be a positive integer.
    #[error("invalid vehicle capacity: {capacity}")]
    InvalidCapacity { capacity: u32 },
}
