//! Error types for tour-ga.
//!
//! Every fallible operation returns [`TourResult<T>`]. Configuration and
//! input problems are reported before the evolutionary loop starts;
//! [`TourError::RepairExhausted`] is the only error that can surface
//! mid-run, and the driver recovers from it.

use thiserror::Error;

/// Result type alias for tour-ga operations.
pub type TourResult<T> = Result<T, TourError>;

/// Unified error type for all tour-ga operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TourError {
    /// A GA parameter is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Which parameter was rejected and why.
        message: String,
    },

    /// The distance matrix is not square, symmetric, zero-diagonal and non-negative.
    #[error("invalid distance matrix: {message}")]
    InvalidMatrix {
        /// Description of the offending entry or shape.
        message: String,
    },

    /// A tour is not a permutation of `1..=N`.
    #[error("invalid tour: {message}")]
    InvalidTour {
        /// Description of the violation.
        message: String,
    },

    /// Two tours that must have equal length do not.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the reference tour.
        expected: usize,
        /// Length of the offending tour.
        actual: usize,
    },

    /// Crossover repair found a duplicate but no missing city to put in its place.
    ///
    /// Recoverable: the caller may retry the crossover with new cut points
    /// or fall back to copies of the parents.
    #[error("repair exhausted: duplicate city {city} at position {position} has no replacement")]
    RepairExhausted {
        /// Index of the unrepaired duplicate in the child.
        position: usize,
        /// The duplicated city id.
        city: usize,
    },
}

impl TourError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a matrix error with a message.
    #[must_use]
    pub fn matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    /// Create a tour error with a message.
    #[must_use]
    pub fn tour(message: impl Into<String>) -> Self {
        Self::InvalidTour {
            message: message.into(),
        }
    }

    /// Whether the caller can recover by retrying or falling back.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RepairExhausted { .. })
    }
}
