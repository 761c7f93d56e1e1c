//! Provides the error type used throughout this crate.

use thiserror::Error;

/// The error type used throughout this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmatureError {
    /// The tree would no longer be a forest (second parent joint or a cycle)
    #[error("Structure error: {0}")]
    Structure(String),
    /// Invalid input data for bulk construction, e.g., an unknown joint type tag
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid axis {0:?}: a translation axis must not have zero length")]
    InvalidAxis([f64; 3]),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Link reference {0} is out of bound")]
    UnknownLink(usize),
    #[error("Joint reference {0} is out of bound")]
    UnknownJoint(usize),
    #[error("Input sequences have mismatching lengths: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
