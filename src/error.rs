//! Error and `Result` types.
//!
//! This crate uses a split error-handling policy:
//! - Configuration/data validation at the API boundary returns `Result`.
//! - Low-level hot-path methods (per-node forward/backward, loss kernels)
//!   treat shape mismatches as programmer error via `debug_assert!`.

use std::fmt;

#[derive(Debug, Clone)]
/// Errors returned by fallible constructors and high-level APIs.
pub enum Error {
    /// The requested network or dataset configuration is invalid
    /// (e.g. fewer than two layer sizes, mismatched activation count).
    InvalidConfig(String),
    /// A vector width disagrees with what the network or dataset expects.
    ShapeMismatch(String),
    /// The dataset is full and replay memory is disabled.
    CapacityExceeded(String),
    /// Training was requested on an empty sample set.
    EmptyInput(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            Error::CapacityExceeded(msg) => write!(f, "capacity exceeded: {msg}"),
            Error::EmptyInput(msg) => write!(f, "empty input: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
