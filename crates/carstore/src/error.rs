//! Error types for carstore

use std::fmt;

/// Result type alias for carstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug)]
pub enum Error {
    /// No car with the given id exists
    NotFound(u64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "car {} not found", id),
        }
    }
}

impl std::error::Error for Error {}
