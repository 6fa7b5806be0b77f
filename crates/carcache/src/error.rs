//! Error types for carcache

use std::fmt;

/// Result type alias for carcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug)]
pub enum Error {
    /// Backing store error
    Store(carstore::Error),

    /// A cached payload failed to (de)serialize. A corrupt blob on a
    /// hit is fatal for the request, never a silent miss.
    Codec(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(e) => write!(f, "store error: {}", e),
            Error::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(e) => Some(e),
            Error::Codec(e) => Some(e),
        }
    }
}

impl From<carstore::Error> for Error {
    fn from(err: carstore::Error) -> Self {
        Error::Store(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Codec(err)
    }
}
