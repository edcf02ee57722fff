//! Error types for filecache-journal

use std::fmt;
use std::io;

/// Result type alias for journal and cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for journal operations
#[derive(Debug)]
pub enum Error {
    /// I/O error other than a missing journal file
    Io(io::Error),

    /// A record in a journal could not be decoded
    Decode {
        /// 1-based line number of the bad record
        line: usize,
        /// Decoder message
        message: String,
    },

    /// A record could not be encoded
    Encode(String),

    /// A typed value could not be converted to or from its payload
    Value(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Decode { line, message } => {
                write!(f, "Decode error at record line {}: {}", line, message)
            }
            Error::Encode(msg) => write!(f, "Encode error: {}", msg),
            Error::Value(e) => write!(f, "Value error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Value(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
