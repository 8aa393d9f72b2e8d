//! Error types for chaos-core

use thiserror::Error;

/// Core error types for the chaos library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation on the underlying source or sink failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Negative or otherwise out-of-range argument, rejected before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Slice bounds do not fit the array they refer to
    #[error("Index out of bounds: offset {offset}, length {length}, size {size}")]
    IndexOutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },

    /// An exact read or skip ran into the end of the source
    #[error("Unexpected end of data: expected {expected} units, got {actual}")]
    EndOfData { expected: u64, actual: u64 },

    /// Unknown character encoding label
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error reports a short read or skip
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Error::EndOfData { .. })
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            Error::EndOfData { .. } => std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err),
            Error::InvalidArgument(_) | Error::IndexOutOfBounds { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
