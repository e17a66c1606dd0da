//! Custom error types for the I/O module.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("A read operation would exceed the read limit of {limit} bytes.")]
    ReadLimitExceeded { limit: u64 },

    #[error("Content could not be decoded as {encoding} text.")]
    Decode { encoding: &'static str },

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(io::Error),
}

impl IoError {
    /// Wraps this error so it can travel through `std::io::Read`.
    pub fn into_io(self) -> io::Error {
        io::Error::other(self)
    }

    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, IoError::ReadLimitExceeded { .. })
    }
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        // Recover errors that were tunnelled through io::Error by `into_io`.
        if !err.get_ref().is_some_and(|inner| inner.is::<IoError>()) {
            return IoError::StdIo(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<IoError>()) {
            Some(Ok(own)) => *own,
            Some(Err(other)) => IoError::StdIo(io::Error::new(kind, other)),
            None => IoError::StdIo(kind.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
