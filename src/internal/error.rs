use thiserror::Error;
use std::io;

/// Unified error type for the reshaper library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No part of the source satisfies a schema position.
    ///
    /// The payload describes the position: a leaf kind (`Number`), an
    /// array shape (`String for array`) or an object template key.
    #[error("Could not find {0}")]
    MatchNotFound(String),

    /// The schema or hint encoding handed to the parser is malformed.
    #[error("Schema Error: {0}")]
    SchemaError(String),

    /// Reading or decoding input text failed.
    #[error("Input Error: {0}")]
    InputError(String),
}

/// A specialized `Result` type for reshaper operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if this is the "no match" outcome of a reshape.
    pub fn is_match_not_found(&self) -> bool {
        matches!(self, Error::MatchNotFound(_))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::InputError(format!("IO Error while reading input: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InputError(format!("Invalid JSON: {}", err))
    }
}
