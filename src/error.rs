//! Error types for reading delimited text.
//!
//! Every failure of a read is reported through the single [`Error`] enum.
//! A failing read never returns a partial array.
//!
//! ## Error Categories
//!
//! - **Configuration errors**: invalid options, raised before any row is consumed
//! - **Structure errors**: rows that disagree on their field count, or `usecols`
//!   indices that fall outside a row
//! - **Value errors**: a token that cannot be parsed as its column's type
//! - **Converter errors**: a user converter failed; the original error is kept as `source`
//! - **I/O errors**: the underlying reader failed
//! - **Shape errors**: a reshape of a result array to an incompatible shape
//!
//! ## Examples
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, DType, Error};
//!
//! let options = ReadOptions::new()
//!     .with_delimiter(",")
//!     .with_dtype("f8".parse::<DType>().unwrap());
//! let err = read_str("1.5,2.5\n3.0,XXX\n", &options).unwrap_err();
//!
//! assert!(matches!(err, Error::Value { line: 2, column: 1, .. }));
//! assert!(err.to_string().contains("bad float64 value"));
//! ```

use std::fmt;
use thiserror::Error;

/// Boxed error returned by user converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents all possible errors that can occur while reading text into an array.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration, detected before reading any row
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed dtype specification
    #[error("invalid dtype: {0}")]
    DType(String),

    /// A row has a different number of fields than the rows before it
    #[error("line {line}: expected {expected} columns, found {found}")]
    Structure {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A `usecols` index does not exist in a row
    #[error("line {line}: usecols index {index} is out of range for a row with {columns} columns")]
    UsecolsOutOfRange {
        line: usize,
        index: isize,
        columns: usize,
    },

    /// A token could not be parsed as its column's type.
    ///
    /// `line` is the 1-based physical line, `column` the 0-based output column.
    #[error("bad {dtype} value at line {line}, column {column}: {token:?}")]
    Value {
        dtype: String,
        line: usize,
        column: usize,
        token: String,
    },

    /// A user converter returned an error
    #[error("converter for column {column} failed at line {line}: {source}")]
    Converter {
        line: usize,
        column: usize,
        #[source]
        source: BoxError,
    },

    /// IO error while pulling lines from the source
    #[error("IO error at line {line}: {message}")]
    Io { line: usize, message: String },

    /// An array operation was given an incompatible shape
    #[error("shape error: {0}")]
    Shape(String),
}

impl Error {
    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::Error;
    ///
    /// let err = Error::config("ndmin must be 0, 1 or 2");
    /// assert!(err.is_config());
    /// ```
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Creates a dtype specification error.
    pub fn dtype<T: fmt::Display>(msg: T) -> Self {
        Error::DType(msg.to_string())
    }

    /// Creates a structure error for a row with the wrong number of fields.
    pub fn structure(line: usize, expected: usize, found: usize) -> Self {
        Error::Structure {
            line,
            expected,
            found,
        }
    }

    /// Creates a value error naming the column type that failed to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::Error;
    ///
    /// let err = Error::value("int16", 3, 0, "4.x");
    /// assert!(err.to_string().starts_with("bad int16 value"));
    /// ```
    pub fn value(dtype: &str, line: usize, column: usize, token: &str) -> Self {
        Error::Value {
            dtype: dtype.to_string(),
            line,
            column,
            token: token.to_string(),
        }
    }

    /// Wraps a converter failure without altering it.
    pub fn converter(line: usize, column: usize, source: BoxError) -> Self {
        Error::Converter {
            line,
            column,
            source,
        }
    }

    /// Creates a shape error.
    pub fn shape<T: fmt::Display>(msg: T) -> Self {
        Error::Shape(msg.to_string())
    }

    /// Creates an I/O error for a failure while reading `line`.
    pub fn io(line: usize, msg: &str) -> Self {
        Error::Io {
            line,
            message: msg.to_string(),
        }
    }

    /// Returns `true` for errors raised while validating options.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::DType(_))
    }

    /// The 1-based line the error refers to, when it refers to one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Error::Structure { line, .. }
            | Error::UsecolsOutOfRange { line, .. }
            | Error::Value { line, .. }
            | Error::Converter { line, .. }
            | Error::Io { line, .. } => Some(*line),
            Error::Config(_) | Error::DType(_) | Error::Shape(_) => None,
        }
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
