//! # readtext
//!
//! A streaming reader that turns delimited text (CSV, whitespace-separated
//! tables, Fortran-style dumps) into typed, shaped arrays.
//!
//! ## Key Features
//!
//! - **Type Inference**: Columns get the narrowest fitting type (`uint8` before
//!   `int16` before `float64`...) when no dtype is given
//! - **Structured Arrays**: Named fields of mixed types, including sub-array fields
//!   spanning several columns
//! - **Flexible Syntax**: Literal or whitespace delimiters, quoting, multi-character
//!   comment markers, decimal commas, alternate exponent letters, complex literals
//! - **Converters**: Per-column closures replace the built-in parsers
//! - **Precise Errors**: Every failure names the line and column it happened at
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! readtext = "0.1"
//! ```
//!
//! ### Reading a Table
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, ScalarType, DType};
//!
//! let text = "# x y\n1.5 2.0\n3.25 4.0\n";
//! let array = read_str(text, &ReadOptions::new()).unwrap().into_array().unwrap();
//!
//! assert_eq!(array.shape(), &[2, 2]);
//! assert_eq!(array.dtype(), &DType::Scalar(ScalarType::Float64));
//! assert_eq!(array.as_slice::<f64>(), Some(&[1.5, 2.0, 3.25, 4.0][..]));
//! ```
//!
//! ### Structured Records
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, DType, Scalar};
//!
//! let options = ReadOptions::new()
//!     .with_delimiter(",")
//!     .with_dtype("u1,f8,S5".parse::<DType>().unwrap());
//! let array = read_str("1,2.5,alpha\n2,3.5,beta\n", &options)
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//!
//! assert_eq!(array.shape(), &[2]);
//! assert_eq!(
//!     array.record(&[1]),
//!     Some(vec![Scalar::UInt(2), Scalar::Float(3.5), Scalar::from("beta")])
//! );
//! ```
//!
//! ### Converters
//!
//! ```rust
//! use readtext::{converters, read_str, ReadOptions, ScalarType};
//!
//! let options = ReadOptions::new()
//!     .with_delimiter(",")
//!     .with_dtype(ScalarType::Float64)
//!     .with_converters(converters! {
//!         -1 => |s: &str| if s.trim().is_empty() { f64::NAN } else { s.trim().parse().unwrap_or(f64::NAN) },
//!     });
//! let array = read_str("1,2\n3,\n", &options).unwrap().into_array().unwrap();
//! assert!(array.as_slice::<f64>().unwrap()[3].is_nan());
//! ```
//!
//! ## Error Handling
//!
//! Every read returns [`Result`]. Invalid options fail before any input is
//! consumed; data errors carry the 1-based line and 0-based column. See
//! [`Error`] for the full list.
//!
//! ## Format Reference
//!
//! See the [`syntax`] module for the accepted text format.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Reading numeric tables with inferred types
//! - **`structured.rs`** - Structured dtypes, fields and unpacking
//! - **`converters.rs`** - Per-column converters and error reporting
//!
//! Run any example with: `cargo run --example <name>`

pub mod array;
pub mod convert;
pub mod dtype;
pub mod error;
pub mod infer;
pub mod literal;
pub mod macros;
pub mod options;
pub mod reader;
pub mod source;
pub mod syntax;
pub mod tokenizer;
pub mod value;

pub use array::{Buffer, Element, NdArray, Output};
pub use convert::{Converter, Converters};
pub use dtype::{DType, Field, ScalarType};
pub use error::{BoxError, Error, Result};
pub use options::{Delimiter, ReadOptions, StringKind};
pub use reader::read;
pub use source::Source;
pub use value::Scalar;

use std::borrow::Cow;
use std::io::{self, BufReader};
use std::path::Path;

/// Reads an in-memory string.
///
/// # Examples
///
/// ```rust
/// use readtext::{read_str, ReadOptions};
///
/// let array = read_str("1 2 3\n", &ReadOptions::new()).unwrap().into_array().unwrap();
/// assert_eq!(array.shape(), &[3]);
/// ```
///
/// # Errors
///
/// Returns an error for invalid options or malformed input; see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_str(text: &str, options: &ReadOptions) -> Result<Output> {
    read(Source::from_str(text), options)
}

/// Reads a file, opened with a [`BufReader`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and any other
/// error [`read`] produces.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_path<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Output> {
    read(Source::open(path)?, options)
}

/// Reads from an open byte stream. The stream is buffered internally.
///
/// # Examples
///
/// ```rust
/// use readtext::{read_reader, ReadOptions};
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"1,2\n3,4\n".to_vec());
/// let options = ReadOptions::new().with_delimiter(",");
/// let array = read_reader(cursor, &options).unwrap().into_array().unwrap();
/// assert_eq!(array.shape(), &[2, 2]);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] with the failing line if the stream errors or is
/// not valid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_reader<R: io::Read>(reader: R, options: &ReadOptions) -> Result<Output> {
    read(Source::from_reader(BufReader::new(reader)), options)
}

/// Reads rows from an iterator of lines, such as a generator.
///
/// # Examples
///
/// ```rust
/// use readtext::{read_lines, DType, ReadOptions};
///
/// let rows = (0..4).map(|i| format!("{} {}", i, f64::from(i) / 2.0));
/// let options = ReadOptions::new().with_dtype("i,d".parse::<DType>().unwrap());
/// let array = read_lines(rows, &options).unwrap().into_array().unwrap();
/// assert_eq!(array.shape(), &[4]);
/// assert_eq!(array.field("f1").unwrap().as_slice::<f64>(), Some(&[0.0, 0.5, 1.0, 1.5][..]));
/// ```
///
/// # Errors
///
/// Returns an error for invalid options or malformed input; see [`Error`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_lines<I, S>(lines: I, options: &ReadOptions) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines = lines
        .into_iter()
        .map(|line| Cow::Owned(line.as_ref().to_string()));
    read(Source::from_lines(lines), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_path_round_trip() {
        let path = std::env::temp_dir().join(format!("readtext-{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "1 2\n3 4").unwrap();
        drop(file);
        let array = read_path(&path, &ReadOptions::new())
            .unwrap()
            .into_array()
            .unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(array.as_slice::<u8>(), Some(&[1, 2, 3, 4][..]));
    }

    #[test]
    fn test_read_reader_invalid_utf8() {
        let bytes: &[u8] = b"1 2\n\xff\xfe\n";
        let err = read_reader(bytes, &ReadOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Io { line: 2, .. }));
    }

    #[test]
    fn test_unpack_output() {
        let options = ReadOptions::new().with_unpack(true);
        let columns = read_str("1 2\n3 4\n5 6\n", &options)
            .unwrap()
            .into_columns()
            .unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].as_slice::<u8>(), Some(&[1, 3, 5][..]));
    }
}
