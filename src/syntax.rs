//! Text Format Reference
//!
//! This module documents the delimited text accepted by this library.
//!
//! # Overview
//!
//! Input is read line by line. Each physical line is one row; there are no
//! quoted line breaks. A row is split into fields, every field is converted to
//! its column's type and the rows are stacked into an array.
//!
//! # Rows
//!
//! ## Skipping and limiting
//!
//! - `skiprows` drops that many physical lines first, comments and blank
//!   lines included
//! - A line is blank when it holds only whitespace or only a comment
//! - `max_rows` stops after that many non-blank rows; `0` means no limit
//!
//! ```rust
//! use readtext::{read_str, ReadOptions};
//!
//! let text = "header\n# comment\n1 2\n\n3 4\n5 6\n";
//! let options = ReadOptions::new().with_skiprows(2).with_max_rows(2);
//! let array = read_str(text, &options).unwrap().into_array().unwrap();
//! assert_eq!(array.shape(), &[2, 2]);
//! ```
//!
//! ## Line terminators
//!
//! `\n`, `\r\n` and a lone trailing `\r` all end a line.
//!
//! # Fields
//!
//! ## Delimiters
//!
//! | Delimiter | Behaviour |
//! |-----------|-----------|
//! | whitespace (default) | any run of whitespace separates fields; the row is trimmed first |
//! | literal string | every occurrence separates fields; empty fields are kept |
//!
//! With a literal delimiter, whitespace around a field is trimmed unless it is
//! inside quotes.
//!
//! ## Quoting
//!
//! When a quote character is configured, a quoted span hides delimiters and
//! comment markers. Quotes are removed and a doubled quote inside a span stands
//! for one literal quote. A quote left open runs to the end of the line.
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, StringKind};
//!
//! let options = ReadOptions::new()
//!     .with_delimiter(",")
//!     .with_quote('"')
//!     .with_string_kind(StringKind::Unicode);
//! let array = read_str("\"alpha, x\",\"say \"\"hi\"\"\"\n", &options)
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//! assert_eq!(array.strings().unwrap(), vec!["alpha, x", "say \"hi\""]);
//! ```
//!
//! ## Comments
//!
//! Any number of comment markers may be given, each of any length. A row ends
//! at the first marker found outside quotes.
//!
//! ```rust
//! use readtext::{read_str, ReadOptions};
//!
//! let options = ReadOptions::new().with_comments(["//", "@-"]);
//! let array = read_str("1 2 // first\n3 4 @- second\n", &options)
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//! assert_eq!(array.as_slice::<u8>(), Some(&[1, 2, 3, 4][..]));
//! ```
//!
//! # Literals
//!
//! | Type | Accepted | Examples |
//! |------|----------|----------|
//! | bool | `true`/`false` in any case; integers for explicit `bool` | `True`, `0` |
//! | integer | optional sign, decimal digits | `-12`, `+7` |
//! | float | decimal, exponent, `inf`, `nan` | `1.5e-3`, `-inf` |
//! | complex | `a`, `bj`, `a+bj`, `a+-bj`, optionally in parentheses | `(1-2.5j)`, `3j` |
//! | string | anything | `alpha` |
//!
//! Surrounding whitespace is ignored. The decimal character, an additional
//! exponent letter and the imaginary unit (`i` or `j`) are configurable:
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, ScalarType};
//!
//! let options = ReadOptions::new()
//!     .with_decimal(',')
//!     .with_sci('D')
//!     .with_dtype(ScalarType::Float64);
//! let array = read_str("1,5D2 2,0d-1\n", &options).unwrap().into_array().unwrap();
//! assert_eq!(array.as_slice::<f64>(), Some(&[150.0, 0.2][..]));
//! ```
//!
//! An explicit integer type also accepts float literals and truncates them
//! toward zero, as long as the result fits.
//!
//! # Type Inference
//!
//! Without an explicit dtype each column gets the least type of
//! `bool < integer < float < complex < string` that holds all of its values.
//! Integer columns get the narrowest width for their range, unsigned when no
//! value is negative. Booleans mixed with anything else give strings.
//!
//! ```rust
//! use readtext::{read_str, DType, ReadOptions, ScalarType};
//!
//! let dtype = |text: &str| {
//!     read_str(text, &ReadOptions::new()).unwrap().into_array().unwrap().dtype().clone()
//! };
//! assert_eq!(dtype("1\n2\n30\n"), DType::Scalar(ScalarType::UInt8));
//! assert_eq!(dtype("-34\n120\n"), DType::Scalar(ScalarType::Int8));
//! assert_eq!(dtype("1\n2.5\n"), DType::Scalar(ScalarType::Float64));
//! assert_eq!(dtype("1+2j\n3\n"), DType::Scalar(ScalarType::Complex128));
//! assert_eq!(dtype("TRUE\nfalse\n"), DType::Scalar(ScalarType::Bool));
//! assert_eq!(dtype("true\n1\n"), DType::Scalar(ScalarType::Bytes(Some(4))));
//! ```
//!
//! Columns of differing types give a structured array with fields `f0`, `f1`, ...
//!
//! # Shapes
//!
//! | Input | Default | `ndmin = 0` | `ndmin = 2` |
//! |-------|---------|-------------|-------------|
//! | one row of 5 | `(5,)` | `(5,)` | `(1, 5)` |
//! | one column of 5 | `(5,)` | `(5,)` | `(5, 1)` |
//! | one value | `(1,)` | `()` | `(1, 1)` |
//! | 3 rows of 2 | `(3, 2)` | `(3, 2)` | `(3, 2)` |
//! | no rows | `(0,)` | `(0,)` | `(0, 1)` |
//!
//! Structured results have one dimension, one record per row.
