//! Configuration options for reading delimited text.
//!
//! This module provides the types that describe one read:
//!
//! - [`ReadOptions`]: Main configuration struct, built with `with_*` methods
//! - [`Delimiter`]: Whitespace runs (the default) or a literal separator string
//! - [`StringKind`]: Whether inferred string columns become byte or unicode strings
//!
//! `ReadOptions` can also be loaded from any serde format. Counts given as
//! floating-point numbers (`1.0`) are rejected rather than truncated.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, ScalarType};
//!
//! let options = ReadOptions::new()
//!     .with_delimiter(";")
//!     .with_decimal(',')
//!     .with_comment("%")
//!     .with_skiprows(1);
//!
//! let array = read_str("a;b\n1,5;2,25 % trailing\n", &options)
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//! assert_eq!(array.dtype().to_string(), "float64");
//! assert_eq!(array.as_slice::<f64>(), Some(&[1.5, 2.25][..]));
//! ```

use crate::convert::{Converter, Converters};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::literal::NumberSyntax;
use crate::tokenizer::Tokenizer;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field separator.
///
/// # Examples
///
/// ```rust
/// use readtext::Delimiter;
///
/// assert_eq!(Delimiter::from(","), Delimiter::Literal(",".to_string()));
/// assert_eq!(Delimiter::from('\t').as_str(), Some("\t"));
/// assert_eq!(Delimiter::default(), Delimiter::Whitespace);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Delimiter {
    /// Any run of whitespace separates fields; leading and trailing whitespace is ignored.
    #[default]
    Whitespace,
    /// An exact separator string.
    Literal(String),
}

impl Delimiter {
    /// Returns the separator string, or `None` for whitespace mode.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Delimiter::Whitespace => None,
            Delimiter::Literal(s) => Some(s),
        }
    }

    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Delimiter::Whitespace)
    }
}

impl From<&str> for Delimiter {
    fn from(value: &str) -> Self {
        Delimiter::Literal(value.to_string())
    }
}

impl From<String> for Delimiter {
    fn from(value: String) -> Self {
        Delimiter::Literal(value)
    }
}

impl From<char> for Delimiter {
    fn from(value: char) -> Self {
        Delimiter::Literal(value.to_string())
    }
}

impl From<Option<String>> for Delimiter {
    fn from(value: Option<String>) -> Self {
        value.map_or(Delimiter::Whitespace, Delimiter::Literal)
    }
}

impl From<Delimiter> for Option<String> {
    fn from(value: Delimiter) -> Self {
        match value {
            Delimiter::Whitespace => None,
            Delimiter::Literal(s) => Some(s),
        }
    }
}

/// String flavour used when inference settles on a string column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringKind {
    /// Fixed-width byte strings (`S<n>`), width counted in bytes.
    #[default]
    Bytes,
    /// Fixed-width unicode strings (`U<n>`), width counted in characters.
    Unicode,
}

/// Configuration for one read.
///
/// Controls tokenization, literal syntax, the result type and its shape.
///
/// # Examples
///
/// ```rust
/// use readtext::{ReadOptions, Delimiter, ScalarType};
///
/// // Whitespace-separated floats with '#' comments
/// let options = ReadOptions::new();
/// assert_eq!(options.delimiter, Delimiter::Whitespace);
/// assert_eq!(options.comments, vec!["#".to_string()]);
///
/// // Quoted CSV, two columns, at most ten rows
/// let options = ReadOptions::new()
///     .with_delimiter(",")
///     .with_quote('"')
///     .with_usecols([0, -1])
///     .with_max_rows(10);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub delimiter: Delimiter,
    /// Comment markers; a row ends at the first marker found outside quotes.
    pub comments: Vec<String>,
    pub quote: Option<char>,
    pub decimal: char,
    /// Alternate exponent letter accepted in addition to `e`/`E`, e.g. `D`.
    pub sci: Option<char>,
    pub imaginary_unit: char,
    /// Accept `(a+bj)` complex literals.
    pub allow_parens: bool,
    pub dtype: Option<DType>,
    pub string_kind: StringKind,
    /// Text columns to keep, in output order. Negative indices count from the end of each row.
    pub usecols: Option<Vec<isize>>,
    /// Physical lines to discard before reading, counted before comment and blank-line removal.
    #[serde(deserialize_with = "deserialize_count")]
    pub skiprows: i64,
    /// Maximum number of non-blank rows to read; `0` means no limit.
    #[serde(deserialize_with = "deserialize_optional_count")]
    pub max_rows: Option<i64>,
    /// Minimum number of result dimensions (0, 1 or 2).
    #[serde(deserialize_with = "deserialize_optional_count")]
    pub ndmin: Option<i64>,
    /// Return columns (or fields) as separate arrays.
    pub unpack: bool,
    #[serde(skip)]
    pub converters: Converters,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            delimiter: Delimiter::Whitespace,
            comments: vec!["#".to_string()],
            quote: None,
            decimal: '.',
            sci: None,
            imaginary_unit: 'j',
            allow_parens: true,
            dtype: None,
            string_kind: StringKind::Bytes,
            usecols: None,
            skiprows: 0,
            max_rows: None,
            ndmin: None,
            unpack: false,
            converters: Converters::new(),
        }
    }
}

impl ReadOptions {
    /// Creates default options: whitespace-delimited, `#` comments, no quoting,
    /// types inferred from the data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes options from any serde format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] carrying the deserializer's message, or any
    /// error [`ReadOptions::validate`] reports for the loaded options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::ReadOptions;
    ///
    /// let json = r#"{"delimiter": ",", "skiprows": 2, "dtype": "i4"}"#;
    /// let mut de = serde_json::Deserializer::from_str(json);
    /// let options = ReadOptions::from_deserializer(&mut de).unwrap();
    /// assert_eq!(options.skiprows, 2);
    ///
    /// let mut de = serde_json::Deserializer::from_str(r#"{"max_rows": 1.0}"#);
    /// assert!(ReadOptions::from_deserializer(&mut de).unwrap_err().is_config());
    ///
    /// let mut de = serde_json::Deserializer::from_str(r#"{"ndmin": 3}"#);
    /// assert!(ReadOptions::from_deserializer(&mut de).unwrap_err().is_config());
    /// ```
    pub fn from_deserializer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self> {
        let options = ReadOptions::deserialize(deserializer).map_err(Error::config)?;
        options.validate()?;
        Ok(options)
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<Delimiter>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Switches to whitespace-run splitting.
    #[must_use]
    pub fn with_whitespace_delimiter(mut self) -> Self {
        self.delimiter = Delimiter::Whitespace;
        self
    }

    /// Replaces the comment markers with a single marker.
    #[must_use]
    pub fn with_comment(mut self, marker: impl Into<String>) -> Self {
        self.comments = vec![marker.into()];
        self
    }

    /// Replaces the comment markers. An empty list disables comments.
    #[must_use]
    pub fn with_comments<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    #[must_use]
    pub fn with_decimal(mut self, decimal: char) -> Self {
        self.decimal = decimal;
        self
    }

    /// Accepts `letter` (in either case) as an exponent marker, e.g. `'D'` for Fortran output.
    #[must_use]
    pub fn with_sci(mut self, letter: char) -> Self {
        self.sci = Some(letter);
        self
    }

    #[must_use]
    pub fn with_imaginary_unit(mut self, unit: char) -> Self {
        self.imaginary_unit = unit;
        self
    }

    #[must_use]
    pub fn with_parens(mut self, allow: bool) -> Self {
        self.allow_parens = allow;
        self
    }

    /// Fixes the result type instead of inferring it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{ReadOptions, ScalarType, DType};
    ///
    /// let options = ReadOptions::new().with_dtype(ScalarType::Int16);
    /// assert_eq!(options.dtype, Some(DType::Scalar(ScalarType::Int16)));
    /// ```
    #[must_use]
    pub fn with_dtype(mut self, dtype: impl Into<DType>) -> Self {
        self.dtype = Some(dtype.into());
        self
    }

    #[must_use]
    pub fn with_string_kind(mut self, kind: StringKind) -> Self {
        self.string_kind = kind;
        self
    }

    #[must_use]
    pub fn with_usecols(mut self, usecols: impl IntoIterator<Item = isize>) -> Self {
        self.usecols = Some(usecols.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_skiprows(mut self, skiprows: i64) -> Self {
        self.skiprows = skiprows;
        self
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: i64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    #[must_use]
    pub fn with_ndmin(mut self, ndmin: i64) -> Self {
        self.ndmin = Some(ndmin);
        self
    }

    #[must_use]
    pub fn with_unpack(mut self, unpack: bool) -> Self {
        self.unpack = unpack;
        self
    }

    /// Installs a converter for one column (negative indices count from the end).
    #[must_use]
    pub fn with_converter(mut self, column: isize, converter: Converter) -> Self {
        self.converters.insert(column, converter);
        self
    }

    #[must_use]
    pub fn with_converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    /// Checks the options for contradictions.
    ///
    /// Every read calls this before consuming any input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] (or [`Error::DType`] for an inconsistent
    /// structured type) describing the first problem found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::ReadOptions;
    ///
    /// assert!(ReadOptions::new().with_skiprows(-3).validate().is_err());
    /// assert!(ReadOptions::new().with_ndmin(3).validate().is_err());
    /// assert!(ReadOptions::new().with_delimiter(",").with_decimal(',').validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.skiprows < 0 {
            return Err(Error::config(format!(
                "skiprows must be non-negative, got {}",
                self.skiprows
            )));
        }
        if let Some(max_rows) = self.max_rows.filter(|&m| m < 0) {
            return Err(Error::config(format!(
                "max_rows must be non-negative, got {}",
                max_rows
            )));
        }
        if let Some(ndmin) = self.ndmin.filter(|n| !(0..=2).contains(n)) {
            return Err(Error::config(format!(
                "ndmin must be 0, 1 or 2, got {}",
                ndmin
            )));
        }
        self.validate_delimiters()?;
        self.validate_number_syntax()?;
        if let Some(usecols) = &self.usecols {
            if usecols.is_empty() {
                return Err(Error::config("usecols must name at least one column"));
            }
        }
        if let Some(dtype) = &self.dtype {
            dtype.validate()?;
        }
        Ok(())
    }

    fn validate_delimiters(&self) -> Result<()> {
        match &self.delimiter {
            Delimiter::Literal(d) if d.is_empty() => {
                return Err(Error::config("delimiter must not be empty"));
            }
            Delimiter::Literal(d) if d.contains(self.decimal) => {
                return Err(Error::config(format!(
                    "decimal {:?} collides with delimiter {:?}",
                    self.decimal, d
                )));
            }
            Delimiter::Whitespace if self.decimal.is_whitespace() => {
                return Err(Error::config(
                    "decimal must not be whitespace when splitting on whitespace",
                ));
            }
            _ => {}
        }
        if let Some(q) = self.quote {
            let clashes = match &self.delimiter {
                Delimiter::Literal(d) => d.contains(q),
                Delimiter::Whitespace => q.is_whitespace(),
            };
            if clashes || q == self.decimal {
                return Err(Error::config(format!(
                    "quote {:?} collides with the delimiter or decimal",
                    q
                )));
            }
        }
        if self.comments.iter().any(String::is_empty) {
            return Err(Error::config("comment markers must not be empty"));
        }
        Ok(())
    }

    fn validate_number_syntax(&self) -> Result<()> {
        if self.decimal.is_ascii_digit() || matches!(self.decimal, '+' | '-') {
            return Err(Error::config(format!(
                "{:?} cannot be used as decimal character",
                self.decimal
            )));
        }
        if !matches!(self.imaginary_unit, 'i' | 'j' | 'I' | 'J') {
            return Err(Error::config(format!(
                "imaginary unit must be 'i' or 'j', got {:?}",
                self.imaginary_unit
            )));
        }
        // 'e' and 'E' are always exponent letters, so naming one changes nothing
        if let Some(sci) = self.exponent_letter() {
            let lower = sci.to_ascii_lowercase();
            // letters of "inf", "infinity" and "nan" would make those literals ambiguous
            let reserved = lower == self.imaginary_unit.to_ascii_lowercase()
                || "infinity".contains(lower)
                || lower == 'a';
            if !sci.is_ascii_alphabetic() || reserved {
                return Err(Error::config(format!(
                    "{:?} cannot be used as exponent letter",
                    sci
                )));
            }
        }
        Ok(())
    }

    /// Literal syntax derived from `decimal`, `sci`, `imaginary_unit` and `allow_parens`.
    #[must_use]
    pub fn number_syntax(&self) -> NumberSyntax {
        NumberSyntax {
            decimal: self.decimal,
            exponent: self.exponent_letter(),
            imaginary_unit: self.imaginary_unit,
            allow_parens: self.allow_parens,
        }
    }

    fn exponent_letter(&self) -> Option<char> {
        self.sci.filter(|c| !c.eq_ignore_ascii_case(&'e'))
    }

    pub(crate) fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.delimiter.clone(), self.comments.clone(), self.quote)
    }
}

/// Accepts integers only; `1.0` and `"1"` are rejected.
fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    deserializer.deserialize_any(CountVisitor)
}

fn deserialize_optional_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    deserializer.deserialize_option(OptionalCountVisitor)
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer count")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("count {} is too large", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<i64, E> {
        Err(E::custom(format!("count must be an integer, got {}", v)))
    }
}

struct OptionalCountVisitor;

impl<'de> Visitor<'de> for OptionalCountVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer count or null")
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        deserialize_count(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::ScalarType;
    use serde::de::value::{Error as ValueError, MapDeserializer};
    use serde::de::IntoDeserializer;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::new();
        assert!(options.delimiter.is_whitespace());
        assert_eq!(options.decimal, '.');
        assert_eq!(options.imaginary_unit, 'j');
        assert!(options.allow_parens);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_negative_counts_rejected() {
        assert!(ReadOptions::new().with_skiprows(-3).validate().unwrap_err().is_config());
        assert!(ReadOptions::new().with_max_rows(-1).validate().is_err());
        assert!(ReadOptions::new().with_max_rows(0).validate().is_ok());
    }

    #[test]
    fn test_ndmin_range() {
        for ok in 0..=2 {
            assert!(ReadOptions::new().with_ndmin(ok).validate().is_ok());
        }
        assert!(ReadOptions::new().with_ndmin(-1).validate().is_err());
        assert!(ReadOptions::new().with_ndmin(3).validate().is_err());
    }

    #[test]
    fn test_delimiter_collisions() {
        assert!(ReadOptions::new().with_delimiter("").validate().is_err());
        assert!(ReadOptions::new().with_decimal(' ').validate().is_err());
        assert!(ReadOptions::new()
            .with_delimiter(",")
            .with_quote(',')
            .validate()
            .is_err());
        assert!(ReadOptions::new().with_quote('.').validate().is_err());
        assert!(ReadOptions::new().with_comment("").validate().is_err());
        assert!(ReadOptions::new()
            .with_delimiter(" ")
            .with_decimal(',')
            .validate()
            .is_ok());
    }

    #[test]
    fn test_number_syntax_checks() {
        assert!(ReadOptions::new().with_sci('D').validate().is_ok());
        assert!(ReadOptions::new().with_sci('E').validate().is_ok());
        assert!(ReadOptions::new().with_sci('e').validate().is_ok());
        assert_eq!(ReadOptions::new().with_sci('E').number_syntax().exponent, None);
        assert!(ReadOptions::new().with_sci('n').validate().is_err());
        assert!(ReadOptions::new().with_sci('J').validate().is_err());
        assert!(ReadOptions::new().with_sci('1').validate().is_err());
        assert!(ReadOptions::new().with_imaginary_unit('k').validate().is_err());
        assert!(ReadOptions::new().with_decimal('5').validate().is_err());
        let syntax = ReadOptions::new().with_sci('d').with_imaginary_unit('i').number_syntax();
        assert_eq!(syntax.exponent, Some('d'));
        assert_eq!(syntax.imaginary_unit, 'i');
    }

    #[test]
    fn test_empty_usecols_rejected() {
        let options = ReadOptions::new().with_usecols(Vec::new());
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let options = ReadOptions::new()
            .with_delimiter(",")
            .with_dtype(ScalarType::UInt16)
            .with_usecols([1, -1])
            .with_max_rows(5);
        let json = serde_json::to_string(&options).unwrap();
        let mut de = serde_json::Deserializer::from_str(&json);
        let back = ReadOptions::from_deserializer(&mut de).unwrap();
        assert_eq!(back.delimiter, Delimiter::from(","));
        assert_eq!(back.dtype, options.dtype);
        assert_eq!(back.usecols, Some(vec![1, -1]));
        assert_eq!(back.max_rows, Some(5));
    }

    #[test]
    fn test_json_whitespace_delimiter_is_null() {
        let json = serde_json::to_value(ReadOptions::new()).unwrap();
        assert!(json["delimiter"].is_null());
    }

    #[test]
    fn test_json_float_counts_rejected() {
        for json in [r#"{"skiprows": 1.0}"#, r#"{"max_rows": 2.5}"#, r#"{"ndmin": "2"}"#] {
            let mut de = serde_json::Deserializer::from_str(json);
            let err = ReadOptions::from_deserializer(&mut de).unwrap_err();
            assert!(err.is_config(), "{}", json);
        }
    }

    #[test]
    fn test_structured_dtype_from_json() {
        let json = r#"{"dtype": [["a", "u1", 2], ["b", "u1", [2, 2]], ["c", "f8"]]}"#;
        let mut de = serde_json::Deserializer::from_str(json);
        let options = ReadOptions::from_deserializer(&mut de).unwrap();
        let dtype = options.dtype.unwrap();
        assert_eq!(dtype.column_count(), Some(7));
    }

    #[test]
    fn test_value_deserializer_maps_to_config_error() {
        let entries = vec![("skiprows", "many")];
        let de: MapDeserializer<'_, _, ValueError> = MapDeserializer::new(entries.into_iter());
        let err = ReadOptions::from_deserializer(de).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_crate_error_as_deserializer_error() {
        let de: serde::de::value::StrDeserializer<'_, Error> = "x".into_deserializer();
        let err = DType::deserialize(de).unwrap_err();
        assert!(err.is_config());
    }
}
