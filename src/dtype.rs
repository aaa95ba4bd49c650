//! Element types of the arrays produced by a read.
//!
//! A [`DType`] is either a single [`ScalarType`] (a homogeneous array) or an
//! ordered list of named [`Field`]s (a structured array of records). Each field
//! has its own scalar type and an optional shape; a field of shape `(2, 2)`
//! consumes four consecutive text columns.
//!
//! Data types can be written with the short type codes of the reference array
//! library:
//!
//! ```rust
//! use readtext::{DType, ScalarType};
//!
//! let dt: DType = "f8".parse().unwrap();
//! assert_eq!(dt, DType::Scalar(ScalarType::Float64));
//!
//! let dt: DType = "i,d".parse().unwrap();
//! assert_eq!(dt.fields().len(), 2);
//! assert_eq!(dt.fields()[0].name(), "f0");
//! assert_eq!(dt.fields()[1].dtype(), ScalarType::Float64);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The type of a single array element.
///
/// String types carry a width (bytes for [`ScalarType::Bytes`], characters for
/// [`ScalarType::Unicode`]). A width of `None` means "as wide as the longest
/// value in the input".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Bytes(Option<usize>),
    Unicode(Option<usize>),
}

impl ScalarType {
    /// The type name used in error messages, e.g. `float64` or `S7`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::ScalarType;
    ///
    /// assert_eq!(ScalarType::Int16.name(), "int16");
    /// assert_eq!(ScalarType::Bytes(Some(7)).name(), "S7");
    /// assert_eq!(ScalarType::Unicode(None).name(), "U");
    /// ```
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            ScalarType::Bool => "bool".to_string(),
            ScalarType::Int8 => "int8".to_string(),
            ScalarType::Int16 => "int16".to_string(),
            ScalarType::Int32 => "int32".to_string(),
            ScalarType::Int64 => "int64".to_string(),
            ScalarType::UInt8 => "uint8".to_string(),
            ScalarType::UInt16 => "uint16".to_string(),
            ScalarType::UInt32 => "uint32".to_string(),
            ScalarType::UInt64 => "uint64".to_string(),
            ScalarType::Float32 => "float32".to_string(),
            ScalarType::Float64 => "float64".to_string(),
            ScalarType::Complex64 => "complex64".to_string(),
            ScalarType::Complex128 => "complex128".to_string(),
            ScalarType::Bytes(Some(n)) => format!("S{}", n),
            ScalarType::Bytes(None) => "S".to_string(),
            ScalarType::Unicode(Some(n)) => format!("U{}", n),
            ScalarType::Unicode(None) => "U".to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarType::Int8
                | ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::UInt8
                | ScalarType::UInt16
                | ScalarType::UInt32
                | ScalarType::UInt64
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, ScalarType::Bytes(_) | ScalarType::Unicode(_))
    }

    /// Returns `false` for string types whose width is still unknown.
    #[inline]
    #[must_use]
    pub const fn is_sized(&self) -> bool {
        !matches!(self, ScalarType::Bytes(None) | ScalarType::Unicode(None))
    }

    /// Returns the same type with its string width set to `width`.
    /// Non-string types are returned unchanged.
    #[must_use]
    pub fn with_width(self, width: usize) -> Self {
        match self {
            ScalarType::Bytes(_) => ScalarType::Bytes(Some(width)),
            ScalarType::Unicode(_) => ScalarType::Unicode(Some(width)),
            other => other,
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().trim_start_matches(&['<', '>', '=', '|'][..]);
        let ty = match code {
            "?" | "b1" | "bool" => ScalarType::Bool,
            "b" | "i1" | "int8" => ScalarType::Int8,
            "h" | "i2" | "int16" => ScalarType::Int16,
            "i" | "i4" | "int32" => ScalarType::Int32,
            "l" | "q" | "i8" | "int" | "int64" => ScalarType::Int64,
            "B" | "u1" | "uint8" => ScalarType::UInt8,
            "H" | "u2" | "uint16" => ScalarType::UInt16,
            "I" | "u4" | "uint32" => ScalarType::UInt32,
            "L" | "Q" | "u8" | "uint" | "uint64" => ScalarType::UInt64,
            "f" | "f4" | "float32" => ScalarType::Float32,
            "d" | "f8" | "float" | "float64" => ScalarType::Float64,
            "F" | "c8" | "complex64" => ScalarType::Complex64,
            "D" | "c16" | "complex" | "complex128" => ScalarType::Complex128,
            "S" | "a" | "bytes" => ScalarType::Bytes(None),
            "U" | "str" => ScalarType::Unicode(None),
            _ => {
                // a zero width means "size from the data"
                if let Some(width) = code.strip_prefix('S').or_else(|| code.strip_prefix('a')) {
                    ScalarType::Bytes(Some(width.parse().ok()?).filter(|&w| w > 0))
                } else if let Some(width) = code.strip_prefix('U') {
                    ScalarType::Unicode(Some(width.parse().ok()?).filter(|&w| w > 0))
                } else {
                    return None;
                }
            }
        };
        Some(ty)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScalarType::from_code(s).ok_or_else(|| Error::dtype(format!("unknown type code {:?}", s)))
    }
}

/// One named member of a structured data type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: String,
    dtype: ScalarType,
    shape: Vec<usize>,
}

impl Field {
    /// Creates a scalar field.
    pub fn new(name: impl Into<String>, dtype: ScalarType) -> Self {
        Field {
            name: name.into(),
            dtype,
            shape: Vec::new(),
        }
    }

    /// Creates a sub-array field; `("a", UInt8, [2])` consumes two columns per row.
    pub fn with_shape(name: impl Into<String>, dtype: ScalarType, shape: Vec<usize>) -> Self {
        Field {
            name: name.into(),
            dtype,
            shape,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dtype(&self) -> ScalarType {
        self.dtype
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of text columns this field consumes per row.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shape.iter().product()
    }

    pub(crate) fn set_dtype(&mut self, dtype: ScalarType) {
        self.dtype = dtype;
    }
}

/// The element type of a read result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DType {
    Scalar(ScalarType),
    Structured(Vec<Field>),
}

impl DType {
    /// Builds a structured type from its fields.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty, a name repeats, or a field has an empty shape axis.
    pub fn structured(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let dtype = DType::Structured(fields.into_iter().collect());
        dtype.validate()?;
        Ok(dtype)
    }

    #[inline]
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, DType::Structured(_))
    }

    /// The fields of a structured type; empty for scalar types.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match self {
            DType::Scalar(_) => &[],
            DType::Structured(fields) => fields,
        }
    }

    /// Position of the field called `name`.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    /// Number of text columns one record consumes, when the type fixes it.
    #[must_use]
    pub fn column_count(&self) -> Option<usize> {
        match self {
            DType::Scalar(_) => None,
            DType::Structured(fields) => Some(fields.iter().map(Field::count).sum()),
        }
    }

    /// Returns `false` when some string width must be taken from the data.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        match self {
            DType::Scalar(ty) => ty.is_sized(),
            DType::Structured(fields) => fields.iter().all(|f| f.dtype.is_sized()),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let fields = match self {
            DType::Scalar(_) => return Ok(()),
            DType::Structured(fields) => fields,
        };
        if fields.is_empty() {
            return Err(Error::dtype("structured dtype needs at least one field"));
        }
        for (i, field) in fields.iter().enumerate() {
            if field.count() == 0 {
                return Err(Error::dtype(format!(
                    "field {:?} has a zero-length shape {:?}",
                    field.name, field.shape
                )));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::dtype(format!("duplicate field name {:?}", field.name)));
            }
        }
        Ok(())
    }
}

impl From<ScalarType> for DType {
    fn from(value: ScalarType) -> Self {
        DType::Scalar(value)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Scalar(ty) => write!(f, "{}", ty),
            DType::Structured(fields) => {
                write!(f, "[")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({:?}, {}", field.name, field.dtype)?;
                    if !field.shape.is_empty() {
                        write!(f, ", {:?}", field.shape)?;
                    }
                    write!(f, ")")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Parses a type code (`"f8"`, `"uint16"`, `"U12"`) or a comma-separated list of
/// codes (`"u1,f8,S7"`), the latter giving a structured type with fields `f0, f1, ...`.
impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !s.contains(',') {
            return s.parse::<ScalarType>().map(DType::Scalar);
        }
        let fields = s
            .split(',')
            .enumerate()
            .map(|(i, code)| Ok(Field::new(format!("f{}", i), code.parse()?)))
            .collect::<Result<Vec<_>>>()?;
        DType::structured(fields)
    }
}

impl Serialize for ScalarType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for ScalarType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DTypeRepr {
    Code(String),
    Fields(Vec<FieldRepr>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Shaped(String, ScalarType, ShapeRepr),
    Plain(String, ScalarType),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ShapeRepr {
    Count(usize),
    Dims(Vec<usize>),
}

impl Serialize for DType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            DType::Scalar(ty) => DTypeRepr::Code(ty.name()),
            DType::Structured(fields) => DTypeRepr::Fields(
                fields
                    .iter()
                    .map(|f| {
                        if f.shape.is_empty() {
                            FieldRepr::Plain(f.name.clone(), f.dtype)
                        } else {
                            FieldRepr::Shaped(f.name.clone(), f.dtype, ShapeRepr::Dims(f.shape.clone()))
                        }
                    })
                    .collect(),
            ),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match DTypeRepr::deserialize(deserializer)? {
            DTypeRepr::Code(code) => code.parse().map_err(serde::de::Error::custom),
            DTypeRepr::Fields(fields) => {
                DType::structured(fields.into_iter().map(|repr| match repr {
                    FieldRepr::Plain(name, ty) => Field::new(name, ty),
                    FieldRepr::Shaped(name, ty, ShapeRepr::Count(n)) => {
                        Field::with_shape(name, ty, vec![n])
                    }
                    FieldRepr::Shaped(name, ty, ShapeRepr::Dims(dims)) => {
                        Field::with_shape(name, ty, dims)
                    }
                }))
                .map_err(serde::de::Error::custom)
            }
        }
    }
}
