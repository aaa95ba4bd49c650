//! Dynamically-typed field values.
//!
//! [`Scalar`] is what a converter returns for a token and what element accessors
//! of [`NdArray`](crate::NdArray) hand back. It is a tagged union over the
//! kinds of values a text column can hold.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use readtext::Scalar;
//!
//! let value = Scalar::from(42u8);
//! assert!(value.is_integer());
//! assert_eq!(value.as_f64(), Some(42.0));
//!
//! let text = Scalar::from("alpha");
//! assert_eq!(text.as_str(), Some("alpha"));
//! ```

use num_complex::{Complex32, Complex64};
use std::fmt;

/// A single field value.
///
/// Unsigned values that fit in `i64` may be represented by either integer
/// variant; [`Scalar::as_i64`] and [`Scalar::as_u64`] accept both.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex64),
    Str(String),
}

impl Scalar {
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Scalar::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::UInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Scalar::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self, Scalar::Complex(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Scalar::Str(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as `i64` for integers that fit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::Scalar;
    ///
    /// assert_eq!(Scalar::UInt(7).as_i64(), Some(7));
    /// assert_eq!(Scalar::UInt(u64::MAX).as_i64(), None);
    /// assert_eq!(Scalar::Float(7.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Int(i) => u64::try_from(*i).ok(),
            Scalar::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Returns the value as `f64` for booleans, integers and floats.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::UInt(u) => Some(*u as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a complex number for every numeric variant.
    #[inline]
    #[must_use]
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Scalar::Complex(c) => Some(*c),
            other => other.as_f64().map(|re| Complex64::new(re, 0.0)),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::UInt(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Complex(c) => write!(f, "{}", c),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i8> for Scalar {
    fn from(value: i8) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i16> for Scalar {
    fn from(value: i16) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u8> for Scalar {
    fn from(value: u8) -> Self {
        Scalar::UInt(value as u64)
    }
}

impl From<u16> for Scalar {
    fn from(value: u16) -> Self {
        Scalar::UInt(value as u64)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::UInt(value as u64)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::UInt(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(value as f64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<Complex32> for Scalar {
    fn from(value: Complex32) -> Self {
        Scalar::Complex(Complex64::new(value.re as f64, value.im as f64))
    }
}

impl From<Complex64> for Scalar {
    fn from(value: Complex64) -> Self {
        Scalar::Complex(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl TryFrom<Scalar> for f64 {
    type Error = crate::Error;

    fn try_from(value: Scalar) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::dtype(format!("expected a real number, found {:?}", value)))
    }
}

impl TryFrom<Scalar> for i64 {
    type Error = crate::Error;

    fn try_from(value: Scalar) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::dtype(format!("expected an int64, found {:?}", value)))
    }
}

impl TryFrom<Scalar> for String {
    type Error = crate::Error;

    fn try_from(value: Scalar) -> crate::Result<Self> {
        match value {
            Scalar::Str(s) => Ok(s),
            other => Err(crate::Error::dtype(format!(
                "expected a string, found {:?}",
                other
            ))),
        }
    }
}
