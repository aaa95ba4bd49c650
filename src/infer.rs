//! Column type inference.
//!
//! Each retained column gets a [`ColumnInference`] that watches every token (or
//! converter result) of that column and keeps the least type able to hold all
//! of them, following the lattice
//! `bool < integer < float < complex < string`.
//! Booleans only mix with booleans: a column holding both `true` and `3` is a
//! string column. Integer columns remember their observed range so they can be
//! given the narrowest signed or unsigned width.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::infer::ColumnInference;
//! use readtext::literal::NumberSyntax;
//! use readtext::{ScalarType, StringKind};
//!
//! let syntax = NumberSyntax::default();
//! let mut column = ColumnInference::new();
//! for token in ["1000", "2000", "6543"] {
//!     column.observe_token(token, &syntax);
//! }
//! assert_eq!(column.resolve(StringKind::Bytes), ScalarType::UInt16);
//!
//! column.observe_token("-1", &syntax);
//! assert_eq!(column.resolve(StringKind::Bytes), ScalarType::Int16);
//!
//! column.observe_token("alpha", &syntax);
//! assert_eq!(column.resolve(StringKind::Bytes), ScalarType::Bytes(Some(5)));
//! ```

use crate::dtype::{DType, Field, ScalarType};
use crate::literal::{parse_bool, parse_complex, parse_f64, parse_i64, parse_u64, NumberSyntax};
use crate::options::StringKind;
use crate::value::Scalar;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Empty,
    Bool,
    Integer,
    Float,
    Complex,
    Str,
}

/// Running type summary of one column.
#[derive(Clone, Debug)]
pub struct ColumnInference {
    kind: Kind,
    saw_bool: bool,
    saw_other: bool,
    min: i128,
    max: i128,
    bytes: usize,
    chars: usize,
}

impl Default for ColumnInference {
    fn default() -> Self {
        ColumnInference {
            kind: Kind::Empty,
            saw_bool: false,
            saw_other: false,
            min: i128::MAX,
            max: i128::MIN,
            bytes: 0,
            chars: 0,
        }
    }
}

impl ColumnInference {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest value seen so far, in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.bytes
    }

    /// Longest value seen so far, in characters.
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.chars
    }

    fn observe_width(&mut self, text: &str) {
        self.bytes = self.bytes.max(text.len());
        self.chars = self.chars.max(text.chars().count());
    }

    fn observe_integer(&mut self, value: i128) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.join(Kind::Integer);
    }

    fn join(&mut self, kind: Kind) {
        if kind == Kind::Bool {
            self.saw_bool = true;
        } else {
            self.saw_other = true;
        }
        self.kind = if self.saw_bool && self.saw_other {
            Kind::Str
        } else {
            self.kind.max(kind)
        };
    }

    /// Records one raw token.
    pub fn observe_token(&mut self, token: &str, syntax: &NumberSyntax) {
        self.observe_width(token);
        if self.kind == Kind::Str {
            return;
        }
        if parse_bool(token).is_some() {
            self.join(Kind::Bool);
        } else if let Some(v) = parse_i64(token) {
            self.observe_integer(i128::from(v));
        } else if let Some(v) = parse_u64(token) {
            self.observe_integer(i128::from(v));
        } else if parse_f64(token, syntax).is_some() {
            self.join(Kind::Float);
        } else if token.bytes().any(|b| b.is_ascii_digit())
            && parse_complex::<f64>(token, syntax).is_some()
        {
            self.join(Kind::Complex);
        } else {
            self.join(Kind::Str);
        }
    }

    /// Records one converter result.
    pub fn observe_scalar(&mut self, value: &Scalar) {
        match value {
            Scalar::Bool(_) => self.join(Kind::Bool),
            Scalar::Int(i) => self.observe_integer(i128::from(*i)),
            Scalar::UInt(u) => self.observe_integer(i128::from(*u)),
            Scalar::Float(_) => self.join(Kind::Float),
            Scalar::Complex(_) => self.join(Kind::Complex),
            Scalar::Str(s) => {
                self.observe_width(s);
                self.join(Kind::Str);
            }
        }
    }

    /// The least type holding every observed value.
    ///
    /// A column that saw nothing resolves to `float64`.
    #[must_use]
    pub fn resolve(&self, strings: StringKind) -> ScalarType {
        match self.kind {
            Kind::Empty | Kind::Float => ScalarType::Float64,
            Kind::Bool => ScalarType::Bool,
            Kind::Integer => integer_type(self.min, self.max),
            Kind::Complex => ScalarType::Complex128,
            Kind::Str => match strings {
                StringKind::Bytes => ScalarType::Bytes(Some(self.bytes.max(1))),
                StringKind::Unicode => ScalarType::Unicode(Some(self.chars.max(1))),
            },
        }
    }
}

/// Narrowest integer type covering `min..=max`, or `float64` when none does.
fn integer_type(min: i128, max: i128) -> ScalarType {
    let fits = |lo: i128, hi: i128| min >= lo && max <= hi;
    if min >= 0 {
        if fits(0, i128::from(u8::MAX)) {
            ScalarType::UInt8
        } else if fits(0, i128::from(u16::MAX)) {
            ScalarType::UInt16
        } else if fits(0, i128::from(u32::MAX)) {
            ScalarType::UInt32
        } else {
            ScalarType::UInt64
        }
    } else if fits(i128::from(i8::MIN), i128::from(i8::MAX)) {
        ScalarType::Int8
    } else if fits(i128::from(i16::MIN), i128::from(i16::MAX)) {
        ScalarType::Int16
    } else if fits(i128::from(i32::MIN), i128::from(i32::MAX)) {
        ScalarType::Int32
    } else if fits(i128::from(i64::MIN), i128::from(i64::MAX)) {
        ScalarType::Int64
    } else {
        ScalarType::Float64
    }
}

/// Combines per-column types into the result dtype.
///
/// Columns that all share one type give a homogeneous dtype; string columns of
/// different widths share the widest. Anything else becomes a structured dtype
/// with fields `f0, f1, ...`.
#[must_use]
pub fn resolve_dtype(columns: &[ColumnInference], strings: StringKind) -> DType {
    let types: Vec<ScalarType> = columns.iter().map(|c| c.resolve(strings)).collect();
    let first = match types.first() {
        Some(first) => *first,
        None => return DType::Scalar(ScalarType::Float64),
    };
    if types.iter().all(|t| *t == first) {
        return DType::Scalar(first);
    }
    if types.iter().all(ScalarType::is_string) {
        let width = columns
            .iter()
            .map(|c| match strings {
                StringKind::Bytes => c.max_bytes(),
                StringKind::Unicode => c.max_chars(),
            })
            .max()
            .unwrap_or(0)
            .max(1);
        return DType::Scalar(first.with_width(width));
    }
    DType::Structured(
        types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| Field::new(format!("f{}", i), ty))
            .collect(),
    )
}

/// Fills in unsized string widths of an explicit dtype from the observed columns.
///
/// Structured fields spanning several columns take the widest of them. Widths
/// are never below one.
#[must_use]
pub fn size_strings(dtype: &DType, columns: &[ColumnInference]) -> DType {
    let width = |ty: ScalarType, cols: &[ColumnInference]| {
        let w = cols
            .iter()
            .map(|c| match ty {
                ScalarType::Unicode(_) => c.max_chars(),
                _ => c.max_bytes(),
            })
            .max()
            .unwrap_or(0);
        ty.with_width(w.max(1))
    };
    match dtype {
        DType::Scalar(ty) if !ty.is_sized() => DType::Scalar(width(*ty, columns)),
        DType::Scalar(_) => dtype.clone(),
        DType::Structured(fields) => {
            let mut offset = 0;
            let mut sized = fields.clone();
            for field in &mut sized {
                let count = field.count();
                let end = (offset + count).min(columns.len());
                let start = offset.min(end);
                if !field.dtype().is_sized() {
                    let ty = width(field.dtype(), &columns[start..end]);
                    field.set_dtype(ty);
                }
                offset += count;
            }
            DType::Structured(sized)
        }
    }
}
