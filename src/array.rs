//! Typed, shaped result arrays.
//!
//! A read produces an [`NdArray`]: a dtype, a shape and row-major element
//! storage. Homogeneous arrays keep one [`Buffer`]; structured arrays keep one
//! buffer per field, where a sub-array field stores its elements contiguously
//! per record.
//!
//! Fixed-width strings are stored padded with NUL (`S<n>`: bytes, `U<n>`:
//! characters); accessors strip the padding.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::{read_str, ReadOptions, Scalar};
//!
//! let array = read_str("1 2 3\n4 5 6\n", &ReadOptions::new())
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//!
//! assert_eq!(array.shape(), &[2, 3]);
//! assert_eq!(array.get(&[1, 2]), Some(Scalar::UInt(6)));
//! assert_eq!(array.as_slice::<u8>(), Some(&[1, 2, 3, 4, 5, 6][..]));
//!
//! let t = array.transpose();
//! assert_eq!(t.shape(), &[3, 2]);
//! assert_eq!(t.as_slice::<u8>(), Some(&[1, 4, 2, 5, 3, 6][..]));
//! ```

use crate::dtype::{DType, ScalarType};
use crate::error::{Error, Result};
use crate::literal::{
    float_to_integer, parse_bool_or_int, parse_complex, parse_f32, parse_f64, parse_integer,
    push_fixed_bytes, push_fixed_chars, NumberSyntax,
};
use crate::value::Scalar;
use num_complex::{Complex32, Complex64};

/// Element storage of one homogeneous array or one structured field.
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex32>),
    Complex128(Vec<Complex64>),
    /// `width` bytes per element, NUL padded.
    Bytes { width: usize, data: Vec<u8> },
    /// `width` characters per element, `'\0'` padded.
    Unicode { width: usize, data: Vec<char> },
}

/// Evaluates the same expression on the vector of any non-string buffer.
macro_rules! each_vec {
    ($buffer:expr, $v:ident => $numeric:expr, $w:ident, $d:ident => $strings:expr) => {
        match $buffer {
            Buffer::Bool($v) => $numeric,
            Buffer::Int8($v) => $numeric,
            Buffer::Int16($v) => $numeric,
            Buffer::Int32($v) => $numeric,
            Buffer::Int64($v) => $numeric,
            Buffer::UInt8($v) => $numeric,
            Buffer::UInt16($v) => $numeric,
            Buffer::UInt32($v) => $numeric,
            Buffer::UInt64($v) => $numeric,
            Buffer::Float32($v) => $numeric,
            Buffer::Float64($v) => $numeric,
            Buffer::Complex64($v) => $numeric,
            Buffer::Complex128($v) => $numeric,
            Buffer::Bytes { width: $w, data: $d } => $strings,
            Buffer::Unicode { width: $w, data: $d } => $strings,
        }
    };
}

/// Rebuilds a buffer of the same variant from a per-variant expression.
macro_rules! map_vec {
    ($buffer:expr, $v:ident => $numeric:expr, $w:ident, $d:ident => $strings:expr) => {
        match $buffer {
            Buffer::Bool($v) => Buffer::Bool($numeric),
            Buffer::Int8($v) => Buffer::Int8($numeric),
            Buffer::Int16($v) => Buffer::Int16($numeric),
            Buffer::Int32($v) => Buffer::Int32($numeric),
            Buffer::Int64($v) => Buffer::Int64($numeric),
            Buffer::UInt8($v) => Buffer::UInt8($numeric),
            Buffer::UInt16($v) => Buffer::UInt16($numeric),
            Buffer::UInt32($v) => Buffer::UInt32($numeric),
            Buffer::UInt64($v) => Buffer::UInt64($numeric),
            Buffer::Float32($v) => Buffer::Float32($numeric),
            Buffer::Float64($v) => Buffer::Float64($numeric),
            Buffer::Complex64($v) => Buffer::Complex64($numeric),
            Buffer::Complex128($v) => Buffer::Complex128($numeric),
            Buffer::Bytes { width: $w, data: $d } => Buffer::Bytes {
                width: *$w,
                data: $strings,
            },
            Buffer::Unicode { width: $w, data: $d } => Buffer::Unicode {
                width: *$w,
                data: $strings,
            },
        }
    };
}

/// Pushes a parsed value, reporting whether parsing succeeded.
macro_rules! push_parsed {
    ($v:expr, $parsed:expr) => {
        match $parsed {
            Some(x) => {
                $v.push(x);
                true
            }
            None => false,
        }
    };
}

impl Buffer {
    /// Creates an empty buffer for `ty`. Unsized string types get width 1.
    #[must_use]
    pub fn with_capacity(ty: ScalarType, capacity: usize) -> Self {
        match ty {
            ScalarType::Bool => Buffer::Bool(Vec::with_capacity(capacity)),
            ScalarType::Int8 => Buffer::Int8(Vec::with_capacity(capacity)),
            ScalarType::Int16 => Buffer::Int16(Vec::with_capacity(capacity)),
            ScalarType::Int32 => Buffer::Int32(Vec::with_capacity(capacity)),
            ScalarType::Int64 => Buffer::Int64(Vec::with_capacity(capacity)),
            ScalarType::UInt8 => Buffer::UInt8(Vec::with_capacity(capacity)),
            ScalarType::UInt16 => Buffer::UInt16(Vec::with_capacity(capacity)),
            ScalarType::UInt32 => Buffer::UInt32(Vec::with_capacity(capacity)),
            ScalarType::UInt64 => Buffer::UInt64(Vec::with_capacity(capacity)),
            ScalarType::Float32 => Buffer::Float32(Vec::with_capacity(capacity)),
            ScalarType::Float64 => Buffer::Float64(Vec::with_capacity(capacity)),
            ScalarType::Complex64 => Buffer::Complex64(Vec::with_capacity(capacity)),
            ScalarType::Complex128 => Buffer::Complex128(Vec::with_capacity(capacity)),
            ScalarType::Bytes(width) => {
                let width = width.unwrap_or(1);
                Buffer::Bytes {
                    width,
                    data: Vec::with_capacity(capacity * width),
                }
            }
            ScalarType::Unicode(width) => {
                let width = width.unwrap_or(1);
                Buffer::Unicode {
                    width,
                    data: Vec::with_capacity(capacity * width),
                }
            }
        }
    }

    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Buffer::Bool(_) => ScalarType::Bool,
            Buffer::Int8(_) => ScalarType::Int8,
            Buffer::Int16(_) => ScalarType::Int16,
            Buffer::Int32(_) => ScalarType::Int32,
            Buffer::Int64(_) => ScalarType::Int64,
            Buffer::UInt8(_) => ScalarType::UInt8,
            Buffer::UInt16(_) => ScalarType::UInt16,
            Buffer::UInt32(_) => ScalarType::UInt32,
            Buffer::UInt64(_) => ScalarType::UInt64,
            Buffer::Float32(_) => ScalarType::Float32,
            Buffer::Float64(_) => ScalarType::Float64,
            Buffer::Complex64(_) => ScalarType::Complex64,
            Buffer::Complex128(_) => ScalarType::Complex128,
            Buffer::Bytes { width, .. } => ScalarType::Bytes(Some(*width)),
            Buffer::Unicode { width, .. } => ScalarType::Unicode(Some(*width)),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        each_vec!(self, v => v.len(), w, d => d.len().checked_div(*w).unwrap_or(0))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed view of the elements.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Element `index` as a [`Scalar`]; strings lose their NUL padding.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Buffer::Bytes { width, data } => {
                let slot = data.get(index * width..(index + 1) * width)?;
                let end = slot.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                Some(Scalar::Str(String::from_utf8_lossy(&slot[..end]).into_owned()))
            }
            Buffer::Unicode { width, data } => {
                let slot = data.get(index * width..(index + 1) * width)?;
                let end = slot.iter().rposition(|&c| c != '\0').map_or(0, |p| p + 1);
                Some(Scalar::Str(slot[..end].iter().collect()))
            }
            other => each_vec!(other, v => v.get(index).map(|x| Scalar::from(*x)), _w, _d => None),
        }
    }

    /// Copies the elements at `indices`, in that order.
    pub(crate) fn gather(&self, indices: &[usize]) -> Buffer {
        map_vec!(self,
            v => indices.iter().map(|&i| v[i]).collect(),
            w, d => indices
                .iter()
                .flat_map(|&i| d[i * *w..(i + 1) * *w].iter().copied())
                .collect()
        )
    }

    /// Parses `token` as this buffer's element type and appends it.
    ///
    /// Returns `false`, leaving the buffer unchanged, when the token is not a
    /// valid literal of the type. Strings never fail; they are truncated.
    pub fn push_token(&mut self, token: &str, syntax: &NumberSyntax, allow_float: bool) -> bool {
        match self {
            Buffer::Bool(v) => push_parsed!(v, parse_bool_or_int(token)),
            Buffer::Int8(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::Int16(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::Int32(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::Int64(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::UInt8(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::UInt16(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::UInt32(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::UInt64(v) => push_parsed!(v, parse_integer(token, syntax, allow_float)),
            Buffer::Float32(v) => push_parsed!(v, parse_f32(token, syntax)),
            Buffer::Float64(v) => push_parsed!(v, parse_f64(token, syntax)),
            Buffer::Complex64(v) => push_parsed!(v, parse_complex::<f32>(token, syntax)),
            Buffer::Complex128(v) => push_parsed!(v, parse_complex::<f64>(token, syntax)),
            Buffer::Bytes { width, data } => {
                push_fixed_bytes(data, *width, token);
                true
            }
            Buffer::Unicode { width, data } => {
                push_fixed_chars(data, *width, token);
                true
            }
        }
    }

    /// Casts a converter result to this buffer's element type and appends it.
    ///
    /// Strings are parsed as literals, floats truncate toward zero for integer
    /// targets and any value is formatted for string targets.
    pub fn push_scalar(&mut self, value: &Scalar, syntax: &NumberSyntax) -> bool {
        match self {
            Buffer::Bool(v) => push_parsed!(v, scalar_to_bool(value)),
            Buffer::Int8(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::Int16(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::Int32(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::Int64(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::UInt8(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::UInt16(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::UInt32(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::UInt64(v) => push_parsed!(v, scalar_to_integer(value, syntax)),
            Buffer::Float32(v) => push_parsed!(
                v,
                match value {
                    Scalar::Str(s) => parse_f32(s, syntax),
                    other => other.as_f64().map(|x| x as f32),
                }
            ),
            Buffer::Float64(v) => push_parsed!(
                v,
                match value {
                    Scalar::Str(s) => parse_f64(s, syntax),
                    other => other.as_f64(),
                }
            ),
            Buffer::Complex64(v) => push_parsed!(
                v,
                match value {
                    Scalar::Str(s) => parse_complex::<f32>(s, syntax),
                    other => other
                        .as_complex()
                        .map(|c| Complex32::new(c.re as f32, c.im as f32)),
                }
            ),
            Buffer::Complex128(v) => push_parsed!(
                v,
                match value {
                    Scalar::Str(s) => parse_complex::<f64>(s, syntax),
                    other => other.as_complex(),
                }
            ),
            Buffer::Bytes { width, data } => {
                match value {
                    Scalar::Str(s) => push_fixed_bytes(data, *width, s),
                    other => push_fixed_bytes(data, *width, &other.to_string()),
                }
                true
            }
            Buffer::Unicode { width, data } => {
                match value {
                    Scalar::Str(s) => push_fixed_chars(data, *width, s),
                    other => push_fixed_chars(data, *width, &other.to_string()),
                }
                true
            }
        }
    }
}

fn scalar_to_bool(value: &Scalar) -> Option<bool> {
    match value {
        Scalar::Bool(b) => Some(*b),
        Scalar::Int(i) => Some(*i != 0),
        Scalar::UInt(u) => Some(*u != 0),
        Scalar::Float(f) => Some(*f != 0.0),
        Scalar::Complex(c) => Some(c.re != 0.0 || c.im != 0.0),
        Scalar::Str(s) => parse_bool_or_int(s),
    }
}

fn scalar_to_integer<T>(value: &Scalar, syntax: &NumberSyntax) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match value {
        Scalar::Bool(b) => <T as TryFrom<i64>>::try_from(i64::from(*b)).ok(),
        Scalar::Int(i) => <T as TryFrom<i64>>::try_from(*i).ok(),
        Scalar::UInt(u) => <T as TryFrom<u64>>::try_from(*u).ok(),
        Scalar::Float(f) => float_to_integer(*f),
        Scalar::Complex(_) => None,
        Scalar::Str(s) => parse_integer(s, syntax, true),
    }
}

/// Element types with a typed view into a [`Buffer`].
pub trait Element: Copy + 'static {
    /// The buffer's elements, if the buffer holds this type.
    fn slice(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                #[inline]
                fn slice(buffer: &Buffer) -> Option<&[Self]> {
                    match buffer {
                        Buffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Complex32 => Complex64,
    Complex64 => Complex128,
}

#[derive(Clone, Debug, PartialEq)]
enum Storage {
    Homogeneous(Buffer),
    Structured(Vec<Buffer>),
}

/// An n-dimensional array of homogeneous elements or of structured records.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Storage,
}

impl NdArray {
    /// Wraps a buffer in an array of the given shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] when the shape does not hold exactly `buffer.len()` elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{Buffer, NdArray};
    ///
    /// let array = NdArray::from_buffer(Buffer::Float64(vec![1.0, 2.0, 3.0, 4.0]), vec![2, 2]).unwrap();
    /// assert_eq!(array.ndim(), 2);
    /// assert!(NdArray::from_buffer(Buffer::Float64(vec![1.0]), vec![2]).is_err());
    /// ```
    pub fn from_buffer(buffer: Buffer, shape: Vec<usize>) -> Result<Self> {
        let size: usize = shape.iter().product();
        if size != buffer.len() {
            return Err(Error::shape(format!(
                "shape {:?} needs {} elements, buffer has {}",
                shape,
                size,
                buffer.len()
            )));
        }
        Ok(NdArray {
            dtype: DType::Scalar(buffer.scalar_type()),
            shape,
            data: Storage::Homogeneous(buffer),
        })
    }

    /// Builds a 1-D structured array from one buffer per field.
    pub(crate) fn from_fields(dtype: DType, fields: Vec<Buffer>, records: usize) -> Self {
        NdArray {
            dtype,
            shape: vec![records],
            data: Storage::Structured(fields),
        }
    }

    /// An empty 1-D array of `dtype`.
    pub(crate) fn empty(dtype: DType) -> Self {
        let data = match &dtype {
            DType::Scalar(ty) => Storage::Homogeneous(Buffer::with_capacity(*ty, 0)),
            DType::Structured(fields) => Storage::Structured(
                fields
                    .iter()
                    .map(|f| Buffer::with_capacity(f.dtype(), 0))
                    .collect(),
            ),
        };
        NdArray {
            dtype,
            shape: vec![0],
            data,
        }
    }

    #[inline]
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    #[must_use]
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// Number of elements (records, for structured arrays).
    #[must_use]
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self.data, Storage::Structured(_))
    }

    /// The element buffer of a homogeneous array.
    #[must_use]
    pub fn buffer(&self) -> Option<&Buffer> {
        match &self.data {
            Storage::Homogeneous(buffer) => Some(buffer),
            Storage::Structured(_) => None,
        }
    }

    /// Row-major typed view of a homogeneous array.
    #[must_use]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.buffer().and_then(T::slice)
    }

    fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        index
            .iter()
            .zip(&self.shape)
            .try_fold(0, |acc, (&i, &n)| (i < n).then_some(acc * n + i))
    }

    /// Element at a multi-index of a homogeneous array.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<Scalar> {
        let offset = self.offset(index)?;
        self.buffer()?.get(offset)
    }

    /// Values of the record at a multi-index of a structured array, field by
    /// field, sub-array fields contributing all of their elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{read_str, DType, ReadOptions, Scalar};
    ///
    /// let dtype: DType = "u1,f8".parse().unwrap();
    /// let options = ReadOptions::new().with_dtype(dtype);
    /// let array = read_str("1 2.5\n3 4.5\n", &options).unwrap().into_array().unwrap();
    /// assert_eq!(array.record(&[1]), Some(vec![Scalar::UInt(3), Scalar::Float(4.5)]));
    /// ```
    #[must_use]
    pub fn record(&self, index: &[usize]) -> Option<Vec<Scalar>> {
        let offset = self.offset(index)?;
        let buffers = match &self.data {
            Storage::Structured(buffers) => buffers,
            Storage::Homogeneous(_) => return None,
        };
        let mut values = Vec::new();
        for (field, buffer) in self.dtype.fields().iter().zip(buffers) {
            let count = field.count();
            for k in 0..count {
                values.push(buffer.get(offset * count + k)?);
            }
        }
        Some(values)
    }

    /// The values of one field of a structured array, shaped
    /// `self.shape() + field.shape()`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<NdArray> {
        let index = self.dtype.field_index(name)?;
        let field = &self.dtype.fields()[index];
        let buffer = match &self.data {
            Storage::Structured(buffers) => buffers.get(index)?.clone(),
            Storage::Homogeneous(_) => return None,
        };
        let mut shape = self.shape.clone();
        shape.extend_from_slice(field.shape());
        Some(NdArray {
            dtype: DType::Scalar(field.dtype()),
            shape,
            data: Storage::Homogeneous(buffer),
        })
    }

    /// String elements of a homogeneous `S`/`U` array, padding removed.
    #[must_use]
    pub fn strings(&self) -> Option<Vec<String>> {
        let buffer = self.buffer()?;
        if !buffer.scalar_type().is_string() {
            return None;
        }
        (0..buffer.len())
            .map(|i| match buffer.get(i) {
                Some(Scalar::Str(s)) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// All elements of a homogeneous array in row-major order.
    #[must_use]
    pub fn to_scalars(&self) -> Option<Vec<Scalar>> {
        let buffer = self.buffer()?;
        (0..buffer.len()).map(|i| buffer.get(i)).collect()
    }

    /// Removes every axis of length one.
    #[must_use]
    pub fn squeeze(mut self) -> Self {
        self.shape.retain(|&n| n != 1);
        self
    }

    /// Gives the array a new shape with the same number of elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] when the element counts differ.
    pub fn reshape(mut self, shape: Vec<usize>) -> Result<Self> {
        let size: usize = shape.iter().product();
        if size != self.size() {
            return Err(Error::shape(format!(
                "cannot reshape {:?} into {:?}",
                self.shape, shape
            )));
        }
        self.shape = shape;
        Ok(self)
    }

    /// Reverses the axes, copying elements into the new row-major order.
    #[must_use]
    pub fn transpose(&self) -> Self {
        if self.ndim() < 2 {
            return self.clone();
        }
        let shape: Vec<usize> = self.shape.iter().rev().copied().collect();
        let order = reversed_order(&self.shape);
        let data = match &self.data {
            Storage::Homogeneous(buffer) => Storage::Homogeneous(buffer.gather(&order)),
            Storage::Structured(buffers) => Storage::Structured(
                self.dtype
                    .fields()
                    .iter()
                    .zip(buffers)
                    .map(|(field, buffer)| buffer.gather(&expand_blocks(&order, field.count())))
                    .collect(),
            ),
        };
        NdArray {
            dtype: self.dtype.clone(),
            shape,
            data,
        }
    }

    /// Applies the minimum-dimension policy: squeeze when above `ndmin`, then
    /// pad up to `ndmin` axes.
    pub(crate) fn normalize(self, ndmin: usize) -> Self {
        let mut array = if self.ndim() > ndmin {
            self.squeeze()
        } else {
            self
        };
        if array.ndim() < ndmin {
            array.shape = match array.shape.as_slice() {
                [] if ndmin == 1 => vec![1],
                [] => vec![1, 1],
                [n] => vec![*n, 1],
                other => other.to_vec(),
            };
        }
        array
    }

    /// Splits the array into its columns.
    ///
    /// Structured arrays yield one array per field. Homogeneous arrays are
    /// transposed and split along the new first axis, so a `(rows, cols)`
    /// array yields `cols` arrays of shape `(rows,)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{read_str, ReadOptions};
    ///
    /// let array = read_str("1 2\n3 4\n5 6\n", &ReadOptions::new()).unwrap().into_array().unwrap();
    /// let columns = array.unpack();
    /// assert_eq!(columns.len(), 2);
    /// assert_eq!(columns[1].as_slice::<u8>(), Some(&[2, 4, 6][..]));
    /// ```
    #[must_use]
    pub fn unpack(&self) -> Vec<NdArray> {
        if self.is_structured() {
            return self
                .dtype
                .fields()
                .iter()
                .filter_map(|f| self.field(f.name()))
                .collect();
        }
        let transposed = self.transpose();
        let buffer = match &transposed.data {
            Storage::Homogeneous(buffer) => buffer,
            Storage::Structured(_) => return Vec::new(),
        };
        let (first, inner) = match transposed.shape.split_first() {
            Some((first, inner)) => (*first, inner.to_vec()),
            None => return vec![transposed],
        };
        let chunk: usize = inner.iter().product();
        (0..first)
            .map(|i| {
                let indices: Vec<usize> = (i * chunk..(i + 1) * chunk).collect();
                NdArray {
                    dtype: transposed.dtype.clone(),
                    shape: inner.clone(),
                    data: Storage::Homogeneous(buffer.gather(&indices)),
                }
            })
            .collect()
    }
}

/// Source offsets, in output order, of the transpose of a row-major array of `shape`.
fn reversed_order(shape: &[usize]) -> Vec<usize> {
    let ndim = shape.len();
    let mut strides = vec![1; ndim];
    for d in (0..ndim.saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    let out_shape: Vec<usize> = shape.iter().rev().copied().collect();
    let size: usize = shape.iter().product();
    let mut order = Vec::with_capacity(size);
    let mut index = vec![0usize; ndim];
    for _ in 0..size {
        // output axis k is input axis ndim - 1 - k
        order.push(
            index
                .iter()
                .enumerate()
                .map(|(k, &i)| i * strides[ndim - 1 - k])
                .sum(),
        );
        for d in (0..ndim).rev() {
            index[d] += 1;
            if index[d] < out_shape[d] {
                break;
            }
            index[d] = 0;
        }
    }
    order
}

fn expand_blocks(order: &[usize], block: usize) -> Vec<usize> {
    order
        .iter()
        .flat_map(|&o| o * block..(o + 1) * block)
        .collect()
}

/// The result of a read.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// The whole table as one array.
    Array(NdArray),
    /// One array per column or field, when unpacking was requested.
    Columns(Vec<NdArray>),
}

impl Output {
    #[must_use]
    pub fn into_array(self) -> Option<NdArray> {
        match self {
            Output::Array(array) => Some(array),
            Output::Columns(_) => None,
        }
    }

    #[must_use]
    pub fn into_columns(self) -> Option<Vec<NdArray>> {
        match self {
            Output::Columns(columns) => Some(columns),
            Output::Array(_) => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Output::Array(array) => Some(array),
            Output::Columns(_) => None,
        }
    }
}
