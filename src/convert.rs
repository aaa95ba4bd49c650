//! Per-column user converters.
//!
//! A [`Converter`] replaces the built-in parser for one column: it receives the
//! raw token and returns a [`Scalar`]. [`Converters`] keeps converters keyed by
//! column index in insertion order, backed by an [`IndexMap`]. Keys may be
//! negative, counting from the last column.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::{Converter, Converters, Scalar};
//!
//! let mut converters = Converters::new();
//! converters.insert(0, Converter::from_fn(|s| s.trim().to_uppercase()));
//! converters.insert(-1, Converter::new(|s| s.parse::<f64>().map(|v| v * 100.0)));
//!
//! let percent = converters.get(-1).unwrap();
//! assert_eq!(percent.call("0.5").unwrap(), Scalar::Float(50.0));
//! ```

use crate::error::{BoxError, Error, Result};
use crate::value::Scalar;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> std::result::Result<Scalar, BoxError> + Send + Sync;

/// A shareable token-to-value function.
#[derive(Clone)]
pub struct Converter(Arc<ConvertFn>);

impl Converter {
    /// Wraps a fallible conversion. Its error is reported unchanged as the
    /// source of an [`Error::Converter`].
    pub fn new<F, T, E>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
        T: Into<Scalar>,
        E: Into<BoxError>,
    {
        Converter(Arc::new(
            move |token: &str| -> std::result::Result<Scalar, BoxError> {
                f(token).map(Into::into).map_err(Into::into)
            },
        ))
    }

    /// Wraps a conversion that cannot fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{Converter, Scalar};
    ///
    /// let len = Converter::from_fn(|s| s.len() as u64);
    /// assert_eq!(len.call("abc").unwrap(), Scalar::UInt(3));
    /// ```
    pub fn from_fn<F, T>(f: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
        T: Into<Scalar>,
    {
        Converter(Arc::new(
            move |token: &str| -> std::result::Result<Scalar, BoxError> { Ok(f(token).into()) },
        ))
    }

    /// Applies the converter to a token.
    ///
    /// # Errors
    ///
    /// Returns whatever error the wrapped function produced.
    pub fn call(&self, token: &str) -> std::result::Result<Scalar, BoxError> {
        (self.0)(token)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter(..)")
    }
}

/// Converters keyed by column index, in insertion order.
#[derive(Clone, Default)]
pub struct Converters(IndexMap<isize, Converter>);

impl Converters {
    #[must_use]
    pub fn new() -> Self {
        Converters(IndexMap::new())
    }

    /// Inserts a converter for `column`, returning the one it replaces.
    pub fn insert(&mut self, column: isize, converter: Converter) -> Option<Converter> {
        self.0.insert(column, converter)
    }

    #[must_use]
    pub fn get(&self, column: isize) -> Option<&Converter> {
        self.0.get(&column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(column, converter)` pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, isize, Converter> {
        self.0.iter()
    }

    /// Places every converter at its output column for rows of `ncols` columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a key outside `-ncols..ncols`, or for two
    /// keys that name the same column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use readtext::{Converter, Converters};
    ///
    /// let mut converters = Converters::new();
    /// converters.insert(-1, Converter::from_fn(|s| s.len() as u64));
    /// let slots = converters.resolve(3).unwrap();
    /// assert!(slots[2].is_some() && slots[0].is_none());
    ///
    /// converters.insert(2, Converter::from_fn(|s| s.len() as u64));
    /// assert!(converters.resolve(3).is_err());
    /// ```
    pub fn resolve(&self, ncols: usize) -> Result<Vec<Option<Converter>>> {
        let mut slots = vec![None; ncols];
        for (&key, converter) in &self.0 {
            let index = normalize_index(key, ncols).ok_or_else(|| {
                Error::config(format!(
                    "converter key {} is out of range for {} columns",
                    key, ncols
                ))
            })?;
            if slots[index].replace(converter.clone()).is_some() {
                return Err(Error::config(format!(
                    "more than one converter given for column {}",
                    index
                )));
            }
        }
        Ok(slots)
    }
}

/// Maps a possibly negative index into `0..len`.
pub(crate) fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl FromIterator<(isize, Converter)> for Converters {
    fn from_iter<T: IntoIterator<Item = (isize, Converter)>>(iter: T) -> Self {
        Converters(IndexMap::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a Converters {
    type Item = (&'a isize, &'a Converter);
    type IntoIter = indexmap::map::Iter<'a, isize, Converter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
