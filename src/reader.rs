//! Row-to-array assembly.
//!
//! [`read`] drives one read: it validates the options, pulls rows from a
//! [`RowStream`], selects `usecols`, applies converters or literal parsers and
//! appends to typed buffers. With a fully sized explicit dtype this is a single
//! streaming pass. Otherwise the retained tokens are buffered while the column
//! types (or string widths) are inferred, then converted in a second pass.
//!
//! Line numbers in errors are 1-based physical lines; column numbers are
//! 0-based positions among the output columns.

use crate::array::{Buffer, NdArray, Output};
use crate::convert::{normalize_index, Converter, Converters};
use crate::dtype::{DType, ScalarType};
use crate::error::{Error, Result};
use crate::infer::{resolve_dtype, size_strings, ColumnInference};
use crate::literal::{NumberSyntax, ALLOW_FLOAT_FOR_INT};
use crate::options::ReadOptions;
use crate::source::{RowStream, Source};
use crate::tokenizer::Row;
use crate::value::Scalar;
use tracing::debug;

/// Reads every retained row of `source` into an array.
///
/// # Errors
///
/// Fails on invalid options, inconsistent rows, unparsable tokens, converter
/// failures and I/O errors. No partial result is returned.
pub fn read(source: Source<'_>, options: &ReadOptions) -> Result<Output> {
    options.validate()?;
    let skiprows = count(options.skiprows, "skiprows")?;
    let max_rows = options.max_rows.map_or(Ok(0), |m| count(m, "max_rows"))?;
    let ndmin = options.ndmin.map_or(Ok(1), |n| count(n, "ndmin"))?;
    debug!(
        delimiter = ?options.delimiter,
        dtype = ?options.dtype.as_ref().map(ToString::to_string),
        skiprows,
        max_rows,
        "reading text"
    );

    let syntax = options.number_syntax();
    let mut rows = RowStream::new(source, options.tokenizer(), skiprows, max_rows);
    let array = match &options.dtype {
        Some(dtype) if dtype.is_sized() => {
            let columns = Columns::new(options, Some(dtype))?;
            stream(&mut rows, dtype, columns, &syntax)?
        }
        _ => {
            let columns = Columns::new(options, options.dtype.as_ref())?;
            buffered(&mut rows, options, columns, &syntax)?
        }
    };
    let array = array.normalize(ndmin);
    debug!(
        lines = rows.lines_read(),
        shape = ?array.shape(),
        dtype = %array.dtype(),
        "read complete"
    );
    Ok(if options.unpack {
        Output::Columns(array.unpack())
    } else {
        Output::Array(array)
    })
}

fn count(value: i64, name: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::config(format!("{} must be non-negative, got {}", name, value)))
}

/// Column selection and converter placement, fixed once the output width is known.
struct Columns {
    usecols: Option<Vec<isize>>,
    expected: Option<usize>,
    converters: Converters,
    slots: Vec<Option<Converter>>,
}

impl Columns {
    fn new(options: &ReadOptions, dtype: Option<&DType>) -> Result<Self> {
        let expected = dtype
            .and_then(DType::column_count)
            .or_else(|| options.usecols.as_ref().map(Vec::len));
        let fields = dtype.and_then(DType::column_count);
        if let (Some(fields), Some(usecols)) = (fields, &options.usecols) {
            if fields != usecols.len() {
                return Err(Error::config(format!(
                    "usecols selects {} columns but the dtype needs {}",
                    usecols.len(),
                    fields
                )));
            }
        }
        let mut columns = Columns {
            usecols: options.usecols.clone(),
            expected: None,
            converters: options.converters.clone(),
            slots: Vec::new(),
        };
        if let Some(n) = expected {
            columns.fix_width(n)?;
        }
        Ok(columns)
    }

    fn fix_width(&mut self, ncols: usize) -> Result<()> {
        self.slots = self.converters.resolve(ncols)?;
        self.expected = Some(ncols);
        Ok(())
    }

    fn width(&self) -> usize {
        self.expected.unwrap_or(0)
    }

    fn converter(&self, column: usize) -> Option<&Converter> {
        self.slots.get(column).and_then(Option::as_ref)
    }

    /// Fills `out` with the row positions of the output columns.
    fn select(&mut self, row: &Row, out: &mut Vec<usize>) -> Result<()> {
        out.clear();
        match &self.usecols {
            Some(usecols) => {
                for &index in usecols {
                    let position = normalize_index(index, row.len()).ok_or(
                        Error::UsecolsOutOfRange {
                            line: row.line(),
                            index,
                            columns: row.len(),
                        },
                    )?;
                    out.push(position);
                }
            }
            None => out.extend(0..row.len()),
        }
        match self.expected {
            Some(expected) if expected != out.len() => {
                Err(Error::structure(row.line(), expected, out.len()))
            }
            Some(_) => Ok(()),
            None => self.fix_width(out.len()),
        }
    }
}

/// Typed buffers for a dtype, with output columns routed to their field.
struct Sink {
    dtype: DType,
    buffers: Vec<Buffer>,
    routes: Vec<usize>,
}

impl Sink {
    fn new(dtype: &DType, capacity: usize) -> Self {
        match dtype {
            DType::Scalar(ty) => Sink {
                dtype: dtype.clone(),
                buffers: vec![Buffer::with_capacity(*ty, capacity)],
                routes: Vec::new(),
            },
            DType::Structured(fields) => Sink {
                dtype: dtype.clone(),
                buffers: fields
                    .iter()
                    .map(|f| Buffer::with_capacity(f.dtype(), capacity * f.count()))
                    .collect(),
                routes: fields
                    .iter()
                    .enumerate()
                    .flat_map(|(i, f)| std::iter::repeat(i).take(f.count()))
                    .collect(),
            },
        }
    }

    fn buffer(&mut self, column: usize) -> &mut Buffer {
        let index = self.routes.get(column).copied().unwrap_or(0);
        &mut self.buffers[index]
    }

    /// Builds the array; `flat` requests a 1-D result for a homogeneous single column.
    fn finish(self, rows: usize, ncols: usize, flat: bool) -> Result<NdArray> {
        if rows == 0 {
            return Ok(NdArray::empty(self.dtype));
        }
        match self.dtype {
            DType::Scalar(_) => {
                let shape = if flat && ncols == 1 {
                    vec![rows]
                } else {
                    vec![rows, ncols]
                };
                let buffer = self
                    .buffers
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::shape("no buffer"))?;
                NdArray::from_buffer(buffer, shape)
            }
            DType::Structured(_) => Ok(NdArray::from_fields(self.dtype, self.buffers, rows)),
        }
    }
}

fn store(
    buffer: &mut Buffer,
    token: &str,
    converter: Option<&Converter>,
    line: usize,
    column: usize,
    syntax: &NumberSyntax,
) -> Result<()> {
    let stored = match converter {
        Some(converter) => {
            let value = converter
                .call(token)
                .map_err(|e| Error::converter(line, column, e))?;
            buffer.push_scalar(&value, syntax)
        }
        None => buffer.push_token(token, syntax, ALLOW_FLOAT_FOR_INT),
    };
    if stored {
        Ok(())
    } else {
        Err(Error::value(&buffer.scalar_type().name(), line, column, token))
    }
}

/// Single pass for a fully sized explicit dtype.
fn stream(
    rows: &mut RowStream<'_>,
    dtype: &DType,
    mut columns: Columns,
    syntax: &NumberSyntax,
) -> Result<NdArray> {
    let mut sink = Sink::new(dtype, 0);
    let mut selected = Vec::new();
    let mut nrows = 0;
    while let Some(row) = rows.next_row()? {
        columns.select(row, &mut selected)?;
        for (column, &position) in selected.iter().enumerate() {
            let token = row.get(position).map_or("", |t| t.text);
            store(
                sink.buffer(column),
                token,
                columns.converter(column),
                row.line(),
                column,
                syntax,
            )?;
        }
        nrows += 1;
    }
    sink.finish(nrows, columns.width(), false)
}

/// A retained field held between the inference pass and the conversion pass.
enum Cell {
    Token(Box<str>),
    Value(Scalar),
}

/// Two passes: observe and buffer every cell, fix the dtype, then convert.
fn buffered(
    rows: &mut RowStream<'_>,
    options: &ReadOptions,
    mut columns: Columns,
    syntax: &NumberSyntax,
) -> Result<NdArray> {
    let mut cells = Vec::new();
    let mut lines = Vec::new();
    let mut inference: Vec<ColumnInference> = Vec::new();
    let mut selected = Vec::new();
    while let Some(row) = rows.next_row()? {
        columns.select(row, &mut selected)?;
        if inference.is_empty() {
            inference = vec![ColumnInference::new(); selected.len()];
        }
        for (column, &position) in selected.iter().enumerate() {
            let token = row.get(position).map_or("", |t| t.text);
            let cell = match columns.converter(column) {
                Some(converter) => {
                    let value = converter
                        .call(token)
                        .map_err(|e| Error::converter(row.line(), column, e))?;
                    inference[column].observe_scalar(&value);
                    Cell::Value(value)
                }
                None => {
                    inference[column].observe_token(token, syntax);
                    Cell::Token(token.into())
                }
            };
            cells.push(cell);
        }
        lines.push(row.line());
    }

    let ncols = columns.width();
    let inferred = options.dtype.is_none();
    let dtype = match &options.dtype {
        Some(dtype) => size_strings(dtype, &inference),
        None if lines.is_empty() => DType::Scalar(ScalarType::Float64),
        None => resolve_dtype(&inference, options.string_kind),
    };
    debug!(rows = lines.len(), columns = ncols, dtype = %dtype, "resolved dtype");

    let mut sink = Sink::new(&dtype, lines.len() * ncols);
    if ncols > 0 {
        for (cells, &line) in cells.chunks(ncols).zip(&lines) {
            for (column, cell) in cells.iter().enumerate() {
                let buffer = sink.buffer(column);
                let stored = match cell {
                    Cell::Token(token) => buffer.push_token(token, syntax, ALLOW_FLOAT_FOR_INT),
                    Cell::Value(value) => buffer.push_scalar(value, syntax),
                };
                if !stored {
                    let token = match cell {
                        Cell::Token(token) => token.to_string(),
                        Cell::Value(value) => value.to_string(),
                    };
                    return Err(Error::value(&buffer.scalar_type().name(), line, column, &token));
                }
            }
        }
    }
    sink.finish(lines.len(), ncols, inferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Field;
    use crate::Converter;

    fn read_array(text: &str, options: &ReadOptions) -> Result<NdArray> {
        read(Source::from_str(text), options).map(|out| match out {
            Output::Array(array) => array,
            Output::Columns(_) => unreachable!(),
        })
    }

    #[test]
    fn test_structure_error_names_line() {
        let err = read_array("1 2\n\n3\n", &ReadOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Structure {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_usecols_out_of_range_names_row() {
        let options = ReadOptions::new().with_usecols([0, 2]);
        let err = read_array("1 2 3\n4 5\n", &options).unwrap_err();
        assert!(matches!(
            err,
            Error::UsecolsOutOfRange {
                line: 2,
                index: 2,
                columns: 2
            }
        ));
    }

    #[test]
    fn test_usecols_allows_ragged_rows() {
        let options = ReadOptions::new().with_usecols([0, -1]);
        let array = read_array("1 2 3\n4 5\n", &options).unwrap();
        assert_eq!(array.as_slice::<u8>(), Some(&[1, 3, 4, 5][..]));
    }

    #[test]
    fn test_dtype_and_usecols_width_must_agree() {
        let options = ReadOptions::new()
            .with_dtype("u1,u1".parse::<DType>().unwrap())
            .with_usecols([0]);
        assert!(read_array("1 2\n", &options).unwrap_err().is_config());
    }

    #[test]
    fn test_streaming_value_error() {
        let options = ReadOptions::new().with_dtype(ScalarType::Int16);
        let err = read_array("1 2\n3 4.x\n", &options).unwrap_err();
        assert!(matches!(err, Error::Value { line: 2, column: 1, .. }));
        assert!(err.to_string().starts_with("bad int16 value"));
    }

    #[test]
    fn test_converter_key_out_of_range_is_config_error() {
        let options = ReadOptions::new().with_converter(5, Converter::from_fn(|_| 0i64));
        assert!(read_array("1 2\n", &options).unwrap_err().is_config());
    }

    #[test]
    fn test_converter_runs_once_per_cell_when_inferring() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let options = ReadOptions::new().with_converter(
            0,
            Converter::from_fn(move |s| {
                seen.fetch_add(1, Ordering::SeqCst);
                s.len() as u64
            }),
        );
        let array = read_array("aa 1\nbbbb 2\n", &options).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(array.as_slice::<u8>(), Some(&[2, 1, 4, 2][..]));
    }

    #[test]
    fn test_structured_subarray_dtype() {
        let dtype = DType::structured([
            Field::with_shape("a", ScalarType::UInt8, vec![2]),
            Field::with_shape("b", ScalarType::UInt8, vec![2]),
        ])
        .unwrap();
        let options = ReadOptions::new().with_dtype(dtype);
        let array = read_array("1 2 3 4\n5 6 7 8\n", &options).unwrap();
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array.field("b").unwrap().as_slice::<u8>(), Some(&[3, 4, 7, 8][..]));
    }

    #[test]
    fn test_zero_rows_with_explicit_dtype() {
        let options = ReadOptions::new().with_dtype(ScalarType::Int32);
        let array = read_array("# nothing\n", &options).unwrap();
        assert_eq!(array.shape(), &[0]);
        assert_eq!(array.dtype(), &DType::Scalar(ScalarType::Int32));
    }
}
