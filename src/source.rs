//! Line sources and the row stream.
//!
//! A [`Source`] is anything that yields text lines one at a time: a buffered
//! reader, an in-memory string, a file path or an arbitrary iterator of lines.
//! [`RowStream`] layers `skiprows`, tokenization, blank-row removal and
//! `max_rows` on top of it, handing out one [`Row`] at a time.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::source::{RowStream, Source};
//! use readtext::tokenizer::Tokenizer;
//! use readtext::Delimiter;
//!
//! let source = Source::from_lines(vec!["header", "1 2", "", "3 4", "5 6"]);
//! let tokenizer = Tokenizer::new(Delimiter::Whitespace, vec![], None);
//! let mut rows = RowStream::new(source, tokenizer, 1, 2);
//!
//! let first = rows.next_row().unwrap().unwrap();
//! assert_eq!((first.line(), first.len()), (2, 2));
//! let second = rows.next_row().unwrap().unwrap();
//! assert_eq!(second.line(), 4);
//! assert!(rows.next_row().unwrap().is_none());
//! ```

use crate::error::{Error, Result};
use crate::tokenizer::{Row, Tokenizer};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::trace;

type Lines<'a> = Box<dyn Iterator<Item = io::Result<Cow<'a, str>>> + 'a>;

/// A sequence of text lines.
pub struct Source<'a> {
    lines: Lines<'a>,
}

impl<'a> Source<'a> {
    /// Reads lines from a buffered reader.
    pub fn from_reader<R: BufRead + 'a>(reader: R) -> Self {
        Source {
            lines: Box::new(reader.lines().map(|line| line.map(Cow::Owned))),
        }
    }

    /// Borrows lines from an in-memory string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &'a str) -> Self {
        Source {
            lines: Box::new(text.lines().map(|line| Ok(Cow::Borrowed(line)))),
        }
    }

    /// Wraps any iterator of lines, such as a generator of formatted rows.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<Cow<'a, str>>,
    {
        Source {
            lines: Box::new(lines.into_iter().map(|line| Ok(line.into()))),
        }
    }

    /// Opens a file for buffered line reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with line `0` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Source<'static>> {
        let file = File::open(path.as_ref())
            .map_err(|e| Error::io(0, &format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Source::from_reader(BufReader::new(file)))
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::from_str(text)
    }
}

impl<'a> Iterator for Source<'a> {
    type Item = io::Result<Cow<'a, str>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next()
    }
}

/// Strips one trailing line terminator (`\r\n`, `\n` or `\r`).
fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// Non-blank rows of a source, after skipping and before limiting.
pub struct RowStream<'a> {
    source: Source<'a>,
    tokenizer: Tokenizer,
    skiprows: usize,
    max_rows: usize,
    line: usize,
    emitted: usize,
    row: Row,
}

impl<'a> RowStream<'a> {
    /// Creates a stream that drops the first `skiprows` physical lines and stops
    /// after `max_rows` non-blank rows (`0` means no limit).
    pub fn new(source: Source<'a>, tokenizer: Tokenizer, skiprows: usize, max_rows: usize) -> Self {
        RowStream {
            source,
            tokenizer,
            skiprows,
            max_rows,
            line: 0,
            emitted: 0,
            row: Row::new(),
        }
    }

    /// Number of physical lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Returns the next non-blank row, or `None` at end of input or once the row limit is hit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the source fails to produce a line.
    pub fn next_row(&mut self) -> Result<Option<&Row>> {
        if self.max_rows != 0 && self.emitted >= self.max_rows {
            return Ok(None);
        }
        loop {
            let line = match self.source.next() {
                Some(line) => line.map_err(|e| Error::io(self.line + 1, &e.to_string()))?,
                None => return Ok(None),
            };
            self.line += 1;
            if self.line <= self.skiprows {
                trace!(line = self.line, "skipping line");
                continue;
            }
            if self.tokenizer.tokenize(strip_terminator(&line), &mut self.row) {
                self.row.set_line(self.line);
                self.emitted += 1;
                return Ok(Some(&self.row));
            }
            trace!(line = self.line, "blank row");
        }
    }
}
