//! Splitting of physical lines into field tokens.
//!
//! A [`Tokenizer`] turns one line into a [`Row`]: the ordered list of field
//! tokens with quotes stripped, doubled quotes collapsed and comments removed.
//! A row that holds nothing after comment removal is blank and is reported as
//! such so the caller can drop it.
//!
//! ## Examples
//!
//! ```rust
//! use readtext::tokenizer::{Row, Tokenizer};
//! use readtext::Delimiter;
//!
//! let tokenizer = Tokenizer::new(Delimiter::from(","), vec!["#".to_string()], Some('"'));
//! let mut row = Row::new();
//!
//! assert!(tokenizer.tokenize("1, \"alpha, x\" ,3 # note", &mut row));
//! let fields: Vec<&str> = row.iter().map(|t| t.text).collect();
//! assert_eq!(fields, vec!["1", "alpha, x", "3"]);
//!
//! assert!(!tokenizer.tokenize("   # only a comment", &mut row));
//! ```

use crate::options::Delimiter;

/// Location of one field inside a [`Row`]'s buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FieldSpan {
    start: usize,
    end: usize,
    quoted: bool,
}

/// A field token borrowed from a [`Row`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// Field text with quotes removed.
    pub text: &'a str,
    /// Whether any part of the field was quote-delimited.
    pub quoted: bool,
}

/// The tokens of one physical line.
///
/// Rows are reused between lines; tokenizing into a row overwrites it.
#[derive(Clone, Debug, Default)]
pub struct Row {
    line: usize,
    buf: String,
    fields: Vec<FieldSpan>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Row::default()
    }

    /// The 1-based physical line number the row was read from.
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Number of fields in the row.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Token<'_>> {
        self.fields.get(index).map(|span| Token {
            text: &self.buf[span.start..span.end],
            quoted: span.quoted,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Token<'_>> + '_ {
        (0..self.fields.len()).filter_map(move |i| self.get(i))
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.fields.clear();
    }
}

/// Per-field bookkeeping while scanning a line.
#[derive(Default)]
struct FieldState {
    start: usize,
    first_quoted: Option<usize>,
    last_quoted_end: usize,
}

/// Line splitter configured with a delimiter, comment markers and a quote character.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    delimiter: Delimiter,
    comments: Vec<String>,
    quote: Option<char>,
}

impl Tokenizer {
    /// Creates a tokenizer.
    ///
    /// Comment markers must be non-empty; an empty marker matches everywhere
    /// and would make every line blank. [`ReadOptions::validate`] rejects them.
    ///
    /// [`ReadOptions::validate`]: crate::ReadOptions::validate
    #[must_use]
    pub fn new(delimiter: Delimiter, comments: Vec<String>, quote: Option<char>) -> Self {
        Tokenizer {
            delimiter,
            comments,
            quote,
        }
    }

    /// Tokenizes `line` into `row`, returning `false` when the row is blank.
    pub fn tokenize(&self, line: &str, row: &mut Row) -> bool {
        row.clear();
        if self.is_blank(line) {
            return false;
        }
        match &self.delimiter {
            Delimiter::Whitespace => self.split_whitespace(line.trim(), row),
            Delimiter::Literal(delim) => self.split_literal(line, delim, row),
        }
        !row.is_empty()
    }

    /// A line is blank when only whitespace precedes its first comment marker.
    fn is_blank(&self, line: &str) -> bool {
        for (i, c) in line.char_indices() {
            if self.comment_at(&line[i..]) {
                return true;
            }
            if Some(c) == self.quote || !c.is_whitespace() {
                return false;
            }
        }
        true
    }

    fn comment_at(&self, tail: &str) -> bool {
        self.comments.iter().any(|c| tail.starts_with(c.as_str()))
    }

    /// Handles a quote character at `tail` while inside a quoted span.
    ///
    /// Returns the number of bytes consumed and whether the span closed.
    fn close_quote(&self, tail: &str, q: char, buf: &mut String) -> (usize, bool) {
        let width = q.len_utf8();
        if tail[width..].starts_with(q) {
            buf.push(q);
            (2 * width, false)
        } else {
            (width, true)
        }
    }

    fn split_literal(&self, line: &str, delim: &str, row: &mut Row) {
        let mut state = FieldState::default();
        let mut in_quotes = false;
        let mut quoted = false;
        let mut i = 0;
        while i < line.len() {
            let tail = &line[i..];
            let c = match tail.chars().next() {
                Some(c) => c,
                None => break,
            };
            if in_quotes {
                if Some(c) == self.quote {
                    let (step, closed) = self.close_quote(tail, c, &mut row.buf);
                    if closed {
                        in_quotes = false;
                        state.last_quoted_end = row.buf.len();
                    }
                    i += step;
                } else {
                    row.buf.push(c);
                    i += c.len_utf8();
                }
                continue;
            }
            if self.comment_at(tail) {
                break;
            }
            if Some(c) == self.quote {
                in_quotes = true;
                quoted = true;
                state.first_quoted.get_or_insert(row.buf.len());
                i += c.len_utf8();
            } else if !delim.is_empty() && tail.starts_with(delim) {
                finish_trimmed(row, &state, quoted);
                state = FieldState {
                    start: row.buf.len(),
                    ..FieldState::default()
                };
                quoted = false;
                i += delim.len();
            } else {
                row.buf.push(c);
                i += c.len_utf8();
            }
        }
        finish_trimmed(row, &state, quoted);
    }

    fn split_whitespace(&self, line: &str, row: &mut Row) {
        let mut start = 0;
        let mut in_quotes = false;
        let mut quoted = false;
        let mut i = 0;
        while i < line.len() {
            let tail = &line[i..];
            let c = match tail.chars().next() {
                Some(c) => c,
                None => break,
            };
            if in_quotes {
                if Some(c) == self.quote {
                    let (step, closed) = self.close_quote(tail, c, &mut row.buf);
                    in_quotes = !closed;
                    i += step;
                } else {
                    row.buf.push(c);
                    i += c.len_utf8();
                }
                continue;
            }
            if self.comment_at(tail) {
                break;
            }
            if Some(c) == self.quote {
                in_quotes = true;
                quoted = true;
            } else if c.is_whitespace() {
                push_nonempty(row, start, quoted);
                start = row.buf.len();
                quoted = false;
            } else {
                row.buf.push(c);
            }
            i += c.len_utf8();
        }
        push_nonempty(row, start, quoted);
    }
}

fn push_nonempty(row: &mut Row, start: usize, quoted: bool) {
    if quoted || start != row.buf.len() {
        row.fields.push(FieldSpan {
            start,
            end: row.buf.len(),
            quoted,
        });
    }
}

/// Closes the current field, trimming whitespace that lies outside quoted spans.
fn finish_trimmed(row: &mut Row, state: &FieldState, quoted: bool) {
    let buf = &row.buf;
    let lead_limit = state.first_quoted.unwrap_or(buf.len());
    let lead = &buf[state.start..lead_limit];
    let start = state.start + (lead.len() - lead.trim_start().len());
    let protected = if quoted {
        state.last_quoted_end.max(start)
    } else {
        start
    };
    let end = protected + buf[protected..].trim_end().len();
    row.fields.push(FieldSpan { start, end, quoted });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(tokenizer: &Tokenizer, line: &str) -> Option<Vec<String>> {
        let mut row = Row::new();
        if tokenizer.tokenize(line, &mut row) {
            Some(row.iter().map(|t| t.text.to_string()).collect())
        } else {
            None
        }
    }

    fn csv() -> Tokenizer {
        Tokenizer::new(Delimiter::from(","), vec!["#".into()], Some('"'))
    }

    #[test]
    fn test_whitespace_runs() {
        let t = Tokenizer::new(Delimiter::Whitespace, vec!["#".into()], None);
        assert_eq!(
            fields(&t, "  1 \t 2   3  \r"),
            Some(vec!["1".into(), "2".into(), "3".into()])
        );
        assert_eq!(fields(&t, "   "), None);
        assert_eq!(fields(&t, ""), None);
        assert_eq!(fields(&t, "# 1 2"), None);
        assert_eq!(fields(&t, "4 5 # 6"), Some(vec!["4".into(), "5".into()]));
    }

    #[test]
    fn test_whitespace_with_quotes() {
        let t = Tokenizer::new(Delimiter::Whitespace, vec![], Some('"'));
        assert_eq!(
            fields(&t, "\"a b\" c \"\""),
            Some(vec!["a b".into(), "c".into(), "".into()])
        );
    }

    #[test]
    fn test_literal_delimiter_keeps_empty_fields() {
        assert_eq!(
            fields(&csv(), "1,,3,"),
            Some(vec!["1".into(), "".into(), "3".into(), "".into()])
        );
    }

    #[test]
    fn test_quoted_field_suppresses_delimiter_and_comment() {
        assert_eq!(
            fields(&csv(), "\"a,#b\",c"),
            Some(vec!["a,#b".into(), "c".into()])
        );
    }

    #[test]
    fn test_doubled_quote_is_literal() {
        assert_eq!(
            fields(&csv(), "\"say \"\"hi\"\"\",x"),
            Some(vec!["say \"hi\"".into(), "x".into()])
        );
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(
            fields(&csv(), "1,\"open, still"),
            Some(vec!["1".into(), "open, still".into()])
        );
    }

    #[test]
    fn test_trimming_preserves_quoted_whitespace() {
        assert_eq!(
            fields(&csv(), "  a  ,  \" b \"  , c"),
            Some(vec!["a".into(), " b ".into(), "c".into()])
        );
    }

    #[test]
    fn test_blank_detection() {
        assert_eq!(fields(&csv(), ""), None);
        assert_eq!(fields(&csv(), "   # comment"), None);
        assert_eq!(fields(&csv(), "\"\""), Some(vec!["".into()]));
        assert_eq!(fields(&csv(), ","), Some(vec!["".into(), "".into()]));
    }

    #[test]
    fn test_whitespace_literal_delimiters_skip_blank_lines() {
        for delim in [" ", "\t"] {
            let t = Tokenizer::new(Delimiter::from(delim), vec!["#".into()], None);
            assert_eq!(fields(&t, "     "), None, "delimiter {:?}", delim);
            assert_eq!(fields(&t, "\t"), None, "delimiter {:?}", delim);
            assert_eq!(fields(&t, " \t # note"), None, "delimiter {:?}", delim);
        }
        let t = Tokenizer::new(Delimiter::from(" "), vec![], None);
        assert_eq!(
            fields(&t, "1 2 30"),
            Some(vec!["1".into(), "2".into(), "30".into()])
        );
        let t = Tokenizer::new(Delimiter::from("\t"), vec![], None);
        assert_eq!(fields(&t, "1\t\t3"), Some(vec!["1".into(), "".into(), "3".into()]));
    }

    #[test]
    fn test_multi_character_comments() {
        let t = Tokenizer::new(
            Delimiter::from(","),
            vec!["..".into(), "//".into(), "@-".into()],
            None,
        );
        assert_eq!(fields(&t, "1.5,2..note"), Some(vec!["1.5".into(), "2".into()]));
        assert_eq!(fields(&t, "// header"), None);
        assert_eq!(fields(&t, "3,4@-x"), Some(vec!["3".into(), "4".into()]));
        assert_eq!(fields(&t, "3@,4"), Some(vec!["3@".into(), "4".into()]));
    }

    #[test]
    fn test_multi_character_delimiter() {
        let t = Tokenizer::new(Delimiter::from("::"), vec![], None);
        assert_eq!(
            fields(&t, "a::b:c::d"),
            Some(vec!["a".into(), "b:c".into(), "d".into()])
        );
    }

    #[test]
    fn test_quoted_flag() {
        let mut row = Row::new();
        assert!(csv().tokenize("\"x\",y", &mut row));
        assert!(row.get(0).unwrap().quoted);
        assert!(!row.get(1).unwrap().quoted);
        assert_eq!(row.get(2), None);
    }
}
