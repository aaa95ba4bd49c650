//! Scalar literal parsers.
//!
//! Every parser receives a single token, ignores surrounding whitespace and
//! either produces a value of the requested type or `None`. Callers turn `None`
//! into a `bad <type> value` error.
//!
//! Floating-point parsing is delegated to the standard library's correctly
//! rounded decimal-to-binary conversion after the token has been rewritten into
//! canonical form (`.` as decimal point, `e` as exponent letter), so results are
//! bit-for-bit identical to parsing the canonical literal.

use num_complex::Complex;
use std::borrow::Cow;
use std::ops::Neg;
use std::str::FromStr;

/// Integer targets of an explicit dtype retry a failed integer parse as a
/// float and truncate toward zero. Always on; not exposed as an option.
pub const ALLOW_FLOAT_FOR_INT: bool = true;

/// Lexical conventions for numeric literals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberSyntax {
    /// Character used as decimal point in the text.
    pub decimal: char,
    /// Additional exponent letter (matched in either case), besides `e`/`E`.
    pub exponent: Option<char>,
    /// Suffix letter of imaginary parts (matched in either case).
    pub imaginary_unit: char,
    /// Accept complex literals wrapped in one pair of parentheses.
    pub allow_parens: bool,
}

impl Default for NumberSyntax {
    fn default() -> Self {
        NumberSyntax {
            decimal: '.',
            exponent: None,
            imaginary_unit: 'j',
            allow_parens: true,
        }
    }
}

impl NumberSyntax {
    fn is_exponent(&self, c: char) -> bool {
        self.exponent.map_or(false, |e| c.eq_ignore_ascii_case(&e))
    }

    /// Rewrites a token into the canonical spelling understood by `str::parse`.
    fn canonical<'t>(&self, token: &'t str) -> Cow<'t, str> {
        let token = token.trim();
        let rewrite = (self.decimal != '.' && token.contains(self.decimal))
            || token.chars().any(|c| self.is_exponent(c));
        if !rewrite {
            return Cow::Borrowed(token);
        }
        Cow::Owned(
            token
                .chars()
                .map(|c| {
                    if c == self.decimal {
                        '.'
                    } else if self.is_exponent(c) {
                        'e'
                    } else {
                        c
                    }
                })
                .collect(),
        )
    }
}

/// Parses `true` / `false` in any case.
///
/// # Examples
///
/// ```rust
/// use readtext::literal::parse_bool;
///
/// assert_eq!(parse_bool(" TRUE "), Some(true));
/// assert_eq!(parse_bool("False"), Some(false));
/// assert_eq!(parse_bool("1"), None);
/// ```
#[must_use]
pub fn parse_bool(token: &str) -> Option<bool> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Boolean parse used for explicit `bool` columns: literals, or integers (non-zero is true).
#[must_use]
pub fn parse_bool_or_int(token: &str) -> Option<bool> {
    parse_bool(token).or_else(|| parse_i64(token).map(|v| v != 0))
}

/// Parses an optionally signed decimal integer that fits in `i64`.
#[must_use]
pub fn parse_i64(token: &str) -> Option<i64> {
    token.trim().parse().ok()
}

/// Parses an optionally `+`-signed decimal integer that fits in `u64`.
#[must_use]
pub fn parse_u64(token: &str) -> Option<u64> {
    token.trim().parse().ok()
}

/// Parses an integer of type `T`, range-checked.
///
/// With `allow_float` a token that is not an integer literal is parsed as a
/// float and truncated toward zero; the truncated value must still fit `T`.
///
/// # Examples
///
/// ```rust
/// use readtext::literal::{parse_integer, NumberSyntax};
///
/// let syntax = NumberSyntax::default();
/// assert_eq!(parse_integer::<i8>("-128", &syntax, false), Some(-128));
/// assert_eq!(parse_integer::<u8>("256", &syntax, true), None);
/// assert_eq!(parse_integer::<u8>("3.7", &syntax, true), Some(3));
/// assert_eq!(parse_integer::<u8>("3.7", &syntax, false), None);
/// ```
#[must_use]
pub fn parse_integer<T>(token: &str, syntax: &NumberSyntax, allow_float: bool) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(v) = parse_i64(token) {
        return <T as TryFrom<i64>>::try_from(v).ok();
    }
    if let Some(v) = parse_u64(token) {
        return <T as TryFrom<u64>>::try_from(v).ok();
    }
    if !allow_float {
        return None;
    }
    float_to_integer(parse_f64(token, syntax)?)
}

/// Truncates a finite float toward zero and converts it when in range.
#[must_use]
pub fn float_to_integer<T>(value: f64) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if !value.is_finite() {
        return None;
    }
    let t = value.trunc();
    // 2^63 and 2^64 are exact in f64.
    if t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
        <T as TryFrom<i64>>::try_from(t as i64).ok()
    } else if t >= 0.0 && t < 18_446_744_073_709_551_616.0 {
        <T as TryFrom<u64>>::try_from(t as u64).ok()
    } else {
        None
    }
}

/// Parses a double-precision float.
///
/// # Examples
///
/// ```rust
/// use readtext::literal::{parse_f64, NumberSyntax};
///
/// let fortran = NumberSyntax { exponent: Some('D'), ..NumberSyntax::default() };
/// assert_eq!(parse_f64("1.5D3", &fortran), Some(1500.0));
/// assert_eq!(parse_f64("1.5e3", &fortran), Some(1500.0));
///
/// let comma = NumberSyntax { decimal: ',', ..NumberSyntax::default() };
/// assert_eq!(parse_f64("2,75", &comma), Some(2.75));
/// ```
#[must_use]
pub fn parse_f64(token: &str, syntax: &NumberSyntax) -> Option<f64> {
    parse_real(token, syntax)
}

/// Parses a single-precision float, rounding once from the decimal text.
#[must_use]
pub fn parse_f32(token: &str, syntax: &NumberSyntax) -> Option<f32> {
    parse_real(token, syntax)
}

fn parse_real<F: FromStr>(token: &str, syntax: &NumberSyntax) -> Option<F> {
    syntax.canonical(token).parse().ok()
}

/// Parses a complex literal: `a`, `bj`, `a+bj`, `a-bj`, `a+-bj`, optionally in parentheses.
///
/// # Examples
///
/// ```rust
/// use num_complex::Complex64;
/// use readtext::literal::{parse_complex, NumberSyntax};
///
/// let syntax = NumberSyntax::default();
/// assert_eq!(parse_complex::<f64>("(1.0-2.5j)", &syntax), Some(Complex64::new(1.0, -2.5)));
/// assert_eq!(parse_complex::<f64>("7+-5.0j", &syntax), Some(Complex64::new(7.0, -5.0)));
/// assert_eq!(parse_complex::<f64>("-19e2j", &syntax), Some(Complex64::new(0.0, -1900.0)));
/// assert_eq!(parse_complex::<f64>("3.75", &syntax), Some(Complex64::new(3.75, 0.0)));
/// ```
#[must_use]
pub fn parse_complex<F>(token: &str, syntax: &NumberSyntax) -> Option<Complex<F>>
where
    F: FromStr + Neg<Output = F> + From<u8>,
{
    let canonical = syntax.canonical(token);
    let mut text: &str = &canonical;
    if syntax.allow_parens {
        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            text = inner.trim();
        }
    }
    if text.is_empty() {
        return None;
    }
    let unit = syntax.imaginary_unit;
    let body = match text.strip_suffix(|c: char| c.eq_ignore_ascii_case(&unit)) {
        Some(body) => body,
        None => return Some(Complex::new(text.parse().ok()?, F::from(0u8))),
    };
    let (re, im) = match split_complex(body) {
        Some(at) => (body[..at].parse().ok()?, &body[at..]),
        None => (F::from(0u8), body),
    };
    Some(Complex::new(re, imaginary_part(im)?))
}

/// Byte offset of the sign that starts the imaginary part, if the literal has a real part.
fn split_complex(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    (1..bytes.len()).find(|&i| {
        matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E' | b'+' | b'-')
    })
}

fn imaginary_part<F>(text: &str) -> Option<F>
where
    F: FromStr + Neg<Output = F> + From<u8>,
{
    // "+-5" spells a negative imaginary part
    let text = match text.strip_prefix('+') {
        Some(rest) if rest.starts_with(&['+', '-'][..]) => rest,
        _ => text,
    };
    match text {
        "" | "+" => Some(F::from(1u8)),
        "-" => Some(-F::from(1u8)),
        _ => text.parse().ok(),
    }
}

/// Copies `token` into a fixed-width byte slot, truncating on a character
/// boundary and padding with NUL bytes.
pub(crate) fn push_fixed_bytes(data: &mut Vec<u8>, width: usize, token: &str) {
    let mut end = token.len().min(width);
    while !token.is_char_boundary(end) {
        end -= 1;
    }
    data.extend_from_slice(&token.as_bytes()[..end]);
    data.resize(data.len() + (width - end), 0);
}

/// Copies `token` into a fixed-width character slot, padding with `'\0'`.
pub(crate) fn push_fixed_chars(data: &mut Vec<char>, width: usize, token: &str) {
    let start = data.len();
    data.extend(token.chars().take(width));
    data.resize(start + width, '\0');
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::{Complex32, Complex64};

    fn syntax() -> NumberSyntax {
        NumberSyntax::default()
    }

    #[test]
    fn test_float_round_trip_exact() {
        for s in [
            "0.9999999999999999",
            "9876543210.123456",
            "5.43215432154321e+300",
            "0.901",
            "0.333",
            "2.2250738585072014e-308",
            "4.9e-324",
        ] {
            let expected: f64 = s.parse().unwrap();
            let got = parse_f64(s, &syntax()).unwrap();
            assert_eq!(got.to_bits(), expected.to_bits(), "{}", s);
        }
    }

    #[test]
    fn test_float_rejects_garbage() {
        assert_eq!(parse_f64("XXX", &syntax()), None);
        assert_eq!(parse_f64("", &syntax()), None);
        assert_eq!(parse_f64("1.5.2", &syntax()), None);
        assert_eq!(parse_f64("1e", &syntax()), None);
        assert!(parse_f64("nan", &syntax()).unwrap().is_nan());
        assert_eq!(parse_f64("-inf", &syntax()), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_f32_rounds_once() {
        let s = "0.1000000014901161193847656";
        assert_eq!(parse_f32(s, &syntax()), Some(s.parse::<f32>().unwrap()));
    }

    #[test]
    fn test_alternate_exponent_is_case_insensitive() {
        let fortran = NumberSyntax {
            exponent: Some('D'),
            ..syntax()
        };
        assert_eq!(parse_f64("-2.5d-2", &fortran), Some(-0.025));
        assert_eq!(parse_f64("2.5D+2", &fortran), Some(250.0));
        assert_eq!(parse_f64("2.5D+2", &syntax()), None);
    }

    #[test]
    fn test_integer_widths() {
        let s = syntax();
        assert_eq!(parse_integer::<u8>("255", &s, false), Some(255));
        assert_eq!(parse_integer::<u8>("-1", &s, true), None);
        assert_eq!(parse_integer::<i16>("+42", &s, false), Some(42));
        assert_eq!(
            parse_integer::<u64>("18446744073709551615", &s, false),
            Some(u64::MAX)
        );
        assert_eq!(parse_integer::<i64>("18446744073709551615", &s, false), None);
    }

    #[test]
    fn test_float_fallback_truncates() {
        let s = syntax();
        assert_eq!(parse_integer::<i32>("2.1", &s, true), Some(2));
        assert_eq!(parse_integer::<i32>("-3.9", &s, true), Some(-3));
        assert_eq!(parse_integer::<i8>("1e2", &s, true), Some(100));
        assert_eq!(parse_integer::<i8>("1e3", &s, true), None);
        assert_eq!(parse_integer::<u16>("nan", &s, true), None);
        assert_eq!(float_to_integer::<u64>(1.8e19), Some(18_000_000_000_000_000_000));
    }

    #[test]
    fn test_bool_or_int() {
        assert_eq!(parse_bool_or_int("0"), Some(false));
        assert_eq!(parse_bool_or_int("-2"), Some(true));
        assert_eq!(parse_bool_or_int("yes"), None);
    }

    #[test]
    fn test_complex_forms() {
        let s = syntax();
        let c = |t: &str| parse_complex::<f64>(t, &s);
        assert_eq!(c("(4)"), Some(Complex64::new(4.0, 0.0)));
        assert_eq!(c("(0)"), Some(Complex64::new(0.0, 0.0)));
        assert_eq!(c("1e-5+2e1j"), Some(Complex64::new(1e-5, 20.0)));
        assert_eq!(c("j"), Some(Complex64::new(0.0, 1.0)));
        assert_eq!(c("2-j"), Some(Complex64::new(2.0, -1.0)));
        assert_eq!(c("1+2"), None);
        assert_eq!(c("()"), None);
        assert_eq!(c("abc"), None);
    }

    #[test]
    fn test_complex_unit_and_parens_options() {
        let i_unit = NumberSyntax {
            imaginary_unit: 'i',
            allow_parens: false,
            ..syntax()
        };
        assert_eq!(
            parse_complex::<f32>("1.0-2.5i", &i_unit),
            Some(Complex32::new(1.0, -2.5))
        );
        assert_eq!(parse_complex::<f32>("(1.0-2.5i)", &i_unit), None);
        assert_eq!(parse_complex::<f32>("1.0-2.5j", &i_unit), None);
    }

    #[test]
    fn test_complex_with_decimal_comma() {
        let s = NumberSyntax {
            decimal: ',',
            ..syntax()
        };
        assert_eq!(
            parse_complex::<f64>("1,5+0,25j", &s),
            Some(Complex64::new(1.5, 0.25))
        );
    }

    #[test]
    fn test_fixed_width_strings() {
        let mut bytes = Vec::new();
        push_fixed_bytes(&mut bytes, 4, "ab");
        push_fixed_bytes(&mut bytes, 4, "abcdef");
        push_fixed_bytes(&mut bytes, 4, "aαβ");
        assert_eq!(&bytes[..4], b"ab\0\0");
        assert_eq!(&bytes[4..8], b"abcd");
        assert_eq!(&bytes[8..12], "aα\0".as_bytes());

        let mut chars = Vec::new();
        push_fixed_chars(&mut chars, 2, "αβγ");
        push_fixed_chars(&mut chars, 2, "x");
        assert_eq!(chars, vec!['α', 'β', 'x', '\0']);
    }
}
