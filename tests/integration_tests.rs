use num_complex::Complex64;
use readtext::{
    read, read_lines, read_str, Converter, DType, Error, Field, ReadOptions, Scalar,
    ScalarType, Source, StringKind,
};

fn array(text: &str, options: &ReadOptions) -> readtext::NdArray {
    read_str(text, options).unwrap().into_array().unwrap()
}

#[test]
fn test_whitespace_table() {
    let a = array("1.5 2.5 3.5\n4.5 5.5 6.5\n", &ReadOptions::new());
    assert_eq!(a.shape(), &[2, 3]);
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::Float64));
    assert_eq!(a.get(&[1, 0]), Some(Scalar::Float(4.5)));
}

#[test]
fn test_floats_are_bit_exact() {
    let literals = [
        "0.1",
        "0.9999999999999999",
        "1e-300",
        "2.2250738585072014e-308",
        "4.9e-324",
        "1.7976931348623157e308",
    ];
    let a = array(&literals.join("\n"), &ReadOptions::new());
    let expected: Vec<u64> = literals
        .iter()
        .map(|s| s.parse::<f64>().unwrap().to_bits())
        .collect();
    let got: Vec<u64> = a.as_slice::<f64>().unwrap().iter().map(|f| f.to_bits()).collect();
    assert_eq!(got, expected);
}

#[test]
fn test_special_floats() {
    let a = array("inf -inf nan 1.0\n", &ReadOptions::new());
    let values = a.as_slice::<f64>().unwrap();
    assert_eq!(values[0], f64::INFINITY);
    assert_eq!(values[1], f64::NEG_INFINITY);
    assert!(values[2].is_nan());
}

#[test]
fn test_structured_subarray_fields() {
    let dtype = DType::structured([
        Field::with_shape("a", ScalarType::UInt8, vec![2]),
        Field::with_shape("b", ScalarType::UInt8, vec![2]),
    ])
    .unwrap();
    let a = array("0 1 2 3\n4 5 6 7\n", &ReadOptions::new().with_dtype(dtype));
    assert_eq!(a.shape(), &[2]);
    let field = a.field("a").unwrap();
    assert_eq!(field.shape(), &[2, 2]);
    assert_eq!(field.as_slice::<u8>(), Some(&[0, 1, 4, 5][..]));
    assert_eq!(
        a.record(&[1]),
        Some(vec![
            Scalar::UInt(4),
            Scalar::UInt(5),
            Scalar::UInt(6),
            Scalar::UInt(7)
        ])
    );
}

#[test]
fn test_two_dimensional_subarray_field() {
    let dtype = DType::structured([
        Field::with_shape("m", ScalarType::Int16, vec![2, 2]),
        Field::new("w", ScalarType::Float32),
    ])
    .unwrap();
    let a = array("1 2 3 4 0.5\n", &ReadOptions::new().with_dtype(dtype).with_ndmin(1));
    assert_eq!(a.shape(), &[1]);
    assert_eq!(a.field("m").unwrap().shape(), &[1, 2, 2]);
    assert_eq!(a.field("w").unwrap().as_slice::<f32>(), Some(&[0.5][..]));
}

#[test]
fn test_bad_value_and_converter_rescue() {
    let options = ReadOptions::new()
        .with_delimiter(",")
        .with_dtype(ScalarType::Float64);
    let err = read_str("1.5,2.5\n3.0,XXX\n", &options).unwrap_err();
    assert!(matches!(err, Error::Value { line: 2, column: 1, .. }));
    assert_eq!(
        err.to_string(),
        "bad float64 value at line 2, column 1: \"XXX\""
    );

    let rescued = options.with_converter(
        1,
        Converter::from_fn(|s| s.parse::<f64>().unwrap_or(f64::NAN)),
    );
    let a = array("1.5,2.5\n3.0,XXX\n", &rescued);
    let values = a.as_slice::<f64>().unwrap();
    assert_eq!(&values[..3], &[1.5, 2.5, 3.0]);
    assert!(values[3].is_nan());
}

#[test]
fn test_converter_error_keeps_source() {
    let options = ReadOptions::new().with_converter(0, Converter::new(|s| s.parse::<i64>()));
    let err = read_str("1\n2\nx\n", &options).unwrap_err();
    assert!(matches!(err, Error::Converter { line: 3, column: 0, .. }));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "x".parse::<i64>().unwrap_err().to_string());
}

#[test]
fn test_ndmin_shapes() {
    let shape = |text: &str, ndmin: i64| {
        array(text, &ReadOptions::new().with_ndmin(ndmin))
            .shape()
            .to_vec()
    };
    assert_eq!(shape("1 2 3\n", 0), vec![3]);
    assert_eq!(shape("1 2 3\n", 2), vec![1, 3]);
    assert_eq!(shape("1\n2\n3\n", 1), vec![3]);
    assert_eq!(shape("1\n2\n3\n", 2), vec![3, 1]);
    assert_eq!(shape("5\n", 0), Vec::<usize>::new());
    assert_eq!(shape("5\n", 1), vec![1]);
    assert!(read_str("1\n", &ReadOptions::new().with_ndmin(3))
        .unwrap_err()
        .is_config());
}

#[test]
fn test_quoted_field_with_delimiter() {
    let options = ReadOptions::new().with_delimiter(",").with_quote('"');
    let a = array("\"alpha, x\",3\n", &options);
    assert!(a.is_structured());
    assert_eq!(
        a.record(&[0]),
        Some(vec![Scalar::from("alpha, x"), Scalar::UInt(3)])
    );
    assert_eq!(a.dtype().fields()[0].dtype(), ScalarType::Bytes(Some(8)));
}

#[test]
fn test_invalid_counts_fail_before_reading() {
    let untouched = || {
        Source::from_lines(std::iter::from_fn(|| -> Option<String> {
            panic!("input consumed")
        }))
    };
    let err = read(untouched(), &ReadOptions::new().with_skiprows(-3)).unwrap_err();
    assert!(err.is_config());
    let err = read(untouched(), &ReadOptions::new().with_max_rows(-1)).unwrap_err();
    assert!(err.is_config());

    let mut de = serde_json::Deserializer::from_str(r#"{"max_rows": 2.5}"#);
    assert!(ReadOptions::from_deserializer(&mut de).unwrap_err().is_config());
}

#[test]
fn test_blank_and_comment_lines_are_dropped() {
    let a = array("# header\n1\n\n   \n2 # two\n# tail\n", &ReadOptions::new());
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::UInt8));
    assert_eq!(a.as_slice::<u8>(), Some(&[1, 2][..]));
}

#[test]
fn test_complex_literals() {
    let a = array("1+2j 3\n(4-1.5j) 2j\n", &ReadOptions::new());
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::Complex128));
    assert_eq!(
        a.as_slice::<Complex64>(),
        Some(
            &[
                Complex64::new(1.0, 2.0),
                Complex64::new(3.0, 0.0),
                Complex64::new(4.0, -1.5),
                Complex64::new(0.0, 2.0),
            ][..]
        )
    );
}

#[test]
fn test_imaginary_unit_i() {
    let options = ReadOptions::new()
        .with_imaginary_unit('i')
        .with_dtype(ScalarType::Complex64);
    let a = array("1+1i 2-3I\n", &options);
    let values = a.as_slice::<num_complex::Complex32>().unwrap();
    assert_eq!(values[1].im, -3.0);
}

#[test]
fn test_generator_source() {
    let rows = (0..5).map(|i| format!("{},{}", i, i * 10));
    let options = ReadOptions::new().with_delimiter(",").with_max_rows(3);
    let a = read_lines(rows, &options).unwrap().into_array().unwrap();
    assert_eq!(a.shape(), &[3, 2]);
    assert_eq!(a.as_slice::<u8>(), Some(&[0, 0, 1, 10, 2, 20][..]));
}

#[test]
fn test_unpack_structured_gives_fields() {
    let options = ReadOptions::new()
        .with_dtype("u1,f8,S3".parse::<DType>().unwrap())
        .with_unpack(true);
    let columns = read_str("1 0.5 abc\n2 1.5 de\n", &options)
        .unwrap()
        .into_columns()
        .unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1].as_slice::<f64>(), Some(&[0.5, 1.5][..]));
    assert_eq!(columns[2].strings().unwrap(), vec!["abc", "de"]);
}

#[test]
fn test_unicode_converter() {
    let options = ReadOptions::new()
        .with_string_kind(StringKind::Unicode)
        .with_converter(0, Converter::from_fn(|s| s.to_uppercase()));
    let a = array("αβ 1\nγ 2\n", &options);
    assert_eq!(a.dtype().fields()[0].dtype(), ScalarType::Unicode(Some(2)));
    assert_eq!(a.field("f0").unwrap().strings().unwrap(), vec!["ΑΒ", "Γ"]);
    assert_eq!(a.field("f1").unwrap().as_slice::<u8>(), Some(&[1, 2][..]));
}

#[test]
fn test_unsized_string_dtypes() {
    let a = array("abc\nde\n", &ReadOptions::new().with_dtype(ScalarType::Unicode(None)));
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::Unicode(Some(3))));
    assert_eq!(a.strings().unwrap(), vec!["abc", "de"]);

    let a = array("x 12345\n", &ReadOptions::new().with_dtype("S0".parse::<DType>().unwrap()));
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::Bytes(Some(5))));
}

#[test]
fn test_fixed_width_strings_truncate() {
    let a = array("abcdef\n", &ReadOptions::new().with_dtype(ScalarType::Bytes(Some(3))));
    assert_eq!(a.strings().unwrap(), vec!["abc"]);
}

#[test]
fn test_float_tokens_truncate_for_every_integer_type() {
    for code in ["i1", "i2", "i4", "i8", "u1", "u2", "u4", "u8"] {
        let options = ReadOptions::new().with_dtype(code.parse::<DType>().unwrap());
        let a = array("1.9\n2.0\n7.99\n", &options);
        let values: Vec<i64> = a
            .to_scalars()
            .unwrap()
            .iter()
            .map(|s| s.as_i64().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 7], "dtype {}", code);
    }
    let signed = array("-3.7\n", &ReadOptions::new().with_dtype(ScalarType::Int32));
    assert_eq!(signed.as_slice::<i32>(), Some(&[-3][..]));

    let err = read_str("300.5\n", &ReadOptions::new().with_dtype(ScalarType::UInt8)).unwrap_err();
    assert!(matches!(err, Error::Value { line: 1, column: 0, .. }));
}

#[test]
fn test_bool_dtype_accepts_integers() {
    let a = array("True 0\nfalse 5\n", &ReadOptions::new().with_dtype(ScalarType::Bool));
    assert_eq!(a.as_slice::<bool>(), Some(&[true, false, false, true][..]));
}

#[test]
fn test_multi_character_comments() {
    let options = ReadOptions::new().with_comments(["//", "--"]);
    let a = array("1 2 // one\n-- skipped\n3 4\n", &options);
    assert_eq!(a.as_slice::<u8>(), Some(&[1, 2, 3, 4][..]));
}

#[test]
fn test_decimal_comma() {
    let a = array("1,5 -2,25\n", &ReadOptions::new().with_decimal(','));
    assert_eq!(a.as_slice::<f64>(), Some(&[1.5, -2.25][..]));
}

#[test]
fn test_converter_index_counts_output_columns() {
    let options = ReadOptions::new()
        .with_usecols([0, 2])
        .with_converter(-1, Converter::new(|s| s.parse::<f64>().map(|v| v * 10.0)));
    let a = array("1 2 3\n4 5 6\n", &options);
    assert_eq!(a.field("f0").unwrap().as_slice::<u8>(), Some(&[1, 4][..]));
    assert_eq!(a.field("f1").unwrap().as_slice::<f64>(), Some(&[30.0, 60.0][..]));
}

#[test]
fn test_converter_with_structured_dtype() {
    let options = ReadOptions::new()
        .with_dtype("u1,f8".parse::<DType>().unwrap())
        .with_converter(0, Converter::from_fn(|s| s.len() as u64));
    let a = array("aaa 1.5\nb 2.5\n", &options);
    assert_eq!(a.field("f0").unwrap().as_slice::<u8>(), Some(&[3, 1][..]));
}

#[test]
fn test_error_lines_count_skipped_and_blank_lines() {
    let options = ReadOptions::new().with_skiprows(1);
    let err = read_str("header\n1 2\n\n# note\n3\n", &options).unwrap_err();
    assert!(matches!(
        err,
        Error::Structure {
            line: 5,
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn test_zero_rows() {
    let a = array("# only a comment\n", &ReadOptions::new());
    assert_eq!(a.shape(), &[0]);
    assert_eq!(a.dtype(), &DType::Scalar(ScalarType::Float64));
    assert!(a.is_empty());
}

#[test]
fn test_reads_emit_debug_events() {
    use tracing_subscriber::EnvFilter;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("readtext=trace"))
        .with_test_writer()
        .finish();
    let a = tracing::subscriber::with_default(subscriber, || {
        array("skip\n1 2\n\n3 4\n", &ReadOptions::new().with_skiprows(1))
    });
    assert_eq!(a.shape(), &[2, 2]);
}
