//! Per-column converters and error reporting.
//!
//! Run with: cargo run --example converters

use readtext::{converters, read_str, Error, ReadOptions, ScalarType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let text = "\
2024-01-01,12.5%,ok
2024-01-02,n/a,ok
2024-01-03,7%,FAIL
";

    let options = ReadOptions::new()
        .with_delimiter(",")
        .with_converters(converters! {
            0 => |s: &str| s.replace('-', "").parse::<u32>().unwrap_or(0),
            1 => |s: &str| s.trim_end_matches('%').parse::<f64>().map_or(f64::NAN, |v| v / 100.0),
            -1 => |s: &str| s.eq_ignore_ascii_case("ok"),
        });
    let array = read_str(text, &options)?
        .into_array()
        .ok_or("expected a single array")?;
    println!("dtype: {}", array.dtype());
    for i in 0..array.shape()[0] {
        println!("  {:?}", array.record(&[i]));
    }

    // Without the converter the percentage column cannot be parsed as float64
    let strict = ReadOptions::new()
        .with_delimiter(",")
        .with_usecols([1])
        .with_dtype(ScalarType::Float64);
    match read_str(text, &strict) {
        Err(Error::Value {
            line, column, token, ..
        }) => println!("line {}, column {}: cannot parse {:?}", line, column, token),
        Err(other) => return Err(other.into()),
        Ok(_) => println!("unexpectedly parsed"),
    }

    // A failing converter keeps its own error as the source
    let fallible = ReadOptions::new()
        .with_delimiter(",")
        .with_usecols([1])
        .with_converters(converters! { 0 => fallible |s: &str| s.trim_end_matches('%').parse::<f64>() });
    if let Err(err) = read_str(text, &fallible) {
        println!("{}", err);
        if let Some(source) = std::error::Error::source(&err) {
            println!("  caused by: {}", source);
        }
    }

    Ok(())
}
