//! Reading numeric tables with inferred types.
//!
//! Run with: cargo run --example simple

use readtext::{read_str, ReadOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = "\
# station  temp  rain
1  21.5  0.0
2  19.0  3.2
3  23.25 1.1
";

    // Types are inferred per column; equal types give a 2-D array
    let table = read_str(text, &ReadOptions::new().with_usecols([1, 2]))?
        .into_array()
        .ok_or("expected a single array")?;
    println!("dtype: {}, shape: {:?}", table.dtype(), table.shape());

    // Mixed types give a structured array with fields f0, f1, ...
    let records = read_str(text, &ReadOptions::new())?
        .into_array()
        .ok_or("expected a single array")?;
    println!("dtype: {}", records.dtype());
    for i in 0..records.shape()[0] {
        println!("  record {}: {:?}", i, records.record(&[i]));
    }

    // Unpacked columns, one array each
    let columns = read_str(text, &ReadOptions::new().with_usecols([1]).with_unpack(true))?
        .into_columns()
        .ok_or("expected columns")?;
    println!("temperatures: {:?}", columns[0].as_slice::<f64>());

    Ok(())
}
