//! Structured dtypes, sub-array fields and unpacking.
//!
//! Run with: cargo run --example structured

use readtext::{read_str, DType, Field, ReadOptions, ScalarType, StringKind};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = "\
name,x,y,z,weight
\"alpha, inc\",1.0,2.0,3.0,0.5
beta,4.0,5.0,6.0,1.5
";

    let dtype = DType::structured([
        Field::new("name", ScalarType::Unicode(None)),
        Field::with_shape("position", ScalarType::Float32, vec![3]),
        Field::new("weight", ScalarType::Float64),
    ])?;
    println!("dtype: {}", dtype);

    let options = ReadOptions::new()
        .with_delimiter(",")
        .with_quote('"')
        .with_skiprows(1)
        .with_dtype(dtype);
    let particles = read_str(text, &options)?
        .into_array()
        .ok_or("expected a single array")?;

    // The unsized unicode field takes its width from the data
    println!("resolved: {}", particles.dtype());
    if let Some(names) = particles.field("name") {
        println!("names: {:?}", names.strings());
    }
    if let Some(position) = particles.field("position") {
        println!("position {:?}: {:?}", position.shape(), position.as_slice::<f32>());
    }

    // The same table from a type-code string, unpacked field by field
    let options = ReadOptions::new()
        .with_delimiter(",")
        .with_quote('"')
        .with_skiprows(1)
        .with_string_kind(StringKind::Unicode)
        .with_dtype("U,f4,f4,f4,f8".parse::<DType>()?)
        .with_unpack(true);
    let columns = read_str(text, &options)?
        .into_columns()
        .ok_or("expected columns")?;
    for column in &columns {
        println!("{} {:?}", column.dtype(), column.to_scalars());
    }

    Ok(())
}
