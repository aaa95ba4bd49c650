/// Builds a [`Converters`](crate::Converters) map from `column => closure` pairs.
///
/// Closures returning a plain value are wrapped with
/// [`Converter::from_fn`](crate::Converter::from_fn); prefix a closure with `fallible`
/// when it returns a `Result`, to wrap it with [`Converter::new`](crate::Converter::new).
///
/// # Examples
///
/// ```rust
/// use readtext::{converters, Scalar};
///
/// let converters = converters! {
///     0 => |s: &str| s.trim().to_lowercase(),
///     -1 => fallible |s: &str| s.parse::<f64>(),
/// };
///
/// assert_eq!(converters.len(), 2);
/// assert_eq!(converters.get(0).unwrap().call(" AB ").unwrap(), Scalar::from("ab"));
/// assert!(converters.get(-1).unwrap().call("x").is_err());
/// ```
#[macro_export]
macro_rules! converters {
    // Handle empty map
    () => {
        $crate::Converters::new()
    };

    // Trailing comma
    (@insert $map:ident;) => {};

    // Handle fallible entry
    (@insert $map:ident; $key:expr => fallible $f:expr $(, $($rest:tt)*)?) => {
        $map.insert($key, $crate::Converter::new($f));
        $( $crate::converters!(@insert $map; $($rest)*); )?
    };

    // Handle infallible entry
    (@insert $map:ident; $key:expr => $f:expr $(, $($rest:tt)*)?) => {
        $map.insert($key, $crate::Converter::from_fn($f));
        $( $crate::converters!(@insert $map; $($rest)*); )?
    };

    ($($body:tt)+) => {{
        let mut map = $crate::Converters::new();
        $crate::converters!(@insert map; $($body)+);
        map
    }};
}
