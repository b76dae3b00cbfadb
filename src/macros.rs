// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: works for literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Price map shorthand for fixtures and tests:
/// `prices!{ G92 => "7.50", Diesel0 => "7.12" }`.
/// Panics on a malformed decimal literal.
#[macro_export]
macro_rules! prices {
    () => {
        ::std::collections::BTreeMap::<$crate::model::Grade, $crate::Decimal>::new()
    };
    ($($grade:ident => $value:expr),+ $(,)?) => {{
        let mut m = ::std::collections::BTreeMap::<$crate::model::Grade, $crate::Decimal>::new();
        $(
            m.insert(
                $crate::model::Grade::$grade,
                <$crate::Decimal as ::std::str::FromStr>::from_str($value)
                    .expect("valid decimal literal"),
            );
        )+
        m
    }};
}
