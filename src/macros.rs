//! Declarative macros.

/// Build a [`Fields`](crate::Fields) map from `key => value` pairs.
///
/// Keys are anything `String: From<_>`; values go through
/// [`IntoValue`](crate::IntoValue).
///
/// ```
/// use wrapped_errors::{fields, Value};
///
/// let fields = fields! { "key" => "value", "key2" => 12 };
/// assert_eq!(fields["key"], "value");
/// assert_eq!(fields["key2"], Value::Int(12));
/// assert!(fields! {}.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $val:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::IntoValue::into_value($val),
            );
        )+
        fields
    }};
}
