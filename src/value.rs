//! Typed field values attached to a wrap.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Diagnostic fields of one node, keyed by name.
///
/// A `BTreeMap` keeps keys sorted, which is the order they render in.
pub type Fields = BTreeMap<String, Value>;

/// Shared empty map handed out when a lookup matches outside any node.
pub(crate) static EMPTY_FIELDS: Fields = BTreeMap::new();

/// A typed value stored in [`Fields`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String value
    String(String),
    /// Signed integer (i8, i16, i32, i64, isize)
    Int(i64),
    /// Unsigned integer (u8, u16, u32, u64, usize)
    Uint(u64),
    /// Floating point (f32, f64)
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Absent value
    Null,
}

impl Value {
    /// Create a Value from any supported type.
    pub fn from<T: IntoValue>(v: T) -> Self {
        v.into_value()
    }

    /// The string payload, if this is a `Value::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Uint(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
        }
    }
}

// Comparisons against plain Rust values, mostly for assertions.
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(n) if n == other)
    }
}

impl PartialEq<u64> for Value {
    fn eq(&self, other: &u64) -> bool {
        matches!(self, Value::Uint(n) if n == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(b) if b == other)
    }
}

/// Conversion into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl<'a> IntoValue for Cow<'a, str> {
    fn into_value(self) -> Value {
        Value::String(self.into_owned())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! impl_into_value {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::$variant(self as $wide)
                }
            }
        )*
    };
}

impl_into_value!(Int as i64: i8, i16, i32, i64, isize);
impl_into_value!(Uint as u64: u8, u16, u32, u64, usize);
impl_into_value!(Float as f64: f32, f64);

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue + Clone> IntoValue for &T {
    fn into_value(self) -> Value {
        self.clone().into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_plain_formatting() {
        assert_eq!(Value::from("test-string").to_string(), "test-string");
        assert_eq!(Value::from(123).to_string(), "123");
        assert_eq!(Value::from(7u8).to_string(), "7");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from(None::<i32>).to_string(), "null");
    }

    #[test]
    fn test_integer_widths_collapse() {
        assert_eq!(Value::from(12i8), Value::Int(12));
        assert_eq!(Value::from(12usize), Value::Uint(12));
        assert_eq!(Value::from(&String::from("k")), "k");
    }
}
