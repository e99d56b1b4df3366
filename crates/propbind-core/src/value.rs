//! Converted values handed to member writers.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::error::WriteError;

/// A value produced by the type converter.
///
/// Writers turn it into the member's concrete type with `try_into()` or one
/// of the `into_*` helpers.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Text(String),
    Chars(Vec<char>),
    /// Name of the matched enum candidate, spelled as declared.
    Enum(String),
    List(Vec<BoundValue>),
    Map(BTreeMap<String, BoundValue>),
}

impl BoundValue {
    pub fn kind(&self) -> &'static str {
        match self {
            BoundValue::Bool(_) => "bool",
            BoundValue::Int(_) => "integer",
            BoundValue::UInt(_) => "unsigned integer",
            BoundValue::Float(_) => "float",
            BoundValue::Char(_) => "char",
            BoundValue::Text(_) => "text",
            BoundValue::Chars(_) => "char array",
            BoundValue::Enum(_) => "enum",
            BoundValue::List(_) => "list",
            BoundValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BoundValue::Text(s) | BoundValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BoundValue::Int(v) => Some(*v as f64),
            BoundValue::UInt(v) => Some(*v as f64),
            BoundValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Empty text, char array, list or map.
    pub fn is_empty(&self) -> bool {
        match self {
            BoundValue::Text(s) => s.is_empty(),
            BoundValue::Chars(c) => c.is_empty(),
            BoundValue::List(items) => items.is_empty(),
            BoundValue::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Parse an enum candidate (or text) with the enum's `FromStr`.
    pub fn into_enum<E: FromStr>(self) -> Result<E, WriteError> {
        match self {
            BoundValue::Enum(name) | BoundValue::Text(name) => {
                name.parse().map_err(|_| WriteError::rejected(format!("unknown constant {name}")))
            }
            other => Err(mismatch("enum", &other)),
        }
    }

    pub fn into_enum_list<E: FromStr>(self) -> Result<Vec<E>, WriteError> {
        match self {
            BoundValue::List(items) => items.into_iter().map(BoundValue::into_enum).collect(),
            other => Ok(vec![other.into_enum()?]),
        }
    }
}

fn mismatch(expected: &'static str, actual: &BoundValue) -> WriteError {
    WriteError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        BoundValue::Text(value.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(value: String) -> Self {
        BoundValue::Text(value)
    }
}

impl TryFrom<BoundValue> for String {
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Text(s) | BoundValue::Enum(s) => Ok(s),
            BoundValue::Chars(chars) => Ok(chars.into_iter().collect()),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl TryFrom<BoundValue> for bool {
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl TryFrom<BoundValue> for char {
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Char(c) => Ok(c),
            other => Err(mismatch("char", &other)),
        }
    }
}

macro_rules! integer_try_from {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<BoundValue> for $ty {
                type Error = WriteError;

                fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
                    let out_of_range = |v: String| WriteError::OutOfRange {
                        target: stringify!($ty),
                        value: v,
                    };
                    match value {
                        BoundValue::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range(v.to_string())),
                        BoundValue::UInt(v) => <$ty>::try_from(v).map_err(|_| out_of_range(v.to_string())),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

integer_try_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl TryFrom<BoundValue> for f64 {
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        value.as_f64().ok_or_else(|| mismatch("f64", &value))
    }
}

impl TryFrom<BoundValue> for f32 {
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| mismatch("f32", &value))
    }
}

impl<T> TryFrom<BoundValue> for Vec<T>
where
    T: TryFrom<BoundValue, Error = WriteError>,
{
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::List(items) => items.into_iter().map(T::try_from).collect(),
            BoundValue::Chars(chars) => chars
                .into_iter()
                .map(|c| T::try_from(BoundValue::Char(c)))
                .collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T> TryFrom<BoundValue> for BTreeMap<String, T>
where
    T: TryFrom<BoundValue, Error = WriteError>,
{
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, T::try_from(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl<T> TryFrom<BoundValue> for HashMap<String, T>
where
    T: TryFrom<BoundValue, Error = WriteError>,
{
    type Error = WriteError;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, T::try_from(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}
