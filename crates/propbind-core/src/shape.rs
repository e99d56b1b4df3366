//! Declared shapes of bindable members.

use std::fmt;

/// Scalar kinds with a native parse rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::String => "String",
        }
    }
}

/// The target shape a raw value is converted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Scalar(ScalarKind),
    /// The raw string as a sequence of characters.
    CharArray,
    /// One of the candidate constant names.
    Enum(Vec<String>),
    /// Ordered list; a single value is split on `,`.
    List(Box<TypeShape>),
    /// Like [`TypeShape::List`] but keeps only the first occurrence of each element.
    Set(Box<TypeShape>),
    /// String-keyed mapping whose keys come from the names under the member.
    Map(Box<TypeShape>),
    /// Mapping of mappings.
    NestedMap(Box<TypeShape>),
    /// An object bound recursively under `prefix.member`.
    Nested,
    /// Converted by the named converter of the binder's conversion service.
    Custom(String),
}

impl TypeShape {
    pub fn string() -> Self {
        TypeShape::Scalar(ScalarKind::String)
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        TypeShape::Scalar(kind)
    }

    pub fn enumeration<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeShape::Enum(candidates.into_iter().map(Into::into).collect())
    }

    pub fn list(element: TypeShape) -> Self {
        TypeShape::List(Box::new(element))
    }

    pub fn set(element: TypeShape) -> Self {
        TypeShape::Set(Box::new(element))
    }

    pub fn map(value: TypeShape) -> Self {
        TypeShape::Map(Box::new(value))
    }

    pub fn nested_map(value: TypeShape) -> Self {
        TypeShape::NestedMap(Box::new(value))
    }

    pub fn custom(name: impl Into<String>) -> Self {
        TypeShape::Custom(name.into())
    }

    /// Whether values for this shape are read from several keys under the
    /// member rather than from a single key.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            TypeShape::Map(_) | TypeShape::NestedMap(_) | TypeShape::Nested
        )
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Scalar(kind) => f.write_str(kind.type_name()),
            TypeShape::CharArray => f.write_str("[char]"),
            TypeShape::Enum(candidates) => write!(f, "enum {{{}}}", candidates.join(", ")),
            TypeShape::List(element) => write!(f, "list<{element}>"),
            TypeShape::Set(element) => write!(f, "set<{element}>"),
            TypeShape::Map(value) => write!(f, "map<String, {value}>"),
            TypeShape::NestedMap(value) => write!(f, "map<String, map<String, {value}>>"),
            TypeShape::Nested => f.write_str("nested object"),
            TypeShape::Custom(name) => f.write_str(name),
        }
    }
}
