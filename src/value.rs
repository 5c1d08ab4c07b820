//! Literal values and the fixed set of value types.
//!
//! The resolver treats value types as literals rather than dependencies:
//! `bool`, `char`, the integer primitives, `f32`/`f64`, `String`, `url::Url`,
//! enums declared with [`value_enum!`](crate::value_enum), and `Option<V>` /
//! `Vec<V>` of these. Literals live in a [`ValueContainer`] attached to a
//! registration and are looked up by parameter or property name.

use std::collections::HashMap;
use std::fmt;

use url::Url;

use crate::types::{Resolvable, TypeRef};

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Uri(Url),
    /// Enum variant, by name.
    Enum(String),
    Array(Vec<Value>),
}

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts into `V`, if the shapes line up.
    pub fn to<V: ValueType>(&self) -> Option<V> {
        V::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Uri(v) => write!(f, "{}", v),
            Value::Enum(v) => write!(f, "{}", v),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Shape of a value type, used to pick default values.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Bool,
    Char,
    Int,
    UInt,
    Float,
    Str,
    Uri,
    Enum {
        type_name: &'static str,
        variants: &'static [&'static str],
    },
    /// `Option<V>`
    Nullable(Box<ValueKind>),
    /// `Vec<V>`
    Array(Box<ValueKind>),
}

impl ValueKind {
    /// The zero value handed out when auto-discovery supplies a missing literal.
    ///
    /// Numbers are zero, booleans false, strings and arrays empty, enums take
    /// their first variant. URIs and nullables default to `Null`.
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Char => Value::Char('\0'),
            ValueKind::Int => Value::Int(0),
            ValueKind::UInt => Value::UInt(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Str => Value::Str(String::new()),
            ValueKind::Uri => Value::Null,
            ValueKind::Enum { variants, .. } => variants
                .first()
                .map(|v| Value::Enum((*v).to_string()))
                .unwrap_or(Value::Null),
            ValueKind::Nullable(_) => Value::Null,
            ValueKind::Array(_) => Value::Array(Vec::new()),
        }
    }
}

/// Types the resolver treats as literals.
///
/// Implemented for the fixed value-type set; user enums opt in through
/// [`value_enum!`](crate::value_enum).
pub trait ValueType: Clone + Send + Sync + 'static {
    /// Shape of this type.
    fn value_kind() -> ValueKind;
    /// Reads `Self` out of a literal.
    fn from_value(value: &Value) -> Option<Self>;
    /// Writes `Self` into a literal.
    fn into_value(self) -> Value;
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl ValueType for $t {
            fn value_kind() -> ValueKind { ValueKind::Int }
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$t>::try_from(*v).ok(),
                    Value::UInt(v) => <$t>::try_from(*v).ok(),
                    _ => None,
                }
            }
            fn into_value(self) -> Value { Value::Int(self as i64) }
        }
        impl_value_resolvable!($t);
        impl From<$t> for Value {
            fn from(v: $t) -> Self { v.into_value() }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl ValueType for $t {
            fn value_kind() -> ValueKind { ValueKind::UInt }
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$t>::try_from(*v).ok(),
                    Value::UInt(v) => <$t>::try_from(*v).ok(),
                    _ => None,
                }
            }
            fn into_value(self) -> Value { Value::UInt(self as u64) }
        }
        impl_value_resolvable!($t);
        impl From<$t> for Value {
            fn from(v: $t) -> Self { v.into_value() }
        }
    )*};
}

macro_rules! impl_value_resolvable {
    ($t:ty) => {
        impl Resolvable for $t {
            fn type_ref() -> TypeRef {
                TypeRef::value::<Self>()
            }
        }
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl ValueType for f64 {
    fn value_kind() -> ValueKind {
        ValueKind::Float
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}
impl_value_resolvable!(f64);

impl ValueType for f32 {
    fn value_kind() -> ValueKind {
        ValueKind::Float
    }
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}
impl_value_resolvable!(f32);

impl ValueType for bool {
    fn value_kind() -> ValueKind {
        ValueKind::Bool
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}
impl_value_resolvable!(bool);

impl ValueType for char {
    fn value_kind() -> ValueKind {
        ValueKind::Char
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Char(self)
    }
}
impl_value_resolvable!(char);

impl ValueType for String {
    fn value_kind() -> ValueKind {
        ValueKind::Str
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            Value::Uri(v) => Some(v.to_string()),
            Value::Enum(v) => Some(v.clone()),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}
impl_value_resolvable!(String);

impl ValueType for Url {
    fn value_kind() -> ValueKind {
        ValueKind::Uri
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uri(v) => Some(v.clone()),
            Value::Str(v) => Url::parse(v).ok(),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Uri(self)
    }
}
impl_value_resolvable!(Url);

impl<V: ValueType> ValueType for Option<V> {
    fn value_kind() -> ValueKind {
        ValueKind::Nullable(Box::new(V::value_kind()))
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => V::from_value(other).map(Some),
        }
    }
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<V: ValueType> Resolvable for Option<V> {
    fn type_ref() -> TypeRef {
        TypeRef::value::<Self>()
    }
}

impl<V: ValueType> ValueType for Vec<V> {
    fn value_kind() -> ValueKind {
        ValueKind::Array(Box::new(V::value_kind()))
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(V::from_value).collect(),
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(ValueType::into_value).collect())
    }
}

impl<V: ValueType> Resolvable for Vec<V> {
    fn type_ref() -> TypeRef {
        TypeRef::value::<Self>()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Url> for Value {
    fn from(v: Url) -> Self {
        Value::Uri(v)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Declares a fieldless enum as a value type.
///
/// The enum must be `Clone`. Variants are matched by name, and the first
/// listed variant is the default value.
///
/// ```rust
/// use ferrous_ioc::{value_enum, Value, ValueType};
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum Theme { Light, Dark }
/// value_enum!(Theme { Light, Dark });
///
/// assert_eq!(Theme::from_value(&Value::Enum("Dark".into())), Some(Theme::Dark));
/// assert_eq!(Theme::Light.into_value(), Value::Enum("Light".into()));
/// ```
#[macro_export]
macro_rules! value_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::ValueType for $ty {
            fn value_kind() -> $crate::ValueKind {
                $crate::ValueKind::Enum {
                    type_name: ::std::any::type_name::<$ty>(),
                    variants: &[$(stringify!($variant)),+],
                }
            }
            fn from_value(value: &$crate::Value) -> ::std::option::Option<Self> {
                match value {
                    $crate::Value::Enum(name) | $crate::Value::Str(name) => match name.as_str() {
                        $(stringify!($variant) => ::std::option::Option::Some($ty::$variant),)+
                        _ => ::std::option::Option::None,
                    },
                    _ => ::std::option::Option::None,
                }
            }
            fn into_value(self) -> $crate::Value {
                match self {
                    $($ty::$variant => $crate::Value::Enum(stringify!($variant).to_string()),)+
                }
            }
        }

        impl $crate::Resolvable for $ty {
            fn type_ref() -> $crate::TypeRef {
                $crate::TypeRef::value::<Self>()
            }
        }
    };
}

/// Literal values keyed by parameter or property name.
///
/// Consulted ahead of type-based resolution for any constructor parameter or
/// dependency property of the same name.
///
/// ```rust
/// use ferrous_ioc::{Value, ValueContainer};
///
/// let values = ValueContainer::new()
///     .with("title", "Inbox")
///     .with("page_size", 25u32);
///
/// assert_eq!(values.get("title"), Some(&Value::Str("Inbox".into())));
/// assert_eq!(values.get_as::<u32>("page_size"), Some(25));
/// assert!(values.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueContainer {
    values: HashMap<String, Value>,
}

impl ValueContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces the literal for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Literal for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Literal for `name`, converted to `V`.
    pub fn get_as<V: ValueType>(&self, name: &str) -> Option<V> {
        self.get(name).and_then(V::from_value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Copies every entry of `other` over this container.
    pub fn merge(&mut self, other: ValueContainer) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
