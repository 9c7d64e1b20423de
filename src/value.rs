//! Introspection adapter.
//!
//! Every assertion works on [`Value`], a closed set of value kinds produced by the
//! [`Inspect`] trait. Matching on `Value` replaces the reflection a dynamically typed
//! assertion library would rely on: kind checks, field lookup by name and structural
//! walking are all exhaustive matches over this enum.
//!
//! # Examples
//!
//! ```rust
//! use verdict::value::{Inspect, Kind, Record, Value};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Inspect for Person {
//!     fn to_value(&self) -> Value {
//!         Record::new("Person")
//!             .field("Name", &self.name)
//!             .field("Age", &self.age)
//!             .finish()
//!     }
//! }
//!
//! let v = Person { name: "Ada".into(), age: 36 }.to_value();
//! assert_eq!(v.kind(), Kind::Record);
//! assert!(v.field("Name").is_some());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::fault::ErrorValue;
use crate::format;

/// The kind tag of a [`Value`], used in type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Pointer,
    Bool,
    Int,
    Uint,
    Float,
    Char,
    Text,
    Sequence,
    Array,
    Mapping,
    Record,
    Error,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Pointer => "pointer",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::Text => "string",
            Kind::Sequence => "slice",
            Kind::Array => "array",
            Kind::Mapping => "map",
            Kind::Record => "struct",
            Kind::Error => "error",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named member of a [`Value::Record`].
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// Unexported fields are still part of the comparison surface unless
    /// [`crate::compare::CompareConfig::compare_unexported`] is turned off.
    pub exported: bool,
    pub value: Value,
}

/// An introspected value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Nil,
    /// A nullable reference; `target: None` is a pointer holding no referent.
    Pointer {
        type_name: String,
        target: Option<Box<Value>>,
    },
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Text(String),
    /// A growable sequence; `None` is a nil sequence, distinct from an empty one.
    Sequence(Option<Vec<Value>>),
    /// A fixed-size sequence.
    Array(Vec<Value>),
    /// A keyed mapping; `None` is a nil mapping, distinct from an empty one.
    Mapping(Option<Vec<(Value, Value)>>),
    Record {
        type_name: String,
        fields: Vec<Field>,
    },
    Error(ErrorValue),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Pointer { .. } => Kind::Pointer,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Char(_) => Kind::Char,
            Value::Text(_) => Kind::Text,
            Value::Sequence(_) => Kind::Sequence,
            Value::Array(_) => Kind::Array,
            Value::Mapping(_) => Kind::Mapping,
            Value::Record { .. } => Kind::Record,
            Value::Error(_) => Kind::Error,
        }
    }

    /// Human-readable type name: the record or pointee name where one is known,
    /// otherwise the kind name.
    pub fn type_name(&self) -> String {
        match self {
            Value::Record { type_name, .. } => type_name.clone(),
            Value::Pointer { type_name, .. } => format!("Option<{type_name}>"),
            other => other.kind().as_str().to_string(),
        }
    }

    /// True for the absent value and for a pointer holding no referent.
    ///
    /// A typed zero value such as an empty string is not nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil | Value::Pointer { target: None, .. })
    }

    /// Follows non-nil pointers to the value they reference.
    pub fn resolve(&self) -> &Value {
        let mut current = self;
        while let Value::Pointer {
            target: Some(target),
            ..
        } = current
        {
            current = target;
        }
        current
    }

    /// Length of a sequence, array, text or mapping; `None` for every other kind.
    ///
    /// Nil sequences and mappings have length zero. Text length counts characters.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Sequence(items) => Some(items.as_ref().map_or(0, Vec::len)),
            Value::Array(items) => Some(items.len()),
            Value::Mapping(entries) => Some(entries.as_ref().map_or(0, Vec::len)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Looks up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self {
            Value::Record { fields, .. } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    pub fn nil_sequence() -> Value {
        Value::Sequence(None)
    }

    pub fn nil_mapping() -> Value {
        Value::Mapping(None)
    }
}

/// Builder for [`Value::Record`].
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    fields: Vec<Field>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Starts a record named after `T` with module paths stripped.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(short_type_name::<T>())
    }

    /// Adds an exported field.
    pub fn field<V: Inspect + ?Sized>(mut self, name: impl Into<String>, value: &V) -> Self {
        self.fields.push(Field {
            name: name.into(),
            exported: true,
            value: value.to_value(),
        });
        self
    }

    /// Adds an unexported field.
    pub fn private<V: Inspect + ?Sized>(mut self, name: impl Into<String>, value: &V) -> Self {
        self.fields.push(Field {
            name: name.into(),
            exported: false,
            value: value.to_value(),
        });
        self
    }

    pub fn finish(self) -> Value {
        Value::Record {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

/// Converts a Rust value into a [`Value`].
///
/// `absent` and `present` decide how the type looks behind an [`Option`]. The
/// defaults model `Option<T>` as a nullable pointer; collections override them so
/// `Option<Vec<T>>` distinguishes a nil sequence from an empty one.
pub trait Inspect {
    fn to_value(&self) -> Value;

    /// The value an `Option::<Self>::None` inspects as.
    fn absent() -> Value
    where
        Self: Sized,
    {
        Value::Pointer {
            type_name: short_type_name::<Self>(),
            target: None,
        }
    }

    /// The value an `Option::Some(self)` inspects as.
    fn present(&self) -> Value
    where
        Self: Sized,
    {
        Value::Pointer {
            type_name: short_type_name::<Self>(),
            target: Some(Box::new(self.to_value())),
        }
    }
}

/// `std::any::type_name` with every module path removed.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut ident = String::new();
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("::") {
            ident.clear();
            rest = &rest[2..];
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            ident.push(c);
        } else {
            out.push_str(&ident);
            ident.clear();
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out.push_str(&ident);
    out
}

macro_rules! inspect_as {
    ($variant:ident, $cast:ty => $($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn to_value(&self) -> Value {
                    Value::$variant(*self as $cast)
                }
            }
        )*
    };
}

inspect_as!(Int, i64 => i8, i16, i32, i64, isize);
inspect_as!(Uint, u64 => u8, u16, u32, u64, usize);
inspect_as!(Float, f64 => f32, f64);

impl Inspect for () {
    fn to_value(&self) -> Value {
        Value::Nil
    }
}

impl Inspect for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Inspect for char {
    fn to_value(&self) -> Value {
        Value::Char(*self)
    }
}

impl Inspect for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Inspect for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl Inspect for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Inspect for ErrorValue {
    fn to_value(&self) -> Value {
        Value::Error(self.clone())
    }

    fn absent() -> Value {
        Value::Nil
    }

    fn present(&self) -> Value {
        self.to_value()
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.present(),
            None => T::absent(),
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(Some(self.iter().map(Inspect::to_value).collect()))
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }

    fn absent() -> Value {
        Value::Sequence(None)
    }

    fn present(&self) -> Value {
        self.to_value()
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Inspect::to_value).collect())
    }
}

impl<K: Inspect, V: Inspect, S: BuildHasher> Inspect for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        let mut entries: Vec<(Value, Value)> =
            self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect();
        // Hash order is unstable; sort by rendered key so output is reproducible.
        entries.sort_by_cached_key(|(k, _)| format::plain(k));
        Value::Mapping(Some(entries))
    }

    fn absent() -> Value {
        Value::Mapping(None)
    }

    fn present(&self) -> Value {
        self.to_value()
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Mapping(Some(
            self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect(),
        ))
    }

    fn absent() -> Value {
        Value::Mapping(None)
    }

    fn present(&self) -> Value {
        self.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_strips_paths() {
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<Option<Vec<i32>>>(), "Option<Vec<i32>>");
        assert_eq!(
            short_type_name::<HashMap<String, u8>>(),
            "HashMap<String, u8>"
        );
    }

    #[test]
    fn option_models_nil_pointer_and_nil_collections() {
        assert!(None::<i32>.to_value().is_nil());
        assert!(!Some(0).to_value().is_nil());
        assert!(matches!(None::<Vec<u8>>.to_value(), Value::Sequence(None)));
        assert!(matches!(
            Some(Vec::<u8>::new()).to_value(),
            Value::Sequence(Some(ref v)) if v.is_empty()
        ));
        assert!(matches!(
            None::<HashMap<String, u8>>.to_value(),
            Value::Mapping(None)
        ));
    }

    #[test]
    fn empty_string_is_not_nil() {
        assert!(!"".to_value().is_nil());
        assert!(().to_value().is_nil());
    }

    #[test]
    fn len_covers_collection_kinds_only() {
        assert_eq!("héllo".to_value().len(), Some(5));
        assert_eq!([1, 2, 3].to_value().len(), Some(3));
        assert_eq!(Value::nil_sequence().len(), Some(0));
        assert_eq!(Value::nil_mapping().len(), Some(0));
        assert_eq!(5.to_value().len(), None);
    }

    #[test]
    fn resolve_follows_pointers() {
        let v = Some(Some(7u8)).to_value();
        assert!(matches!(v.resolve(), Value::Uint(7)));
        assert!(matches!(None::<u8>.to_value().resolve(), Value::Pointer { .. }));
    }

    #[test]
    fn hash_map_entries_are_sorted() {
        let mut m = HashMap::new();
        m.insert("b", 2);
        m.insert("a", 1);
        m.insert("c", 3);
        let Value::Mapping(Some(entries)) = m.to_value() else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = entries
            .iter()
            .filter_map(|(k, _)| k.as_text().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
