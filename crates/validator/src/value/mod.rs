//! Structured subject values.
//!
//! A subject is whatever the deserialization layer produced for one request:
//! nested objects, lists and scalars. Validators never build subjects, they
//! only read them through a [`FieldPath`] (and write back into them for
//! mutating operations such as `HARDTRIM`).
//!
//! Scalars come in two flavours. A bare scalar (`Bool`, `Int`, ...) is always
//! set. A nilable scalar (`NilableBool`, `NilableInt`, ...) wraps a
//! [`Nilable`] and may be unset. `Null` stands for an absent value or
//! container.

mod nilable;
mod path;

pub use nilable::Nilable;
pub use path::{FieldPath, Resolved, resolve, resolve_mut};

use indexmap::IndexMap;
use std::fmt;

// ============================================================================
// VALUE
// ============================================================================

/// A node of a structured subject.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Bare boolean.
    Bool(bool),
    /// Bare integer.
    Int(i64),
    /// Bare float.
    Float(f64),
    /// Bare string.
    String(String),
    /// Boolean that may be unset.
    NilableBool(Nilable<bool>),
    /// Integer that may be unset.
    NilableInt(Nilable<i64>),
    /// Float that may be unset.
    NilableFloat(Nilable<f64>),
    /// String that may be unset.
    NilableString(Nilable<String>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Insertion-ordered map of named values.
    Object(IndexMap<String, Value>),
}

/// Coarse classification of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `Null`.
    Null,
    /// `Bool` or `NilableBool`.
    Bool,
    /// `Int` or `NilableInt`.
    Int,
    /// `Float` or `NilableFloat`.
    Float,
    /// `String` or `NilableString`.
    String,
    /// `List`.
    List,
    /// `Object`.
    Object,
}

impl ValueKind {
    /// Lower-case name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Builds an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a list.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::List(items.into_iter().collect())
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) | Self::NilableBool(_) => ValueKind::Bool,
            Self::Int(_) | Self::NilableInt(_) => ValueKind::Int,
            Self::Float(_) | Self::NilableFloat(_) => ValueKind::Float,
            Self::String(_) | Self::NilableString(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Null` and for a nilable without a value.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        match self {
            Self::Null => true,
            Self::NilableBool(n) => !n.is_set(),
            Self::NilableInt(n) => !n.is_set(),
            Self::NilableFloat(n) => !n.is_set(),
            Self::NilableString(n) => !n.is_set(),
            _ => false,
        }
    }

    /// Looks up a key on an object value.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the string content of a bare or set nilable string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::NilableString(n) => n.get().map(String::as_str),
            _ => None,
        }
    }

    /// Converts into JSON. Unset nilables and non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => float_to_json(*f),
            Self::String(s) => Json::String(s.clone()),
            Self::NilableBool(n) => n.get().map_or(Json::Null, |b| Json::Bool(*b)),
            Self::NilableInt(n) => n.get().map_or(Json::Null, |i| Json::from(*i)),
            Self::NilableFloat(n) => n.get().map_or(Json::Null, |f| float_to_json(*f)),
            Self::NilableString(n) => n.get().map_or(Json::Null, |s| Json::String(s.clone())),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// JSON `null` becomes [`Value::Null`]; integers that fit `i64` become
/// [`Value::Int`], every other number becomes [`Value::Float`].
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Nilable<bool>> for Value {
    fn from(n: Nilable<bool>) -> Self {
        Self::NilableBool(n)
    }
}

impl From<Nilable<i64>> for Value {
    fn from(n: Nilable<i64>) -> Self {
        Self::NilableInt(n)
    }
}

impl From<Nilable<f64>> for Value {
    fn from(n: Nilable<f64>) -> Self {
        Self::NilableFloat(n)
    }
}

impl From<Nilable<String>> for Value {
    fn from(n: Nilable<String>) -> Self {
        Self::NilableString(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn from_json_maps_every_shape() {
        let v = Value::from(json!({
            "name": "a",
            "age": 3,
            "score": 1.5,
            "tags": ["x"],
            "gone": null,
            "ok": true
        }));

        let expected = Value::object([
            ("name", Value::from("a")),
            ("age", Value::Int(3)),
            ("score", Value::Float(1.5)),
            ("tags", Value::list([Value::from("x")])),
            ("gone", Value::Null),
            ("ok", Value::Bool(true)),
        ]);
        assert_eq!(v, expected);
    }

    #[test]
    fn json_round_trip() {
        let source = json!({"b": 1, "a": [true, "s"]});
        assert_eq!(Value::from(source.clone()).to_json(), source);
    }

    #[test]
    fn unset_nilable_serializes_as_null() {
        let v = Value::object([("n", Value::NilableInt(Nilable::unset()))]);
        assert_eq!(v.to_json(), json!({"n": null}));
    }

    #[test]
    fn kind_ignores_nilability() {
        assert_eq!(Value::Int(1).kind(), ValueKind::Int);
        assert_eq!(Value::NilableInt(Nilable::unset()).kind(), ValueKind::Int);
        assert_eq!(Value::Null.kind().name(), "null");
    }

    #[test]
    fn as_str_reads_both_string_flavours() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(Nilable::new("y".to_string())).as_str(), Some("y"));
        assert_eq!(Value::from(Nilable::<String>::unset()).as_str(), None);
        assert_eq!(Value::Int(1).as_str(), None);
    }

    #[test]
    fn zero_values_are_not_unset() {
        assert!(!Value::from("").is_unset());
        assert!(!Value::Int(0).is_unset());
        assert!(!Value::Bool(false).is_unset());
        assert!(Value::Null.is_unset());
        assert!(Value::from(Nilable::<bool>::unset()).is_unset());
        assert!(!Value::from(Nilable::new(false)).is_unset());
    }
}
