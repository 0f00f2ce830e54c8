//! # Values — Loosely-Typed Input and Converted Output
//!
//! [`Value`] is the single representation used for both raw input data
//! (typically deserialized request or config bodies) and the converted
//! field values stored on an instance.
//!
//! `Undefined` and `Null` are distinct: a key missing from the input reads
//! as `Undefined`, an explicit `null` is `Null`. Neither is ever a
//! conversion error.
//!
//! Custom types produced by user-supplied constructors are stored as
//! `Value::Custom`, a shared handle to any type implementing
//! [`CustomValue`]. The trait is implemented automatically for every
//! `Debug + PartialEq + Serialize + Send + Sync + 'static` type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::temporal;

/// Insertion-ordered field map used for input records and instance state.
pub type Fields = IndexMap<String, Value>;

/// Integers up to this magnitude are exactly representable in `f64` and
/// serialize as JSON integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ─── Custom Values ───────────────────────────────────────────────────

/// A value produced by a custom type's constructor.
///
/// Implemented for every `Any + Debug + PartialEq + Serialize + Send + Sync`
/// type; there is no need to implement it by hand.
pub trait CustomValue: fmt::Debug + Send + Sync {
    /// Short name of the concrete type (e.g., `Email`).
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Equality across the trait object boundary. Values of different
    /// concrete types are never equal.
    fn eq_custom(&self, other: &dyn CustomValue) -> bool;

    /// The serde projection of the value, used for serialization and for
    /// coercing custom values to primitives.
    fn to_json(&self) -> serde_json::Value;
}

impl<T> CustomValue for T
where
    T: Any + fmt::Debug + PartialEq + Serialize + Send + Sync,
{
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_custom(&self, other: &dyn CustomValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// `my_crate::model::Email` → `Email`, `Wrapper<a::B>` → `Wrapper`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}

// ─── Value ───────────────────────────────────────────────────────────

/// A loosely-typed value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence: the key was not present.
    Undefined,
    /// Explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number; integers and floats share one representation.
    Number(f64),
    /// A string.
    String(String),
    /// A UTC date at millisecond precision.
    Date(DateTime<Utc>),
    /// A sequence.
    Array(Vec<Value>),
    /// A nested record.
    Object(Fields),
    /// A value produced by a custom type.
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    /// Wrap a custom value.
    pub fn custom<T: CustomValue + 'static>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Runtime type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Custom(custom) => custom.type_name(),
        }
    }

    /// Whether this is `Undefined` or `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Whether this is `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Downcast a custom value to its concrete type.
    pub fn as_custom<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(custom) => custom.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The textual form of the value.
    ///
    /// Numbers use their shortest round-trip form (`456`, `3.25`,
    /// `Infinity`), dates use ISO 8601 with milliseconds, arrays join
    /// their elements with `,` (null and undefined as empty), objects
    /// render as compact JSON, custom values use their serde projection.
    pub fn to_text(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Date(dt) => temporal::to_iso8601(dt),
            Self::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_text()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => self.to_json().to_string(),
            Self::Custom(custom) => match custom.to_json() {
                serde_json::Value::String(s) => s,
                other => Value::from(other).to_text(),
            },
        }
    }

    /// A short rendering for diagnostics: strings quoted, everything else
    /// in its JSON-like form.
    pub fn preview(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::Number(n) => format_number(*n),
            Self::Date(dt) => temporal::to_iso8601(dt),
            Self::Custom(custom) => format!("{}({})", custom.type_name(), custom.to_json()),
            _ => self.to_json().to_string(),
        }
    }

    /// Convert to a `serde_json::Value`. `Undefined` becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Render a number in its shortest round-trip form, spelling non-finite
/// values `NaN`, `Infinity`, and `-Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a.eq_custom(&**b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => {
                if !n.is_finite() {
                    serializer.serialize_unit()
                } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(dt) => serializer.serialize_str(&temporal::to_iso8601(dt)),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(fields) => serializer.collect_map(fields),
            Self::Custom(custom) => custom.to_json().serialize(serializer),
        }
    }
}

// ─── Conversions into Value ──────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Date(dt)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Object(fields)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
