//! # Instances
//!
//! An [`Instance`] is the product of one construction call:
//!
//! ```text
//! Instance = base state ⊕ converted schema fields ⊕ pass-through extras
//!            ⊕ shared behavior table (one per factory)
//! ```
//!
//! The base type's state is embedded by value and its members are reached
//! by delegation. Member lookup follows the same precedence as reading a
//! property on a record with a prototype chain:
//!
//! 1. own fields (schema fields and extras),
//! 2. base state,
//! 3. the factory's behavior table,
//! 4. the base type's behavior table.
//!
//! Writes after construction are not re-validated.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::behavior::{Behavior, BehaviorTable};
use crate::error::BehaviorError;
use crate::factory::FactoryInner;
use crate::value::{Fields, Value};

/// A validated, behavior-attached record.
#[derive(Clone)]
pub struct Instance {
    kind: Arc<FactoryInner>,
    fields: Fields,
    base: Option<Fields>,
}

impl Instance {
    pub(crate) fn new(kind: Arc<FactoryInner>, fields: Fields, base: Option<Fields>) -> Self {
        Self { kind, fields, base }
    }

    /// Name of the factory that built this instance.
    pub fn kind_name(&self) -> &str {
        &self.kind.name
    }

    /// Whether this instance embeds the base type named `base`.
    pub fn extends(&self, base: &str) -> bool {
        self.kind
            .base
            .as_ref()
            .is_some_and(|b| b.name() == base)
    }

    /// The factory's shared behavior table.
    pub fn behavior_table(&self) -> &BehaviorTable {
        &self.kind.behaviors
    }

    /// Own fields: converted schema fields followed by pass-through extras.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// State produced by the base type's initializer, if any.
    pub fn base_fields(&self) -> Option<&Fields> {
        self.base.as_ref()
    }

    /// Stored data only: own fields, then base state.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .get(name)
            .or_else(|| self.base.as_ref().and_then(|base| base.get(name)))
    }

    /// Mutable access to stored data.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        if self.fields.contains_key(name) {
            return self.fields.get_mut(name);
        }
        self.base.as_mut().and_then(|base| base.get_mut(name))
    }

    /// Read a member: stored data first, then accessors. An accessor with
    /// no getter reads as `Undefined`; methods are not values.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.field(name) {
            return Some(value.clone());
        }
        match self.member(name)? {
            Behavior::Accessor { get: Some(get), .. } => Some(get(self)),
            Behavior::Accessor { get: None, .. } => Some(Value::Undefined),
            Behavior::Method(_) => None,
        }
    }

    /// Write a member.
    ///
    /// Stored data is overwritten in place. Otherwise an accessor's setter
    /// is invoked; any other name becomes a new own field.
    ///
    /// # Errors
    ///
    /// [`BehaviorError::ReadOnly`] for an accessor without a setter, or the
    /// setter's own error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BehaviorError> {
        let value = value.into();
        if let Some(slot) = self.field_mut(name) {
            *slot = value;
            return Ok(());
        }
        match self.member(name).cloned() {
            Some(Behavior::Accessor { set: Some(set), .. }) => set(self, value),
            Some(Behavior::Accessor { set: None, .. }) => Err(BehaviorError::ReadOnly {
                name: name.to_string(),
            }),
            Some(Behavior::Method(_)) | None => {
                self.fields.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    /// Invoke a method with the given arguments.
    ///
    /// # Errors
    ///
    /// [`BehaviorError::UnknownMember`] when no member has this name,
    /// [`BehaviorError::NotCallable`] when it is an accessor, or the
    /// method's own error.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, BehaviorError> {
        match self.member(name).cloned() {
            Some(Behavior::Method(method)) => method(self, args),
            Some(Behavior::Accessor { .. }) => Err(BehaviorError::NotCallable {
                name: name.to_string(),
            }),
            None => Err(BehaviorError::UnknownMember {
                kind: self.kind.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Read a member as a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    /// Read a member as a string.
    pub fn string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read a member as a boolean.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    /// Stored data as JSON: base state overlaid with own fields.
    /// Accessors are not included.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn member(&self, name: &str) -> Option<&Behavior> {
        self.kind.behaviors.get(name).or_else(|| {
            self.kind
                .base
                .as_ref()
                .and_then(|base| base.behaviors().get(name))
        })
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name == other.kind.name && self.fields == other.fields && self.base == other.base
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Instance");
        s.field("kind", &self.kind.name).field("fields", &self.fields);
        if let Some(base) = &self.base {
            s.field("base", base);
        }
        s.finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(base) = &self.base {
            for (name, value) in base {
                if !self.fields.contains_key(name) {
                    map.serialize_entry(name, value)?;
                }
            }
        }
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
