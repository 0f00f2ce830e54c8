//! # Definitions — One Namespace, Two Buckets
//!
//! A [`Definition`] declares fields and behavior members side by side, the
//! way a record type is usually written. Each entry carries an explicit tag
//! ([`Entry::Field`] or [`Entry::Behavior`]); [`Entry::classify`] reads that
//! tag and [`Definition::split`] buckets every entry into a [`Schema`] or a
//! [`BehaviorTable`].
//!
//! Behaviors move into the table as behaviors. A getter is never
//! evaluated during the split, so it keeps recomputing per access.
//!
//! A name belongs to exactly one bucket. Declaring it in both is an error
//! reported by `split`; redeclaring it within the same bucket follows the
//! usual "later declaration wins" rule, except that a getter and a setter
//! of the same name merge into one accessor.

use indexmap::IndexMap;

use crate::behavior::{Behavior, BehaviorTable};
use crate::descriptor::{Schema, TypeDescriptor};
use crate::error::{BehaviorError, DefinitionError};
use crate::instance::Instance;
use crate::value::Value;

/// Which bucket an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A type descriptor: the name becomes a schema field.
    Descriptor,
    /// Anything else: the name becomes a behavior member.
    Behavior,
}

/// One declared member.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A data field with its declared type.
    Field(TypeDescriptor),
    /// A method or accessor.
    Behavior(Behavior),
}

impl Entry {
    /// Classify the entry. The result permanently decides whether the name
    /// lives in the schema or in the behavior table.
    pub fn classify(&self) -> EntryKind {
        match self {
            Self::Field(_) => EntryKind::Descriptor,
            Self::Behavior(_) => EntryKind::Behavior,
        }
    }
}

impl From<TypeDescriptor> for Entry {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Field(descriptor)
    }
}

impl From<Behavior> for Entry {
    fn from(behavior: Behavior) -> Self {
        Self::Behavior(behavior)
    }
}

/// A mixed declaration of fields and behaviors.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    entries: IndexMap<String, Entry>,
    problems: Vec<DefinitionError>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a data field.
    pub fn field(self, name: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.entry(name, Entry::Field(descriptor.into()))
    }

    /// Declare a method.
    pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<Value, BehaviorError> + Send + Sync + 'static,
    {
        self.entry(name, Entry::Behavior(Behavior::method(f)))
    }

    /// Declare the getter half of an accessor.
    pub fn getter<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        self.entry(name, Entry::Behavior(Behavior::getter(f)))
    }

    /// Declare the setter half of an accessor.
    pub fn setter<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        self.entry(name, Entry::Behavior(Behavior::setter(f)))
    }

    /// Declare any entry.
    pub fn entry(mut self, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(name.into(), entry.into());
        self
    }

    fn insert(&mut self, name: String, entry: Entry) {
        if name.is_empty() {
            self.problems.push(DefinitionError::EmptyName);
            return;
        }
        match (self.entries.get_mut(&name), entry) {
            (None, entry) => {
                self.entries.insert(name, entry);
            }
            (Some(existing), entry) if existing.classify() != entry.classify() => {
                self.problems.push(DefinitionError::DuplicateMember { name });
            }
            (Some(Entry::Behavior(existing)), Entry::Behavior(later)) => {
                let previous =
                    std::mem::replace(existing, Behavior::Accessor { get: None, set: None });
                *existing = previous.merge(later);
            }
            (Some(existing), entry) => *existing = entry,
        }
    }

    /// Number of distinct names declared.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, e)| (name.as_str(), e))
    }

    /// Partition into the data schema and the behavior table.
    ///
    /// # Errors
    ///
    /// Returns the first problem recorded while declaring entries: a name
    /// claimed by both a field and a behavior, or an empty name.
    pub fn split(self) -> Result<(Schema, BehaviorTable), DefinitionError> {
        if let Some(problem) = self.problems.into_iter().next() {
            return Err(problem);
        }
        let mut schema = Schema::new();
        let mut behaviors = BehaviorTable::new();
        for (name, entry) in self.entries {
            match entry {
                Entry::Field(descriptor) => {
                    schema.insert(name, descriptor);
                }
                Entry::Behavior(behavior) => behaviors.insert(name, behavior),
            }
        }
        Ok((schema, behaviors))
    }
}
