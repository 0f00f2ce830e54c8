//! # Behavior Table
//!
//! The shared set of methods and accessors attached to every instance of
//! one factory. The table is built once when the factory is defined and is
//! read-only afterwards; instances hold a handle to it rather than a copy.
//!
//! A getter stays a getter: it is invoked on every access and sees the
//! instance's current state, so computed members never go stale after a
//! mutation.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::BehaviorError;
use crate::instance::Instance;
use crate::value::Value;

/// A method: receives the instance and its arguments.
pub type MethodFn = Arc<dyn Fn(&mut Instance, &[Value]) -> Result<Value, BehaviorError> + Send + Sync>;

/// A computed property reader.
pub type GetterFn = Arc<dyn Fn(&Instance) -> Value + Send + Sync>;

/// A computed property writer.
pub type SetterFn = Arc<dyn Fn(&mut Instance, Value) -> Result<(), BehaviorError> + Send + Sync>;

/// The three member forms a behavior can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    /// A callable method.
    Method,
    /// An accessor with a getter and no setter.
    Getter,
    /// An accessor with a setter and no getter.
    Setter,
    /// An accessor with both halves.
    GetterSetter,
}

/// One behavior member.
#[derive(Clone)]
pub enum Behavior {
    /// A callable method.
    Method(MethodFn),
    /// A computed property; either half may be absent.
    Accessor {
        /// Invoked on read.
        get: Option<GetterFn>,
        /// Invoked on write.
        set: Option<SetterFn>,
    },
}

impl Behavior {
    /// A method member.
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<Value, BehaviorError> + Send + Sync + 'static,
    {
        Self::Method(Arc::new(f))
    }

    /// A read-only accessor.
    pub fn getter<F>(f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        Self::Accessor {
            get: Some(Arc::new(f)),
            set: None,
        }
    }

    /// A write-only accessor.
    pub fn setter<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        Self::Accessor {
            get: None,
            set: Some(Arc::new(f)),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Method(_) => BehaviorKind::Method,
            Self::Accessor {
                get: Some(_),
                set: Some(_),
            } => BehaviorKind::GetterSetter,
            Self::Accessor { set: Some(_), .. } => BehaviorKind::Setter,
            Self::Accessor { .. } => BehaviorKind::Getter,
        }
    }

    /// Combine with a later declaration of the same name. Two accessors
    /// merge half by half (the later half wins); otherwise the later
    /// declaration replaces this one.
    pub fn merge(self, later: Behavior) -> Behavior {
        match (self, later) {
            (Self::Accessor { get, set }, Self::Accessor { get: later_get, set: later_set }) => {
                Self::Accessor {
                    get: later_get.or(get),
                    set: later_set.or(set),
                }
            }
            (_, later) => later,
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Behavior::{:?}", self.kind())
    }
}

/// Ordered mapping from member name to behavior.
#[derive(Clone, Default)]
pub struct BehaviorTable {
    members: IndexMap<String, Behavior>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of a method insertion.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<Value, BehaviorError> + Send + Sync + 'static,
    {
        self.insert(name, Behavior::method(f));
        self
    }

    /// Builder form of a getter insertion.
    pub fn getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        self.insert(name, Behavior::getter(f));
        self
    }

    /// Builder form of a setter insertion.
    pub fn setter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> Result<(), BehaviorError> + Send + Sync + 'static,
    {
        self.insert(name, Behavior::setter(f));
        self
    }

    /// Add a member, merging with an existing member of the same name
    /// per [`Behavior::merge`].
    pub fn insert(&mut self, name: impl Into<String>, behavior: Behavior) {
        let name = name.into();
        if let Some(existing) = self.members.get_mut(&name) {
            let previous = std::mem::replace(existing, Behavior::Accessor { get: None, set: None });
            *existing = previous.merge(behavior);
        } else {
            self.members.insert(name, behavior);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Behavior> {
        self.members.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Behavior)> {
        self.members.iter().map(|(name, b)| (name.as_str(), b))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for BehaviorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.members.iter().map(|(name, b)| (name, b.kind())))
            .finish()
    }
}
