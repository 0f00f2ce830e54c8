//! # Factories — Instance Builder
//!
//! A [`Factory`] owns one fixed schema and one fixed behavior table and
//! turns loosely-typed input records into [`Instance`]s.
//!
//! ## Construction
//!
//! 1. Run the base type's initializer (if any) to obtain base state.
//! 2. Convert each schema field in declaration order. A missing key reads
//!    as `Undefined`; optional fields given `Undefined` are not assigned.
//! 3. Apply the [`ExtraFields`] policy to input keys the schema does not
//!    declare.
//! 4. Attach the shared behavior table.
//!
//! The first failure aborts construction; no partially built instance is
//! ever returned. Conversion has no field-to-field dependency, so the
//! declaration order only decides which failure is reported first.
//!
//! ## Thread Safety
//!
//! `Factory` is `Send + Sync` and cheap to clone. Construction takes
//! `&self` and builds a fresh instance per call, so one factory can serve
//! concurrent callers without locking.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorTable;
use crate::convert::convert;
use crate::definition::Definition;
use crate::descriptor::Schema;
use crate::error::{BoxError, ConstructionError, DefinitionError, FieldPath, Observed};
use crate::instance::Instance;
use crate::value::{Fields, Value};

// ─── Extra Fields Policy ─────────────────────────────────────────────

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFields {
    /// Fail with [`ConstructionError::UnexpectedField`].
    #[default]
    Reject,
    /// Ignore them.
    Drop,
    /// Copy them onto the instance unchanged, without validation.
    PassThrough,
}

impl fmt::Display for ExtraFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reject => "reject",
            Self::Drop => "drop",
            Self::PassThrough => "pass_through",
        };
        f.write_str(s)
    }
}

// ─── Base Types ──────────────────────────────────────────────────────

type InitializerFn = dyn Fn() -> Result<Fields, BoxError> + Send + Sync;

/// State and behavior every instance of a factory inherits.
///
/// The base's state is computed per instance (static defaults first, then
/// the initializer's output) and embedded by value. Its behavior table is
/// consulted after the factory's own.
#[derive(Clone)]
pub struct BaseType {
    name: String,
    defaults: Fields,
    initializer: Option<Arc<InitializerFn>>,
    behaviors: BehaviorTable,
}

impl BaseType {
    /// A base type with no state and no behavior.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Fields::new(),
            initializer: None,
            behaviors: BehaviorTable::new(),
        }
    }

    /// Add a field every instance starts with.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Compute base state per instance. Runs after the static defaults
    /// are applied; its fields overwrite defaults of the same name.
    pub fn with_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn() -> Result<Fields, BoxError> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Replace the base's behavior table.
    pub fn with_behaviors(mut self, behaviors: BehaviorTable) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behaviors(&self) -> &BehaviorTable {
        &self.behaviors
    }

    fn initialize(&self) -> Result<Fields, BoxError> {
        let mut state = self.defaults.clone();
        if let Some(initializer) = &self.initializer {
            state.extend(initializer()?);
        }
        Ok(state)
    }
}

impl fmt::Debug for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseType")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("initializer", &self.initializer.is_some())
            .field("behaviors", &self.behaviors)
            .finish()
    }
}

// ─── Factory ─────────────────────────────────────────────────────────

/// Everything instances of one factory share.
#[derive(Debug, Clone)]
pub(crate) struct FactoryInner {
    pub(crate) name: String,
    pub(crate) schema: Schema,
    pub(crate) behaviors: BehaviorTable,
    pub(crate) base: Option<BaseType>,
    pub(crate) extra_fields: ExtraFields,
}

/// Builds validated instances from loosely-typed input.
#[derive(Debug, Clone)]
pub struct Factory {
    inner: Arc<FactoryInner>,
}

impl Factory {
    /// Create a factory from an explicit schema and behavior table.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateMember`] when a name appears in
    /// both the schema and the behavior table.
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        behaviors: BehaviorTable,
    ) -> Result<Self, DefinitionError> {
        if let Some(name) = schema.names().find(|n| behaviors.contains(n)) {
            return Err(DefinitionError::DuplicateMember {
                name: name.to_string(),
            });
        }
        let name = name.into();
        tracing::debug!(
            kind = %name,
            fields = schema.len(),
            behaviors = behaviors.len(),
            "defined factory"
        );
        Ok(Self {
            inner: Arc::new(FactoryInner {
                name,
                schema,
                behaviors,
                base: None,
                extra_fields: ExtraFields::default(),
            }),
        })
    }

    /// Embed a base type in every instance.
    pub fn with_base(mut self, base: BaseType) -> Self {
        Arc::make_mut(&mut self.inner).base = Some(base);
        self
    }

    /// Choose how undeclared input keys are handled.
    pub fn with_extra_fields(mut self, policy: ExtraFields) -> Self {
        Arc::make_mut(&mut self.inner).extra_fields = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn behaviors(&self) -> &BehaviorTable {
        &self.inner.behaviors
    }

    pub fn base(&self) -> Option<&BaseType> {
        self.inner.base.as_ref()
    }

    pub fn extra_fields(&self) -> ExtraFields {
        self.inner.extra_fields
    }

    /// Build an instance from an input record.
    ///
    /// # Errors
    ///
    /// The first [`ConversionError`](crate::ConversionError) in schema
    /// order, a base initializer failure, or an undeclared field under
    /// [`ExtraFields::Reject`].
    pub fn construct(&self, input: Fields) -> Result<Instance, ConstructionError> {
        tracing::trace!(kind = %self.inner.name, keys = input.len(), "constructing instance");
        let result = self.build(input);
        if let Err(err) = &result {
            tracing::debug!(kind = %self.inner.name, error = %err, "construction failed");
        }
        result
    }

    /// Build an instance from a JSON object.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::NotAnObject`] for any JSON value other than an
    /// object, otherwise as [`Factory::construct`].
    pub fn construct_json(&self, input: serde_json::Value) -> Result<Instance, ConstructionError> {
        match Value::from(input) {
            Value::Object(fields) => self.construct(fields),
            other => Err(ConstructionError::NotAnObject {
                kind: self.inner.name.clone(),
                observed: Observed::of(&other),
            }),
        }
    }

    fn build(&self, mut input: Fields) -> Result<Instance, ConstructionError> {
        let inner = &self.inner;

        let base = match &inner.base {
            Some(base) => Some(base.initialize().map_err(|source| {
                ConstructionError::BaseInitialization {
                    base: base.name().to_string(),
                    source,
                }
            })?),
            None => None,
        };

        let mut fields = Fields::with_capacity(inner.schema.len());
        for (name, descriptor) in inner.schema.iter() {
            let raw = input.shift_remove(name).unwrap_or(Value::Undefined);
            if let Some(value) = convert(&FieldPath::field(name), &raw, descriptor)? {
                fields.insert(name.to_string(), value);
            }
        }

        // Whatever is left in `input` is undeclared.
        if !input.is_empty() {
            match inner.extra_fields {
                ExtraFields::Reject => {
                    let name = input.keys().next().cloned().unwrap_or_default();
                    return Err(ConstructionError::UnexpectedField {
                        kind: inner.name.clone(),
                        name,
                    });
                }
                ExtraFields::Drop => {
                    tracing::debug!(
                        kind = %inner.name,
                        dropped = ?input.keys().collect::<Vec<_>>(),
                        "dropped undeclared fields"
                    );
                }
                ExtraFields::PassThrough => {
                    tracing::debug!(
                        kind = %inner.name,
                        copied = ?input.keys().collect::<Vec<_>>(),
                        "copied undeclared fields without validation"
                    );
                    fields.extend(input);
                }
            }
        }

        Ok(Instance::new(Arc::clone(&self.inner), fields, base))
    }
}

/// Define a factory from a mixed definition, optionally embedding a base
/// type.
///
/// # Errors
///
/// Returns the [`DefinitionError`] raised by [`Definition::split`].
pub fn define_type(
    name: impl Into<String>,
    definition: Definition,
    base: Option<BaseType>,
) -> Result<Factory, DefinitionError> {
    let (schema, behaviors) = definition.split()?;
    let factory = Factory::new(name, schema, behaviors)?;
    Ok(match base {
        Some(base) => factory.with_base(base),
        None => factory,
    })
}
