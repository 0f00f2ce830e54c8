//! # Type Registry
//!
//! Maps names in type expressions to [`TypeDescriptor`]s. Primitive names
//! and their aliases are built in; custom types are supplied by the
//! application, since their constructors are code.
//!
//! | Descriptor | Accepted names                                   |
//! |------------|--------------------------------------------------|
//! | `String`   | `string`, `String`, `str`, `text`                |
//! | `Number`   | `number`, `Number`, `float`, `int`, `integer`    |
//! | `Boolean`  | `boolean`, `Boolean`, `bool`                     |
//! | `Date`     | `date`, `Date`, `datetime`, `timestamp`          |
//!
//! Built-in names take precedence over custom registrations.

use indexmap::IndexMap;

use kind_core::{CustomType, Primitive, TypeDescriptor};

use crate::error::ExprError;
use crate::expr::TypeExpr;

/// Name → descriptor resolution for schema documents.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    custom: IndexMap<String, CustomType>,
}

impl TypeRegistry {
    /// A registry knowing only the built-in primitives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom type under its own name.
    pub fn register(&mut self, custom: CustomType) -> &mut Self {
        let name = custom.name().to_string();
        self.register_as(name, custom)
    }

    /// Register a custom type under an additional name.
    pub fn register_as(&mut self, name: impl Into<String>, custom: CustomType) -> &mut Self {
        let name = name.into();
        tracing::trace!(name = %name, custom = custom.name(), "registered custom type");
        self.custom.insert(name, custom);
        self
    }

    /// Builder form of [`TypeRegistry::register`].
    pub fn with(mut self, custom: CustomType) -> Self {
        self.register(custom);
        self
    }

    /// Look up a single name.
    pub fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        primitive(name)
            .map(TypeDescriptor::Primitive)
            .or_else(|| self.custom.get(name).cloned().map(TypeDescriptor::Custom))
    }

    /// Names of the registered custom types, in registration order.
    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    /// Resolve a parsed expression.
    ///
    /// # Errors
    ///
    /// [`ExprError::UnknownType`] naming the first unresolved name.
    pub fn resolve(&self, expr: &TypeExpr) -> Result<TypeDescriptor, ExprError> {
        match expr {
            TypeExpr::Named(name) => self.lookup(name).ok_or_else(|| ExprError::UnknownType {
                name: name.clone(),
            }),
            TypeExpr::Optional(inner) => Ok(TypeDescriptor::Optional(Box::new(self.resolve(inner)?))),
            TypeExpr::Array(inner) => Ok(TypeDescriptor::Array(Box::new(self.resolve(inner)?))),
        }
    }

    /// Parse and resolve a textual expression.
    ///
    /// # Errors
    ///
    /// Any parse error, or [`ExprError::UnknownType`].
    pub fn parse(&self, text: &str) -> Result<TypeDescriptor, ExprError> {
        self.resolve(&TypeExpr::parse(text)?)
    }
}

fn primitive(name: &str) -> Option<Primitive> {
    let primitive = match name {
        "string" | "String" | "str" | "text" => Primitive::String,
        "number" | "Number" | "float" | "int" | "integer" => Primitive::Number,
        "boolean" | "Boolean" | "bool" => Primitive::Boolean,
        "date" | "Date" | "datetime" | "timestamp" => Primitive::Date,
        _ => return None,
    };
    Some(primitive)
}
