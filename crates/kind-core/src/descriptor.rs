//! # Type Descriptors
//!
//! The closed set of field types a schema can declare:
//!
//! ```text
//! TypeDescriptor ::= Primitive(String | Number | Boolean | Date)
//!                  | Custom(CustomType)
//!                  | Optional(TypeDescriptor)
//!                  | Array(TypeDescriptor)
//! ```
//!
//! Descriptors are built only through the explicit constructors in this
//! module ([`string`], [`number`], [`boolean`], [`date`], [`custom`],
//! [`optional`], [`array_of`]). Nothing is inferred from the runtime shape
//! of a value. Wrappers nest to any depth.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::BoxError;
use crate::value::{short_type_name, CustomValue, Value};

/// Built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Textual values.
    String,
    /// Numeric values (`f64`).
    Number,
    /// Boolean values.
    Boolean,
    /// UTC dates at millisecond precision.
    Date,
}

impl Primitive {
    /// All primitive kinds, in declaration order.
    pub const ALL: [Primitive; 4] = [Self::String, Self::Number, Self::Boolean, Self::Date];

    /// The type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Custom Types ────────────────────────────────────────────────────

type ConstructFn = dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync;

/// A named constructor invoked with the raw field value.
///
/// Whatever the constructor returns becomes the field value; whatever
/// error it raises becomes the cause of the field's conversion error.
/// Business rules (an email must contain `@`) live here.
#[derive(Clone)]
pub struct CustomType {
    name: Arc<str>,
    construct: Arc<ConstructFn>,
}

impl CustomType {
    /// Create a custom type from a name and a constructor closure.
    pub fn new<F>(name: impl Into<String>, construct: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            construct: Arc::new(construct),
        }
    }

    /// Create a custom type from a Rust type implementing [`Construct`].
    /// Constructed values are stored as [`Value::Custom`].
    pub fn of<T: Construct>() -> Self {
        Self::new(short_type_name(std::any::type_name::<T>()), |raw| {
            T::construct(raw).map(Value::custom).map_err(Into::into)
        })
    }

    /// The type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the constructor.
    pub fn construct(&self, raw: &Value) -> Result<Value, BoxError> {
        (self.construct)(raw)
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Two custom types are equal when they share the same constructor.
impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.construct, &other.construct)
    }
}

/// A Rust type that can be constructed from one raw field value.
///
/// ```
/// use kind_core::{custom, Construct, ConstructorError, CustomType, Value};
/// use serde::Serialize;
///
/// #[derive(Debug, PartialEq, Serialize)]
/// struct Email(String);
///
/// impl Construct for Email {
///     type Error = ConstructorError;
///     fn construct(raw: &Value) -> Result<Self, Self::Error> {
///         let text = raw.to_text();
///         if !text.contains('@') {
///             return Err(ConstructorError::new("Invalid email"));
///         }
///         Ok(Self(text))
///     }
/// }
///
/// assert_eq!(custom::<Email>().name(), "Email");
/// let email = CustomType::of::<Email>();
/// let value = email.construct(&Value::from("ada@example.com")).unwrap();
/// assert_eq!(value.as_custom::<Email>(), Some(&Email("ada@example.com".into())));
/// assert!(email.construct(&Value::from("ada")).is_err());
/// ```
pub trait Construct: CustomValue + Sized + 'static {
    /// Error raised when the raw value is rejected.
    type Error: Into<BoxError>;

    /// Build the value from its raw input.
    fn construct(raw: &Value) -> Result<Self, Self::Error>;
}

// ─── Type Descriptor ─────────────────────────────────────────────────

/// The declared type of one schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// One of the built-in primitives.
    Primitive(Primitive),
    /// A custom constructible type.
    Custom(CustomType),
    /// The field may be omitted; omitted fields are not assigned.
    Optional(Box<TypeDescriptor>),
    /// The field is a homogeneous sequence.
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Display name: `Number`, `Email`, `Optional<Array<String>>`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Whether the outermost wrapper is `Optional`.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Nesting depth of wrappers (0 for primitives and custom types).
    pub fn depth(&self) -> usize {
        match self {
            Self::Primitive(_) | Self::Custom(_) => 0,
            Self::Optional(inner) | Self::Array(inner) => 1 + inner.depth(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Custom(custom) => f.write_str(custom.name()),
            Self::Optional(inner) => write!(f, "Optional<{inner}>"),
            Self::Array(inner) => write!(f, "Array<{inner}>"),
        }
    }
}

impl From<Primitive> for TypeDescriptor {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl From<CustomType> for TypeDescriptor {
    fn from(custom: CustomType) -> Self {
        Self::Custom(custom)
    }
}

/// `String` descriptor.
pub fn string() -> TypeDescriptor {
    TypeDescriptor::Primitive(Primitive::String)
}

/// `Number` descriptor.
pub fn number() -> TypeDescriptor {
    TypeDescriptor::Primitive(Primitive::Number)
}

/// `Boolean` descriptor.
pub fn boolean() -> TypeDescriptor {
    TypeDescriptor::Primitive(Primitive::Boolean)
}

/// `Date` descriptor.
pub fn date() -> TypeDescriptor {
    TypeDescriptor::Primitive(Primitive::Date)
}

/// Custom descriptor for a Rust type implementing [`Construct`].
pub fn custom<T: Construct>() -> TypeDescriptor {
    TypeDescriptor::Custom(CustomType::of::<T>())
}

/// Mark a field as omittable.
pub fn optional(inner: impl Into<TypeDescriptor>) -> TypeDescriptor {
    TypeDescriptor::Optional(Box::new(inner.into()))
}

/// Mark a field as a homogeneous sequence of `inner`.
pub fn array_of(inner: impl Into<TypeDescriptor>) -> TypeDescriptor {
    TypeDescriptor::Array(Box::new(inner.into()))
}

// ─── Schema ──────────────────────────────────────────────────────────

/// Ordered mapping from field name to declared type.
///
/// Declaration order is the order fields are converted in, which fixes
/// which field is reported when several are invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, TypeDescriptor>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::insert`].
    pub fn field(mut self, name: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.insert(name, descriptor);
        self
    }

    /// Declare a field. Redeclaring a name replaces its descriptor but
    /// keeps its original position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> Option<TypeDescriptor> {
        self.fields.insert(name.into(), descriptor.into())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.fields.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, TypeDescriptor)> for Schema {
    fn from_iter<I: IntoIterator<Item = (N, TypeDescriptor)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (name, descriptor) in iter {
            schema.insert(name, descriptor);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructorError;
    use serde::Serialize;

    #[derive(Debug, PartialEq, Serialize)]
    struct Email(String);

    impl Construct for Email {
        type Error = ConstructorError;

        fn construct(raw: &Value) -> Result<Self, Self::Error> {
            let text = raw.to_text();
            if !text.contains('@') {
                return Err(ConstructorError::new("Invalid email"));
            }
            Ok(Self(text))
        }
    }

    #[test]
    fn test_descriptor_names() {
        assert_eq!(string().name(), "String");
        assert_eq!(number().name(), "Number");
        assert_eq!(optional(array_of(date())).name(), "Optional<Array<Date>>");
        assert_eq!(array_of(custom::<Email>()).name(), "Array<Email>");
    }

    #[test]
    fn test_arbitrary_nesting() {
        let d = array_of(array_of(optional(array_of(boolean()))));
        assert_eq!(d.depth(), 4);
        assert_eq!(d.name(), "Array<Array<Optional<Array<Boolean>>>>");
        assert!(!d.is_optional());
        assert!(optional(d).is_optional());
    }

    #[test]
    fn test_custom_type_of_constructs_custom_values() {
        let email = CustomType::of::<Email>();
        assert_eq!(email.name(), "Email");
        let value = email.construct(&Value::from("a@b.com")).unwrap();
        assert_eq!(value.as_custom::<Email>(), Some(&Email("a@b.com".into())));
        let err = email.construct(&Value::from("invalid")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");
    }

    #[test]
    fn test_custom_type_equality_is_by_constructor() {
        let a = CustomType::of::<Email>();
        let b = a.clone();
        let c = CustomType::of::<Email>();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_schema_preserves_declaration_order() {
        let schema = Schema::new()
            .field("zeta", string())
            .field("alpha", number())
            .field("mid", optional(boolean()));
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.get("alpha"), Some(&number()));
        assert!(!schema.contains("missing"));
    }

    #[test]
    fn test_schema_redeclare_keeps_position() {
        let mut schema = Schema::new().field("a", string()).field("b", string());
        let previous = schema.insert("a", number());
        assert_eq!(previous, Some(string()));
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
