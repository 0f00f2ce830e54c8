//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types raised while defining factories, converting
//! input values, constructing instances, and invoking instance behavior.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Conversion errors carry the field path, the expected descriptor name,
//!   and a preview of the observed value.
//! - Array element failures nest the element's own failure together with
//!   the failing index; the whole field fails.
//! - Custom constructor errors are kept as the `source` of the conversion
//!   error so callers can walk to the constructor's own message.

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// Boxed error returned by custom constructors, base initializers, and
/// other caller-supplied code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Maximum number of characters kept when previewing an observed value.
const PREVIEW_LIMIT: usize = 64;

// ─── Field Paths ─────────────────────────────────────────────────────

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field.
    Field(String),
    /// A position inside an array.
    Index(usize),
}

/// Location of a value inside the input record, rendered as `names[1]`
/// or `matrix[0][2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path (the record itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A path naming a single top-level field.
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Field(name.into())])
    }

    /// The path of element `index` below this path.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// The path of the named child field below this path.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    /// The individual segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// ─── Observed Values ─────────────────────────────────────────────────

/// The runtime type and a truncated rendering of a value that failed
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    /// Runtime type name (`string`, `number`, `array`, ...).
    pub type_name: String,
    /// Rendering of the value, truncated to 64 characters.
    pub preview: String,
}

impl Observed {
    /// Capture the type and preview of `value`.
    pub fn of(value: &Value) -> Self {
        Self {
            type_name: value.type_name().to_string(),
            preview: truncate(value.preview()),
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.preview)
    }
}

fn truncate(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(PREVIEW_LIMIT) {
        text.truncate(cut);
        text.push('…');
    }
    text
}

// ─── Conversion ──────────────────────────────────────────────────────

/// A present value could not be converted to its declared type.
#[derive(Error, Debug)]
#[error("invalid value for field '{path}' (expected {expected}): {failure}")]
pub struct ConversionError {
    /// Path of the field that failed.
    pub path: FieldPath,
    /// Display name of the descriptor the field was declared with.
    pub expected: String,
    /// What went wrong.
    #[source]
    pub failure: ConversionFailure,
}

impl ConversionError {
    /// Returns the innermost error in the source chain: a custom
    /// constructor's own error when one was involved, otherwise the
    /// innermost [`ConversionFailure`].
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// The index path through nested arrays to the failing element, if
    /// the failure happened inside an array.
    pub fn element_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut failure = &self.failure;
        while let ConversionFailure::ArrayElement { index, cause } = failure {
            indices.push(*index);
            failure = cause;
        }
        indices
    }
}

/// The reason a conversion failed.
#[derive(Error, Debug)]
pub enum ConversionFailure {
    /// Numeric parsing produced NaN.
    #[error("Cannot convert to number: got {observed}")]
    NotANumber {
        /// The rejected value.
        observed: Observed,
    },

    /// Date parsing produced an invalid date.
    #[error("Cannot convert to Date: got {observed}")]
    InvalidDate {
        /// The rejected value.
        observed: Observed,
    },

    /// An array-typed field received something other than an array.
    #[error("Expected array but got {}", .observed.type_name)]
    NotAnArray {
        /// The rejected value.
        observed: Observed,
    },

    /// One element of an array failed; no partial array is produced.
    #[error("Array element at index {index}: {cause}")]
    ArrayElement {
        /// Position of the failing element.
        index: usize,
        /// The element's own failure.
        #[source]
        cause: Box<ConversionFailure>,
    },

    /// A custom type's constructor rejected the value.
    #[error("{type_name} rejected {observed}: {cause}")]
    Rejected {
        /// Name of the custom type.
        type_name: String,
        /// The rejected value.
        observed: Observed,
        /// The constructor's own error.
        #[source]
        cause: BoxError,
    },
}

/// Ready-made error for custom constructors that only need a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConstructorError {
    message: String,
}

impl ConstructorError {
    /// Create a constructor error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the constructor.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ─── Construction ────────────────────────────────────────────────────

/// Building an instance failed. No partial instance is returned.
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// A schema field failed conversion.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The base type's initializer failed.
    #[error("base type '{base}' failed to initialize: {source}")]
    BaseInitialization {
        /// Name of the base type.
        base: String,
        /// The initializer's error.
        #[source]
        source: BoxError,
    },

    /// The input carried a field the schema does not declare and the
    /// factory rejects extra fields.
    #[error("field '{name}' is not declared by '{kind}'")]
    UnexpectedField {
        /// Name of the factory.
        kind: String,
        /// The undeclared field.
        name: String,
    },

    /// The input was not an object.
    #[error("'{kind}' must be constructed from an object, got {observed}")]
    NotAnObject {
        /// Name of the factory.
        kind: String,
        /// The rejected input.
        observed: Observed,
    },
}

// ─── Definition ──────────────────────────────────────────────────────

/// A definition could not be turned into a factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The same name is used by a schema field and a behavior member.
    #[error("member '{name}' is declared as both a field and a behavior")]
    DuplicateMember {
        /// The contested name.
        name: String,
    },

    /// A member was declared with an empty name.
    #[error("member names must not be empty")]
    EmptyName,
}

// ─── Behavior ────────────────────────────────────────────────────────

/// Invoking a behavior member on an instance failed.
#[derive(Error, Debug)]
pub enum BehaviorError {
    /// No field, accessor, or method carries this name.
    #[error("'{kind}' has no member named '{name}'")]
    UnknownMember {
        /// Name of the factory.
        kind: String,
        /// The requested member.
        name: String,
    },

    /// The member exists but is not a method.
    #[error("member '{name}' is not a method")]
    NotCallable {
        /// The requested member.
        name: String,
    },

    /// The member is an accessor without a setter.
    #[error("member '{name}' has a getter but no setter")]
    ReadOnly {
        /// The requested member.
        name: String,
    },

    /// A method or setter received an argument it cannot use.
    #[error("invalid argument for '{member}': {reason}")]
    InvalidArgument {
        /// The member that rejected the argument.
        member: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A behavior converted a value and the conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Any other failure raised by a behavior.
    #[error("{0}")]
    Failed(String),
}

impl BehaviorError {
    /// Shorthand for [`BehaviorError::InvalidArgument`].
    pub fn invalid_argument(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            member: member.into(),
            reason: reason.into(),
        }
    }
}
