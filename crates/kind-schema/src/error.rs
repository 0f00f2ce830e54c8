//! Errors raised while loading schema documents and parsing type
//! expressions.

use thiserror::Error;

use kind_core::DefinitionError;

/// A type expression could not be parsed or resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The expression was empty or all whitespace.
    #[error("empty type expression")]
    Empty,

    /// A character that cannot start or continue a type at this position.
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedChar {
        /// Byte offset into the expression.
        offset: usize,
        /// The offending character.
        found: char,
    },

    /// The expression ended where more input was required.
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// Angle-bracket arguments given to a name that is not a wrapper.
    #[error("'{name}' does not take a type argument (only optional<T> and array<T> do)")]
    NotAWrapper {
        /// The name that was followed by `<`.
        name: String,
    },

    /// Wrappers nest deeper than the parser allows.
    #[error("type expression nests deeper than {limit} wrappers")]
    TooDeep {
        /// The maximum nesting depth.
        limit: usize,
    },

    /// The name is neither a primitive, an alias, nor a registered custom
    /// type.
    #[error("unknown type '{name}'")]
    UnknownType {
        /// The unresolved name.
        name: String,
    },
}

/// A schema document could not be loaded or turned into a factory.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path (or `<inline>`) of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A field's type expression is invalid.
    #[error("field '{field}': {source}")]
    InvalidField {
        /// The field whose type failed to parse or resolve.
        field: String,
        /// What went wrong.
        #[source]
        source: ExprError,
    },

    /// The document's fields and base fields could not form a factory.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
