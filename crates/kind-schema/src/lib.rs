//! # kind-schema — Declarative Schema Documents
//!
//! Declares record types as YAML or JSON documents and turns them into
//! [`kind_core::Factory`] values.
//!
//! ## Type Expressions (`expr`)
//!
//! Field types are written as text: `string`, `optional<number>`,
//! `array<date>`, or the postfix forms `number?` and `email[]`.
//! [`TypeExpr::parse`] produces an unresolved expression tree.
//!
//! ## Registry (`registry`)
//!
//! [`TypeRegistry`] resolves names to descriptors: the built-in
//! primitives, their aliases, and custom types registered by the
//! application.
//!
//! ## Documents (`document`)
//!
//! [`SchemaDocument`] is the serde model of a document. Load it with
//! [`SchemaDocument::load`] and build a factory with
//! [`SchemaDocument::build`] or [`SchemaDocument::build_with`].
//!
//! ## Crate Policy
//!
//! - Depends only on `kind-core` internally.
//! - Documents are a trust boundary: unknown keys and unresolvable types
//!   are rejected with the offending field named.

pub mod document;
pub mod error;
pub mod expr;
pub mod registry;

pub use document::{BaseDocument, SchemaDocument};
pub use error::{ExprError, SchemaError};
pub use expr::{TypeExpr, MAX_DEPTH};
pub use registry::TypeRegistry;
