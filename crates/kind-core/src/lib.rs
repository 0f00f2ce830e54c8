//! # kind-core — Schema-Driven Instance Construction
//!
//! Builds validated, converted, behavior-attached records from
//! loosely-typed input. A record type is declared once as a [`Schema`]
//! (field name → [`TypeDescriptor`]) plus a [`BehaviorTable`] (methods and
//! accessors); a [`Factory`] then turns input records into [`Instance`]s.
//!
//! ```
//! use kind_core::{define_type, number, Definition, Value};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rectangle = define_type(
//!     "Rectangle",
//!     Definition::new()
//!         .field("width", number())
//!         .field("height", number())
//!         .getter("area", |this| {
//!             Value::from(this.number("width").unwrap_or(0.0) * this.number("height").unwrap_or(0.0))
//!         }),
//!     None,
//! )?;
//! let rect = rectangle.construct_json(json!({"width": "10", "height": 20}))?;
//! assert_eq!(rect.number("area"), Some(200.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Explicit descriptors.** Field types are a closed enum built through
//!    constructor functions. Nothing is inferred from a value's runtime
//!    shape.
//!
//! 2. **Two buckets, one namespace.** A [`Definition`] mixes fields and
//!    behaviors; [`Definition::split`] partitions them and rejects a name
//!    claimed by both.
//!
//! 3. **Shared behavior.** Every instance of a factory holds the same
//!    `Arc` to the schema and behavior table.
//!
//! 4. **Composition over inheritance.** A [`BaseType`] contributes state
//!    (via an initializer) and fallback behavior.
//!
//! 5. **Fail fast.** The first conversion failure aborts construction with a
//!    structured [`ConversionError`]; no partial instance escapes.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod behavior;
pub mod convert;
pub mod definition;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod instance;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use behavior::{Behavior, BehaviorKind, BehaviorTable};
pub use convert::{coerce, convert};
pub use definition::{Definition, Entry, EntryKind};
pub use descriptor::{
    array_of, boolean, custom, date, number, optional, string, Construct, CustomType, Primitive,
    Schema, TypeDescriptor,
};
pub use error::{
    BehaviorError, BoxError, ConstructionError, ConstructorError, ConversionError,
    ConversionFailure, DefinitionError, FieldPath, Observed, PathSegment,
};
pub use factory::{define_type, BaseType, ExtraFields, Factory};
pub use instance::Instance;
pub use value::{CustomValue, Fields, Value};
