//! # kind-cli — Schema Document Command-Line Interface
//!
//! ## Subcommands
//!
//! - `check` — build instances from input records and report failures
//! - `describe` — print a document's fields and resolved types
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `kind-schema` and `kind-core`.

pub mod check;
pub mod describe;
pub mod schema;
