//! Loading schema documents for the subcommands.

use std::path::Path;

use anyhow::Context;
use kind_core::{CustomType, Factory};
use kind_schema::{SchemaDocument, TypeExpr, TypeRegistry};

/// Load a document and build its factory.
///
/// Custom type names have no constructor on the command line. With
/// `opaque_custom` set, every name the built-in registry cannot resolve is
/// registered as a custom type that accepts its input unchanged; otherwise
/// such names fail the build.
pub fn load_factory(path: &Path, opaque_custom: bool) -> anyhow::Result<(SchemaDocument, Factory)> {
    let document = SchemaDocument::load(path)
        .with_context(|| format!("failed to load schema document {}", path.display()))?;
    let registry = if opaque_custom {
        opaque_registry(&document)
    } else {
        TypeRegistry::new()
    };
    let factory = document
        .build(&registry)
        .with_context(|| format!("invalid schema document {}", path.display()))?;
    Ok((document, factory))
}

/// A registry resolving every unknown name in `document` to a
/// pass-through custom type.
pub fn opaque_registry(document: &SchemaDocument) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for text in document.fields.values() {
        // Parse errors are reported when the factory is built.
        let Ok(expr) = TypeExpr::parse(text) else {
            continue;
        };
        let mut names = Vec::new();
        collect_names(&expr, &mut names);
        for name in names {
            if registry.lookup(&name).is_none() {
                tracing::debug!(name = %name, "registering opaque custom type");
                registry.register(CustomType::new(name, |raw| Ok(raw.clone())));
            }
        }
    }
    registry
}

fn collect_names(expr: &TypeExpr, names: &mut Vec<String>) {
    match expr {
        TypeExpr::Named(name) => names.push(name.clone()),
        TypeExpr::Optional(inner) | TypeExpr::Array(inner) => collect_names(inner, names),
    }
}
