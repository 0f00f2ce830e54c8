//! # Describe Subcommand
//!
//! Prints a schema document's factory name, extra-field policy, base type,
//! and every field with its resolved descriptor.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use kind_core::Factory;
use kind_schema::SchemaDocument;

use crate::schema::load_factory;

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema document (YAML, or JSON with a `.json` extension).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Accept custom type names as pass-through types.
    #[arg(long)]
    pub opaque_custom: bool,
}

/// Render the description of a built factory.
pub fn describe(document: &SchemaDocument, factory: &Factory, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{} (extra fields: {})", factory.name(), factory.extra_fields())?;
    if let Some(description) = &document.description {
        writeln!(out, "  {description}")?;
    }
    if let Some(base) = factory.base() {
        writeln!(out, "  base: {}", base.name())?;
    }
    let width = factory.schema().names().map(str::len).max().unwrap_or(0);
    writeln!(out, "  fields:")?;
    for (name, descriptor) in factory.schema().iter() {
        writeln!(out, "    {name:<width$}  {descriptor}")?;
    }
    Ok(())
}

/// Run the subcommand, writing the description to `out`.
///
/// # Errors
///
/// Fails when the schema document cannot be loaded or built.
pub fn run(args: &DescribeArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let (document, factory) = load_factory(&args.schema, args.opaque_custom)?;
    describe(&document, &factory, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kind_schema::TypeRegistry;

    #[test]
    fn test_describe_lists_fields_in_order() {
        let document = SchemaDocument::from_yaml_str(
            "name: Profile\ndescription: A profile\nextra_fields: drop\nbase:\n  name: Record\nfields:\n  name: string\n  tags: str[]?\n",
        )
        .unwrap();
        let factory = document.build(&TypeRegistry::new()).unwrap();
        let mut out = Vec::new();
        describe(&document, &factory, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Profile (extra fields: drop)\n  A profile\n  base: Record\n  fields:\n    name  String\n    tags  Optional<Array<String>>\n"
        );
    }
}
