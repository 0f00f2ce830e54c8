//! # Check Subcommand
//!
//! Builds one instance per input record and prints each result: the
//! instance as pretty JSON, or the construction error.
//!
//! ```text
//! kind check --schema profile.yaml --input signups.json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use kind_core::{ConstructionError, ExtraFields, Factory, Instance};

use crate::schema::load_factory;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (YAML, or JSON with a `.json` extension).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Input records: one JSON object or an array of objects.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Override the document's policy for undeclared fields.
    #[arg(long, value_enum)]
    pub extra_fields: Option<ExtraFieldsArg>,

    /// Accept custom type names as pass-through types.
    #[arg(long)]
    pub opaque_custom: bool,
}

/// Command-line spelling of [`ExtraFields`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtraFieldsArg {
    Reject,
    Drop,
    PassThrough,
}

impl From<ExtraFieldsArg> for ExtraFields {
    fn from(arg: ExtraFieldsArg) -> Self {
        match arg {
            ExtraFieldsArg::Reject => Self::Reject,
            ExtraFieldsArg::Drop => Self::Drop,
            ExtraFieldsArg::PassThrough => Self::PassThrough,
        }
    }
}

/// Outcome counts of a check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub built: usize,
    pub failed: usize,
}

/// Split an input document into records.
pub fn records(input: serde_json::Value) -> Vec<serde_json::Value> {
    match input {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    }
}

/// Construct every record, preserving order.
pub fn check_records(
    factory: &Factory,
    records: Vec<serde_json::Value>,
) -> Vec<Result<Instance, ConstructionError>> {
    records
        .into_iter()
        .map(|record| factory.construct_json(record))
        .collect()
}

/// Write each outcome to `out` and count them.
pub fn report(
    results: &[Result<Instance, ConstructionError>],
    out: &mut impl Write,
) -> anyhow::Result<CheckSummary> {
    let mut summary = CheckSummary::default();
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(instance) => {
                summary.built += 1;
                writeln!(out, "{}", serde_json::to_string_pretty(instance)?)?;
            }
            Err(err) => {
                summary.failed += 1;
                writeln!(out, "record {index}: error: {err}")?;
            }
        }
    }
    Ok(summary)
}

/// Run the subcommand, writing results to `out`.
///
/// # Errors
///
/// Fails when the schema or input cannot be loaded, or when any record
/// failed to construct.
pub fn run(args: &CheckArgs, out: &mut impl Write) -> anyhow::Result<CheckSummary> {
    let (_, mut factory) = load_factory(&args.schema, args.opaque_custom)?;
    if let Some(policy) = args.extra_fields {
        factory = factory.with_extra_fields(policy.into());
    }

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input {}", args.input.display()))?;
    let input: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("input {} is not valid JSON", args.input.display()))?;

    let results = check_records(&factory, records(input));
    let summary = report(&results, out)?;
    tracing::info!(
        kind = factory.name(),
        built = summary.built,
        failed = summary.failed,
        "check finished"
    );
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} records failed",
            summary.failed,
            summary.built + summary.failed
        );
    }
    Ok(summary)
}
