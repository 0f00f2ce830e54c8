//! # kind CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// kind — build validated records from schema documents.
///
/// Checks loosely-typed JSON input against a declared record type and
/// describes record types declared in YAML or JSON.
#[derive(Parser, Debug)]
#[command(name = "kind", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Construct instances from input records.
    Check(kind_cli::check::CheckArgs),
    /// Print a schema document's fields and types.
    Describe(kind_cli::describe::DescribeArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Check(args) => {
            kind_cli::check::run(&args, &mut stdout)?;
        }
        Commands::Describe(args) => {
            kind_cli::describe::run(&args, &mut stdout)?;
        }
    }

    Ok(())
}
