//! CLI entry point for `schemafix`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use schemafix::config::schema_set::SchemaSet;
use schemafix::output::driver::{self, RunOptions};
use schemafix::output::report;

#[derive(Parser)]
#[command(
    name = "schemafix",
    about = "Qualify table and type references in SQL and data-model files with their database schema"
)]
struct Cli {
    /// JSON schema-set configuration (defaults to the built-in platform layout)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the configured file paths are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Only process the named schema
    #[arg(long)]
    schema: Option<String>,

    /// Report pending rewrites without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Print per-rule diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let set = match &cli.config {
        Some(path) => match SchemaSet::from_file(path) {
            Ok(set) => set,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(2);
            }
        },
        None => SchemaSet::builtin(),
    };

    if let Some(name) = &cli.schema {
        if set.schema(name).is_none() {
            eprintln!("Unknown schema: {name}");
            process::exit(2);
        }
    }

    let options = RunOptions {
        root: cli.root.clone(),
        dry_run: cli.dry_run,
        schema: cli.schema.clone(),
    };

    let summary = match driver::process(&set, &options) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    if cli.verbose {
        for file in &summary.reports {
            for application in &file.applications {
                if application.rewrites > 0 {
                    eprintln!(
                        "{}: {} x{}",
                        file.path.display(),
                        application.rule,
                        application.rewrites
                    );
                }
            }
        }
    }

    print!("{}", report::build_summary(&summary, cli.dry_run));

    // A dry run that found pending rewrites signals attention via exit code.
    if cli.dry_run && summary.pending() {
        process::exit(1);
    }
}
