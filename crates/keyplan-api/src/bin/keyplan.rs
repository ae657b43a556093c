//! keyplan: Command-line front end for the key layout modeler.
//!
//! Reads a modeling request document from a file or stdin and prints either
//! the full JSON response or a runnable CQL script.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use keyplan_api::{input::read_request, script::render_cql_script};
use keyplan_core::{BatchPolicy, ModelerConfig};
use keyplan_modeler::Modeler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "keyplan")]
#[command(author, version, about = "Access-pattern-driven key layout and DDL for wide-column tables")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate key layouts and DDL from a modeling request
    Generate {
        /// Request document (JSON), or "-" for stdin
        #[arg(short, long)]
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Skip invalid entities instead of failing the whole request
        #[arg(long)]
        isolate: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed modeling response
    Json,
    /// CREATE TABLE and CREATE INDEX statements
    Cql,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr so stdout stays a clean document.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            input,
            format,
            isolate,
        } => cmd_generate(&input, format, isolate)?,
    }

    Ok(())
}

fn cmd_generate(input: &str, format: OutputFormat, isolate: bool) -> keyplan_core::Result<()> {
    let request = read_request(input)?;

    let mut config = ModelerConfig::from_env();
    if isolate {
        config = config.with_batch_policy(BatchPolicy::IsolatePerEntity);
    }

    let response = Modeler::new(config).generate(&request)?;

    for rejected in &response.errors {
        eprintln!(
            "Skipped entity {} ({}): {}",
            rejected.index,
            rejected.entity_name.as_deref().unwrap_or("unnamed"),
            rejected.message
        );
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Cql => print!("{}", render_cql_script(&response)),
    }

    Ok(())
}
