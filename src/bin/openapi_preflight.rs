//! OpenAPI Preflight CLI
//!
//! Report goes to stdout, diagnostics to stderr.
//! Exit 0 = passed, 1 = errors found, 2 = fatal.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use openapi_preflight::{render, LintConfig, LintPipeline, Outcome, ReportFormat};

const FATAL_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "openapi-preflight", version)]
#[command(about = "Validates OpenAPI documents against the integration platform's upload rules")]
#[command(after_help = "Requires a Spectral-compatible CLI: npm install -g @stoplight/spectral-cli")]
struct Cli {
    /// OpenAPI document to check (JSON)
    spec: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Linter configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule-definition file passed to the engine
    #[arg(long)]
    ruleset: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("openapi_preflight=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        // Bare invocation prints usage and succeeds.
        return match Cli::command().print_help() {
            Ok(()) => {
                println!();
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to print usage: {}", e);
                ExitCode::from(FATAL_EXIT)
            }
        };
    }

    let cli = Cli::parse();
    init_tracing();

    let Some(spec) = cli.spec else {
        eprintln!("Error: No spec file provided");
        return ExitCode::from(FATAL_EXIT);
    };

    let config = match &cli.config {
        Some(path) => match LintConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(FATAL_EXIT);
            }
        },
        None => LintConfig::default(),
    };
    let config = match cli.ruleset {
        Some(ruleset) => config.with_ruleset(ruleset),
        None => config,
    };

    let format = if cli.json { ReportFormat::Json } else { ReportFormat::Text };
    let pipeline = LintPipeline::from_config(config);
    let result = pipeline.run(&spec);

    match render(&result, &spec, pipeline.config().max_size_kb, format) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("Error: failed to render report: {}", e);
            return ExitCode::from(FATAL_EXIT);
        }
    }

    ExitCode::from(Outcome::of(&result).exit_code())
}
