//! The `medsky` binary runs the student-record pipeline from the command line.

use clap::{Parser, Subcommand};
use medsky::pipeline::DEFAULT_MAX_CONCURRENCY;
use medsky::schema::ValidationType;
use medsky::section::SectionKind;
use medsky_cli::commands::{self, RunOptions};
use medsky_cli::config::run_check;
use medsky_cli::{BackendKind, EnvConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the full pipeline on a student record PDF
    Run {
        /// PDF to parse, or a parsed text file with --from-text
        input: PathBuf,
        /// Treat the input as already-parsed text and skip PDF parsing
        #[arg(long)]
        from_text: bool,
        /// Output directory
        #[arg(long, default_value = "output")]
        out: PathBuf,
        /// Model identifier (defaults to MEDSKY_MODEL)
        #[arg(long)]
        model: Option<String>,
        /// Maximum validation calls in flight
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,
        #[arg(long, value_enum, default_value_t = BackendKind::Openai)]
        backend: BackendKind,
        /// Normalize whitespace and punctuation in sections before extraction
        #[arg(long)]
        clean: bool,
    },
    /// Splits a parsed text file into section files
    Segment {
        input: PathBuf,
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },
    /// Extracts one section of a text file and prints JSON
    Extract {
        /// creative, academic or detailed
        #[arg(value_parser = parse_section)]
        section: SectionKind,
        input: PathBuf,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, value_enum, default_value_t = BackendKind::Openai)]
        backend: BackendKind,
    },
    /// Validates a text file with one validation type and prints JSON
    Validate {
        /// blue_highlight, red_line, blue_line, black_line or red_check
        #[arg(value_parser = parse_validation_type)]
        validation_type: ValidationType,
        input: PathBuf,
        #[arg(long, default_value_t = 3)]
        max_retries: usize,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, value_enum, default_value_t = BackendKind::Openai)]
        backend: BackendKind,
    },
    /// Checks that the required environment variables are set
    Check,
}

fn parse_section(value: &str) -> Result<SectionKind, String> {
    value.parse()
}

fn parse_validation_type(value: &str) -> Result<ValidationType, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let env = EnvConfig::load();

    match cli.command {
        Commands::Run {
            input,
            from_text,
            out,
            model,
            max_concurrency,
            backend,
            clean,
        } => {
            let options = RunOptions {
                input,
                from_text,
                out,
                model,
                max_concurrency,
                backend,
                clean,
            };
            commands::run(&env, options).await?;
        }
        Commands::Segment { input, out } => {
            commands::segment(&input, &out)?;
        }
        Commands::Extract {
            section,
            input,
            model,
            backend,
        } => {
            let backend = env.backend(backend, model.as_deref())?;
            commands::extract(backend, section, &input).await?;
        }
        Commands::Validate {
            validation_type,
            input,
            max_retries,
            model,
            backend,
        } => {
            let backend = env.backend(backend, model.as_deref())?;
            commands::validate(backend, validation_type, &input, max_retries).await?;
        }
        Commands::Check => {
            run_check(&env)?;
        }
    }

    Ok(())
}
