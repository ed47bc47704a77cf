//! Defmark CLI - Markdown document processing core

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use defmark::commands;
use defmark::interface::Context;

#[derive(Parser)]
#[command(name = "defmark")]
#[command(author, version, about = "Markdown rendering with definition substitution", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Definition files, in precedence order (later wins)
    #[arg(short = 'd', long = "defs", value_name = "FILE", global = true, num_args = 1..)]
    definitions: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown document to HTML
    Render {
        /// Markdown document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a complete HTML page
        #[arg(long)]
        standalone: bool,
    },

    /// Print the flattened definitions
    Defs {
        /// Print as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// List references in a document
    Refs {
        /// Markdown document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only list references without a definition
        #[arg(short, long)]
        unresolved: bool,
    },

    /// Show the preview anchor for an editor line
    Locate {
        /// Markdown document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Editor line (1-based)
        #[arg(short, long)]
        line: usize,
    },

    /// Re-render whenever the document or definitions change
    Watch {
        /// Markdown document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Debounce delay in milliseconds (0 uses the configured value)
        #[arg(long, default_value = "0")]
        debounce: u64,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine working directory
    let base_dir = cli
        .directory
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Read configuration from file or use defaults
    let config = match cli.config {
        Some(ref path) => defmark::config::read_config_file(path),
        None => defmark::config::read_config(&base_dir),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = Context::new(config, base_dir);
    let definitions = cli.definitions;

    // Execute command
    let result = match cli.command {
        Commands::Render {
            file,
            output,
            standalone,
        } => {
            let options = commands::RenderOptions {
                file,
                output,
                standalone,
                definitions,
            };
            commands::render(&ctx, options)
        }

        Commands::Defs { json } => {
            let options = commands::DefsOptions { json, definitions };
            commands::defs(&ctx, options)
        }

        Commands::Refs { file, unresolved } => {
            let options = commands::RefsOptions {
                file,
                unresolved_only: unresolved,
                definitions,
            };
            commands::refs(&ctx, options)
        }

        Commands::Locate { file, line } => {
            let options = commands::LocateOptions {
                file,
                line,
                definitions,
            };
            commands::locate(&ctx, options)
        }

        Commands::Watch {
            file,
            output,
            debounce,
        } => {
            let options = commands::WatchOptions {
                file,
                output,
                debounce_ms: debounce,
                definitions,
            };
            commands::watch(&ctx, options)
        }

        Commands::Config => commands::show_config(&ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
