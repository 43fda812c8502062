//! Sift command-line tool
//!
//! Lints C# sources for redundant filters and unsafe rethrows, and applies
//! the available fixes.

mod commands;
mod output;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Rule-based lint and rewrite for C# sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine events to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint C# files
    Lint {
        /// Files or directories to lint
        #[arg(default_value = ".")]
        paths: Vec<String>,
        /// Apply fixes and write the files back
        #[arg(long)]
        fix: bool,
        /// Fix to choose when a diagnostic offers several (repeatable, first wins)
        #[arg(long, value_name = "FIX_ID")]
        prefer: Vec<String>,
        /// Output format
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "json"])]
        format: String,
        /// Worker threads (default: sift.toml, then one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// When to use colors
        #[arg(long, value_name = "WHEN", value_parser = ["auto", "always", "never"])]
        color: Option<String>,
    },

    /// List available rules
    Rules {
        /// When to use colors
        #[arg(long, value_name = "WHEN", value_parser = ["auto", "always", "never"])]
        color: Option<String>,
    },
}

/// Install the global subscriber. `SIFT_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SIFT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Lint {
            paths,
            fix,
            prefer,
            format,
            jobs,
            color,
        } => commands::lint::execute(commands::lint::LintArgs {
            paths,
            fix,
            prefer,
            format,
            jobs,
            color,
        }),
        Commands::Rules { color } => commands::rules::execute(color.as_deref()),
    }
}
