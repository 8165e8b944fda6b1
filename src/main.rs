use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use doug::cli;

mod commands;
use commands::Commands;

#[derive(Parser)]
#[command(name = "doug")]
#[command(about = "doug is a task automation CLI")]
#[command(version)]
struct Cli {
    /// Path to the project root (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let work_dir = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Run {
            agent,
            build_system,
            max_retries,
            max_iterations,
            kb_enabled,
        } => cli::run::run_command(
            &work_dir,
            cli::run::RunOverrides {
                agent,
                build_system,
                max_retries,
                max_iterations,
                kb_enabled,
            },
        )?,
        Commands::Init {
            force,
            build_system,
        } => cli::init::init_command(&work_dir, force, build_system.as_deref())?,
    }

    Ok(())
}
