//! CLI command definitions for doug.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the orchestration loop, executing tasks defined in tasks.yaml
    Run {
        /// Override agent_command from doug.yaml
        #[arg(long)]
        agent: Option<String>,

        /// Override build_system from doug.yaml (go|npm)
        #[arg(long)]
        build_system: Option<String>,

        /// Override max_retries from doug.yaml
        #[arg(long)]
        max_retries: Option<u32>,

        /// Override max_iterations from doug.yaml
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Override kb_enabled from doug.yaml
        #[arg(long)]
        kb_enabled: Option<bool>,
    },

    /// Scaffold a new doug project (doug.yaml, tasks.yaml, PRD.md, templates)
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,

        /// Build system to use (go|npm); auto-detected if not set
        #[arg(long)]
        build_system: Option<String>,
    },
}
