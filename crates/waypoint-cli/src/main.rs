mod cmd;
mod console;
mod output;
mod root;
mod shell;
mod watch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use waypoint_core::types::AgentMode;

#[derive(Parser)]
#[command(
    name = "waypoint",
    about = "Resumable agent shell: classify requests, plan them, and checkpoint progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace directory (default: auto-detect from .waypoint/ or .git/)
    #[arg(long, short = 'w', global = true, env = "WAYPOINT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh session, replacing any existing one
    Init {
        /// What the session is for
        goal: String,

        /// Agent mode (default: from config, else IMPLEMENTER)
        #[arg(long, short = 'm')]
        mode: Option<AgentMode>,
    },

    /// Show the session state
    Status,

    /// Show the current plan and checkpoint progress
    Plan,

    /// Show where to pick up: last checkpoint, next action, last error
    Resume,

    /// Detect the agent mode and goal of a request without touching the session
    Classify {
        /// Request text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Classify a request, update the session, and run the execution pipeline
    Run {
        /// Request text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Only classify and update the session
        #[arg(long)]
        no_auto: bool,
    },

    /// Record a checkpoint attempt
    Checkpoint {
        /// Checkpoint id, e.g. CP2:execute
        id: String,

        /// Record a failed attempt
        #[arg(long)]
        failed: bool,
    },

    /// Diagnose the last recorded error
    Diagnose,

    /// List the agent modes and their profiles
    Modes,

    /// Interactive shell (the default)
    Shell {
        /// Session goal (creates the session if absent, else replaces the goal)
        #[arg(long)]
        goal: Option<String>,

        /// Agent mode for a new session
        #[arg(long, short = 'm')]
        mode: Option<AgentMode>,

        /// Do not run the pipeline after each request
        #[arg(long)]
        no_auto: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_workspace(cli.workspace.as_deref());

    let command = cli.command.unwrap_or(Commands::Shell {
        goal: None,
        mode: None,
        no_auto: false,
    });

    let result = match command {
        Commands::Init { goal, mode } => cmd::init::run(&root, &goal, mode, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Plan => cmd::plan::run(&root, cli.json),
        Commands::Resume => cmd::resume::run(&root, cli.json),
        Commands::Classify { text } => cmd::classify::run(&text.join(" "), cli.json),
        Commands::Run { text, no_auto } => cmd::run::run(&root, &text.join(" "), !no_auto, cli.json),
        Commands::Checkpoint { id, failed } => cmd::checkpoint::run(&root, &id, !failed, cli.json),
        Commands::Diagnose => cmd::diagnose::run(&root, cli.json),
        Commands::Modes => cmd::modes::run(cli.json),
        Commands::Shell {
            goal,
            mode,
            no_auto,
        } => cmd::shell::run(&root, goal.as_deref(), mode, no_auto),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
