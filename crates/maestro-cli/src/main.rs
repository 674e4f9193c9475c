mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "maestro",
    about = "Schedule procedure timelines: per-actor task chains with shared starts for joint tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from maestro.yaml or .git/)
    #[arg(long, global = true, env = "MAESTRO_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log scheduling details to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the synchronized timeline of a procedure
    Schedule {
        /// Procedure file, or a name under the procedures directory
        procedure: String,

        /// Only show tasks this actor performs
        #[arg(long)]
        actor: Option<String>,

        /// Also write the timeline as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the actual duration of a procedure, overall and per actor
    Duration { procedure: String },

    /// List the actors filling roles in a procedure
    Actors { procedure: String },

    /// List the tasks an actor performs, in order
    Tasks {
        procedure: String,

        #[arg(long)]
        actor: String,
    },

    /// Print the procedure definition, or one of its task files, as loaded
    Definition {
        procedure: String,

        /// Print this task file's definition instead
        #[arg(long)]
        task: Option<String>,
    },

    /// Show which actors display under which column
    Columns {
        procedure: String,

        /// Include columns no actor lands in
        #[arg(long)]
        include_empty: bool,
    },

    /// Inspect and validate maestro.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
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

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Schedule {
            procedure,
            actor,
            output,
        } => cmd::schedule::run(
            &root,
            &procedure,
            actor.as_deref(),
            output.as_deref(),
            cli.json,
        ),
        Commands::Duration { procedure } => cmd::duration::run(&root, &procedure, cli.json),
        Commands::Actors { procedure } => cmd::actors::run(&root, &procedure, cli.json),
        Commands::Tasks { procedure, actor } => {
            cmd::tasks::run(&root, &procedure, &actor, cli.json)
        }
        Commands::Definition { procedure, task } => {
            cmd::definition::run(&root, &procedure, task.as_deref(), cli.json)
        }
        Commands::Columns {
            procedure,
            include_empty,
        } => cmd::columns::run(&root, &procedure, include_empty, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
