mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Resolve layered workflow, phase and document patterns from shipped and project YAML",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .strata/ or .git/)
    #[arg(long, global = true, env = "STRATA_ROOT")]
    root: Option<PathBuf>,

    /// Directory holding the shipped pattern set
    #[arg(long, global = true, env = "STRATA_SHIPPED_DIR")]
    shipped: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .strata/ with a config file and empty pattern directories
    Init,

    /// List shipped and project patterns
    List {
        /// workflows, phases, documents, or all
        #[arg(long = "type", short = 't', default_value = "all")]
        pattern_type: String,

        /// Include usage examples
        #[arg(long)]
        examples: bool,
    },

    /// Resolve a pattern and print the merged result
    Resolve {
        name: String,

        /// workflows, phases, or documents
        #[arg(long = "type", short = 't')]
        pattern_type: String,

        /// Print the resolution order instead of the merged config
        #[arg(long)]
        chain: bool,
    },

    /// Scaffold a project pattern file
    New {
        name: String,

        /// workflows, phases, or documents
        #[arg(long = "type", short = 't')]
        pattern_type: String,

        /// Patterns to extend (repeatable)
        #[arg(long)]
        extends: Vec<String>,

        /// One-line description
        #[arg(long)]
        description: Option<String>,
    },

    /// Parse every pattern and report broken files
    Validate,

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let ctx = cmd::Context {
        root,
        shipped: cli.shipped,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Init => cmd::init::run(&ctx),
        Commands::List {
            pattern_type,
            examples,
        } => cmd::list::run(&ctx, &pattern_type, examples),
        Commands::Resolve {
            name,
            pattern_type,
            chain,
        } => cmd::resolve::run(&ctx, &name, &pattern_type, chain),
        Commands::New {
            name,
            pattern_type,
            extends,
            description,
        } => cmd::new::run(&ctx, &name, &pattern_type, &extends, description.as_deref()),
        Commands::Validate => cmd::validate::run(&ctx),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
