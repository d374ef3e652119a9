//! Tracker CLI - bulk operations for a project-tracking service.

mod commands;
mod config;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::{Term, style};
use tracing_subscriber::EnvFilter;
use tracker::{EntityAction, EntityKind};

use crate::commands::UsageError;
use crate::commands::list::OutputFormat;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(version)]
#[command(about = "Bulk operations for a project-tracking service")]
#[command(
    long_about = "Tracker deletes and archives issues, projects, initiatives, documents, \
labels and milestones through the service's GraphQL API. Every command accepts one \
identifier or many, read from arguments, a file, or stdin, and runs them concurrently \
with a live progress line and a summary of what failed."
)]
#[command(after_long_help = r#"EXAMPLES
    Delete one issue (asks for confirmation):
        $ tracker issue delete ENG-123

    Archive several issues at once:
        $ tracker issue archive ENG-1 ENG-2 ENG-3

    Delete every label listed in a file, without prompting:
        $ tracker label delete --bulk-file labels.txt --force

    Pipe identifiers from another command:
        $ cat ids.txt | tracker project archive --bulk-stdin -y --json

IDENTIFIERS
    UUIDs, issue keys (ENG-123), web URLs and names are accepted. Names are
    matched case-insensitively and must be unique.

CONFIGURATION
    Tracker reads configuration from:
      1. ~/.config/tracker/config.toml (or $XDG_CONFIG_HOME/tracker/config.toml)
      2. ./tracker.toml
      3. Environment variables (TRACKER_* prefix, e.g., TRACKER_BULK__CONCURRENCY)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    TRACKER_API_KEY     Personal API key
    TRACKER_API_URL     GraphQL endpoint (default: https://api.linear.app/graphql)
"#)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue operations
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Project operations
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Initiative operations
    Initiative {
        #[command(subcommand)]
        action: InitiativeAction,
    },
    /// Document operations
    Document {
        #[command(subcommand)]
        action: DocumentAction,
    },
    /// Issue label operations
    Label {
        #[command(subcommand)]
        action: LabelAction,
    },
    /// Project milestone operations
    Milestone {
        #[command(subcommand)]
        action: MilestoneAction,
    },
    /// Team operations
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options shared by every delete/archive command.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct BulkOptions {
    /// Read identifiers from a file (comma or whitespace separated)
    #[arg(long, value_name = "PATH")]
    pub bulk_file: Option<PathBuf>,

    /// Read identifiers from piped stdin
    #[arg(long)]
    pub bulk_stdin: bool,

    /// Don't ask for confirmation
    #[arg(short = 'y', long)]
    pub force: bool,

    /// Maximum concurrent operations (default from config or 5)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Don't draw the live progress line
    #[arg(long)]
    pub no_progress: bool,

    /// Plain ASCII output without colors or glyphs
    #[arg(long)]
    pub no_color: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Identifiers plus bulk options.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TargetArgs {
    /// Identifiers: UUIDs, keys, URLs or names
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    #[command(flatten)]
    pub bulk: BulkOptions,
}

#[derive(Subcommand)]
enum IssueAction {
    /// Delete (trash) one or more issues
    Delete(TargetArgs),
    /// Archive one or more issues
    Archive(TargetArgs),
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Delete one or more projects
    Delete(TargetArgs),
    /// Archive one or more projects
    Archive(TargetArgs),
}

#[derive(Subcommand)]
enum InitiativeAction {
    /// Delete one or more initiatives
    Delete(TargetArgs),
    /// Archive one or more initiatives
    Archive(TargetArgs),
}

#[derive(Subcommand)]
enum DocumentAction {
    /// Delete one or more documents
    Delete(TargetArgs),
}

#[derive(Subcommand)]
enum LabelAction {
    /// Delete one or more issue labels
    Delete(TargetArgs),
    /// List issue labels
    List {
        /// Only labels belonging to this team key
        #[arg(short, long)]
        team: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum MilestoneAction {
    /// Delete one or more project milestones
    Delete(TargetArgs),
}

#[derive(Subcommand)]
enum TeamAction {
    /// List teams
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

impl Commands {
    /// The entity, action and targets of a delete/archive command.
    fn into_target(self) -> Result<(EntityKind, EntityAction, TargetArgs), Self> {
        use EntityAction::{Archive, Delete};

        Ok(match self {
            Self::Issue { action } => match action {
                IssueAction::Delete(t) => (EntityKind::Issue, Delete, t),
                IssueAction::Archive(t) => (EntityKind::Issue, Archive, t),
            },
            Self::Project { action } => match action {
                ProjectAction::Delete(t) => (EntityKind::Project, Delete, t),
                ProjectAction::Archive(t) => (EntityKind::Project, Archive, t),
            },
            Self::Initiative { action } => match action {
                InitiativeAction::Delete(t) => (EntityKind::Initiative, Delete, t),
                InitiativeAction::Archive(t) => (EntityKind::Initiative, Archive, t),
            },
            Self::Document {
                action: DocumentAction::Delete(t),
            } => (EntityKind::Document, Delete, t),
            Self::Label {
                action: LabelAction::Delete(t),
            } => (EntityKind::Label, Delete, t),
            Self::Milestone {
                action: MilestoneAction::Delete(t),
            } => (EntityKind::Milestone, Delete, t),
            other => return Err(other),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Set up graceful shutdown handler (Ctrl+C)
    shutdown::setup_shutdown_handler();

    // Structured logging only when stdout is not a TTY; interactive sessions
    // get the status line instead. Logs go to stderr so piped output stays clean.
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("tracker=info,tracker_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            if e.is::<UsageError>() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Commands that need neither config nor network
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    match cli.command.into_target() {
        Ok((kind, action, target)) => {
            commands::bulk::handle_target(kind, action, target, &config).await
        }
        Err(Commands::Label {
            action: LabelAction::List { team, output },
        }) => {
            commands::list::handle_list_labels(team.as_deref(), output, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Err(Commands::Team {
            action: TeamAction::List { output },
        }) => {
            commands::list::handle_list_teams(output, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::SUCCESS),
    }
}
