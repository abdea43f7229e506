use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban board client")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// Path to taskboard.toml (default: user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Board service URL. Overrides taskboard.toml and TASKBOARD_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        fname: String,
        #[arg(long)]
        lname: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List, create, rename or delete boards
    Boards {
        #[command(subcommand)]
        command: Option<BoardsCommands>,
    },
    /// Inspect one board and manage its members
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Manage a board's columns
    Column {
        #[command(subcommand)]
        command: ColumnCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Tag tasks
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Show or watch notifications
    Notifications {
        #[command(subcommand)]
        command: Option<NotificationsCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum BoardsCommands {
    List,
    Create { name: String },
    Rename { board_id: String, name: String },
    /// Delete an empty board
    Delete { board_id: String },
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    /// Columns and tasks
    Show { board_id: String },
    Members { board_id: String },
    /// Add a member by email address
    Invite { board_id: String, email: String },
    AddMember { board_id: String, user_id: String },
    RemoveMember { board_id: String, user_id: String },
    /// Users who can still be invited
    Available {
        board_id: String,
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ColumnCommands {
    Add { board_id: String, name: String },
    Rename {
        board_id: String,
        column_id: String,
        name: String,
    },
    /// Delete a column and every task in it
    Delete { board_id: String, column_id: String },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    Add {
        board_id: String,
        column_id: String,
        name: String,
    },
    Rename {
        board_id: String,
        task_id: String,
        name: String,
    },
    /// Delete a task, its tags and its assignments
    Delete { board_id: String, task_id: String },
    Move {
        board_id: String,
        task_id: String,
        column_id: String,
    },
    /// Tags, assignees and assignable members
    Show { board_id: String, task_id: String },
    Assign {
        board_id: String,
        task_id: String,
        user_id: String,
    },
    Unassign {
        board_id: String,
        task_id: String,
        user_id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum TagCommands {
    Add {
        board_id: String,
        task_id: String,
        name: String,
    },
    Remove {
        board_id: String,
        task_id: String,
        tag_id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum NotificationsCommands {
    List,
    /// Mark a notification as read
    Read { notification_id: String },
    /// Poll until interrupted, printing the unread count when it changes
    Watch {
        /// Seconds between polls (default: from config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default taskboard.toml
    Init {
        #[arg(long)]
        force: bool,
    },
}

/// Install the global subscriber. The returned guard flushes the file
/// writer and must live until exit.
fn init_tracing(cli: &Cli) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard) = match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(writer))
            .init();
    }
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli)?;

    match &cli.command {
        Commands::Config { command } => {
            cmd::cmd_config(&cli, command.clone())?;
        }
        Commands::Login { email, password } => {
            cmd::cmd_login(&cli, email, password.clone()).await?;
        }
        Commands::Register {
            email,
            fname,
            lname,
            password,
        } => {
            cmd::cmd_register(&cli, email, fname, lname, password.clone()).await?;
        }
        Commands::Logout => cmd::cmd_logout(&cli)?,
        Commands::Whoami => cmd::cmd_whoami(&cli)?,
        Commands::Boards { command } => cmd::cmd_boards(&cli, command.clone()).await?,
        Commands::Board { command } => cmd::cmd_board(&cli, command.clone()).await?,
        Commands::Column { command } => cmd::cmd_column(&cli, command.clone()).await?,
        Commands::Task { command } => cmd::cmd_task(&cli, command.clone()).await?,
        Commands::Tag { command } => cmd::cmd_tag(&cli, command.clone()).await?,
        Commands::Notifications { command } => {
            cmd::cmd_notifications(&cli, command.clone()).await?
        }
    }

    Ok(())
}
