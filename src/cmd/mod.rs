//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|----------------------------------------------------|
//! | `auth`          | `Login`, `Register`, `Logout`, `Whoami`            |
//! | `boards`        | `Boards`, `Board`                                  |
//! | `columns`       | `Column`                                           |
//! | `tasks`         | `Task`, `Tag`                                      |
//! | `notifications` | `Notifications`                                    |
//! | `config`        | `Config`                                           |

pub mod auth;
pub mod boards;
pub mod columns;
pub mod config;
pub mod notifications;
pub mod tasks;

pub use auth::{cmd_login, cmd_logout, cmd_register, cmd_whoami};
pub use boards::{cmd_board, cmd_boards};
pub use columns::cmd_column;
pub use config::cmd_config;
pub use notifications::cmd_notifications;
pub use tasks::{cmd_tag, cmd_task};

use anyhow::{Context, Result, bail};
use std::sync::Arc;

use taskboard::board::{
    BoardDetailView, EntityId, FileSessionStore, Gateway, HttpTransport, SessionContext,
};
use taskboard::config::TaskboardConfig;

use crate::Cli;

/// Everything a command needs to talk to the service.
pub struct App {
    pub config: TaskboardConfig,
    pub gateway: Gateway,
    pub yes: bool,
}

impl App {
    pub fn connect(cli: &Cli) -> Result<Self> {
        let config = TaskboardConfig::load(cli.config.clone(), cli.base_url.clone())?;
        let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
        let session = SessionContext::new(store).context("Failed to load stored session")?;
        let transport = HttpTransport::new(&config.base_url, config.timeout)
            .context("Failed to build HTTP client")?;
        let gateway = Gateway::new(Arc::new(transport), session);
        Ok(Self {
            config,
            gateway,
            yes: cli.yes,
        })
    }

    /// Connect and insist on a stored session.
    pub fn authenticated(cli: &Cli) -> Result<Self> {
        let app = Self::connect(cli)?;
        if !app.gateway.session().is_authenticated() {
            bail!("Not logged in. Run `taskboard login <email>` first.");
        }
        Ok(app)
    }

    /// Load a board with its columns and members.
    pub async fn board(&self, board_id: &str) -> Result<BoardDetailView> {
        let board_id = parse_id(board_id)?;
        BoardDetailView::fetch(self.gateway.clone(), board_id.clone())
            .await
            .with_context(|| format!("Failed to load board {}", board_id))
    }

    /// Ask before a destructive action unless `--yes` was given.
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn parse_id(raw: &str) -> Result<EntityId> {
    raw.parse::<EntityId>()
        .map_err(|e| anyhow::anyhow!("Invalid id '{}': {}", raw, e))
}

/// Password from the flag/env, or an interactive prompt.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password"),
    }
}
