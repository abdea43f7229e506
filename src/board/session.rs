//! Session ownership: the bearer token, who it belongs to, and what happens
//! when the server rejects it.
//!
//! A single [`SessionContext`] is created at start-up and injected into the
//! [`Gateway`](super::gateway::Gateway). It is the only thing that reads or
//! clears persisted credentials, and the only thing that publishes the
//! "go to login" navigation after a 401.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use super::identity::{EntityId, UserKeyed};
use super::models::UserRef;
use crate::errors::ClientError;

/// File name used for persisted credentials inside the config directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// What the session holds between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// Where the presentation layer should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Boards,
}

/// Persistent storage for credentials.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>>;
    fn save(&self, credentials: &Credentials) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Credentials kept as JSON in a single file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let credentials: Credentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let content =
            serde_json::to_string_pretty(credentials).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove session file: {}", self.path.display())),
        }
    }
}

/// In-process store, for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemorySessionStore {
    pub fn with(credentials: Credentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))? = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))? = None;
        Ok(())
    }
}

struct SessionInner {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Credentials>>,
    route_tx: watch::Sender<Route>,
}

/// Shared handle to the session. Cloning is cheap; all clones see the same
/// credentials and the same navigation channel.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl SessionContext {
    /// Load whatever credentials the store holds and start on the matching route.
    pub fn new(store: Arc<dyn SessionStore>) -> Result<Self> {
        let current = store.load()?;
        let route = if current.is_some() {
            Route::Boards
        } else {
            Route::Login
        };
        let (route_tx, _) = watch::channel(route);
        Ok(Self {
            inner: Arc::new(SessionInner {
                store,
                current: RwLock::new(current),
                route_tx,
            }),
        })
    }

    fn read(&self) -> Option<Credentials> {
        match self.inner.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&self, value: Option<Credentials>) {
        match self.inner.current.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|c| c.token)
    }

    pub fn user(&self) -> Option<UserRef> {
        self.read().and_then(|c| c.user)
    }

    pub fn user_id(&self) -> Option<EntityId> {
        self.user()
            .and_then(|u| u.primary_user_id().cloned())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn route(&self) -> Route {
        *self.inner.route_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.inner.route_tx.subscribe()
    }

    /// Persist fresh credentials after a successful login.
    pub fn establish(&self, credentials: Credentials) -> Result<(), ClientError> {
        self.inner
            .store
            .save(&credentials)
            .map_err(ClientError::Storage)?;
        self.write(Some(credentials));
        self.inner.route_tx.send_replace(Route::Boards);
        Ok(())
    }

    /// Explicit logout.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.write(None);
        self.inner.route_tx.send_replace(Route::Login);
        self.inner.store.clear().map_err(ClientError::Storage)
    }

    /// Tear down after the server answered 401, whoever made the call.
    ///
    /// Never fails: a store that cannot be cleared is logged, and the
    /// in-memory token is dropped regardless.
    pub fn expire(&self) {
        let had_session = self.read().is_some();
        self.write(None);
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear persisted session after 401");
        }
        if had_session {
            info!("Session rejected by server, returning to login");
        }
        self.inner.route_tx.send_replace(Route::Login);
    }
}
