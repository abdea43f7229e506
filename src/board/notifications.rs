//! The session user's notifications, and the background poller that keeps
//! them fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gateway::Gateway;
use super::identity::EntityId;
use super::models::Notification;
use crate::errors::ClientError;

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub struct NotificationFeed {
    gateway: Gateway,
    notifications: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            notifications: Vec::new(),
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| !n.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }

    /// Fetch the session user's notifications. Without a session user this
    /// does nothing.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let Some(user_id) = self.gateway.session().user_id() else {
            debug!("No session user, skipping notification fetch");
            return Ok(());
        };
        self.notifications = self.gateway.user_notifications(&user_id).await?;
        Ok(())
    }

    /// Mark one notification read on the server, then locally.
    pub async fn mark_read(&mut self, notification_id: &EntityId) -> Result<(), ClientError> {
        self.gateway.mark_notification_read(notification_id).await?;
        if let Some(n) = self
            .notifications
            .iter_mut()
            .find(|n| &n.notification_id == notification_id)
        {
            n.read = true;
        }
        Ok(())
    }
}

/// Handle to a spawned polling task. Dropping the handle cancels the task.
pub struct NotificationPoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    unread: watch::Receiver<usize>,
}

impl NotificationPoller {
    /// Poll immediately, then every `interval`, until stopped or until the
    /// server rejects the session.
    pub fn spawn(feed: Arc<Mutex<NotificationFeed>>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let (unread_tx, unread) = watch::channel(0usize);
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    _ = token.cancelled() => break,
                    outcome = async {
                        let mut feed = feed.lock().await;
                        feed.refresh().await.map(|()| feed.unread_count())
                    } => outcome,
                };

                match outcome {
                    Ok(count) => {
                        debug!(unread = count, "Polled notifications");
                        unread_tx.send_replace(count);
                    }
                    Err(ClientError::Unauthorized) => {
                        info!("Session rejected, stopping notification poller");
                        break;
                    }
                    Err(e) => warn!(error = %e, "Notification poll failed"),
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
            unread,
        }
    }

    /// Unread count after each successful poll.
    pub fn unread(&self) -> watch::Receiver<usize> {
        self.unread.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Notification poller ended abnormally");
        }
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
