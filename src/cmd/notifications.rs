//! Notification commands — `taskboard notifications [list|read|watch]`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use tokio::sync::Mutex;

use taskboard::board::notifications::DEFAULT_POLL_INTERVAL;
use taskboard::board::{NotificationFeed, NotificationPoller};
use taskboard::ui::icons::{BELL, CHECK};
use taskboard::ui::render;

use super::{App, parse_id};
use crate::{Cli, NotificationsCommands};

pub async fn cmd_notifications(cli: &Cli, command: Option<NotificationsCommands>) -> Result<()> {
    let app = App::authenticated(cli)?;
    let mut feed = NotificationFeed::new(app.gateway.clone());

    match command.unwrap_or(NotificationsCommands::List) {
        NotificationsCommands::List => {
            feed.refresh()
                .await
                .context("Failed to load notifications")?;
            println!(
                "{}{} unread of {}",
                BELL,
                style(feed.unread_count()).bold(),
                feed.notifications().len()
            );
            for note in feed.notifications() {
                println!("{}", render::notification_line(note));
            }
        }
        NotificationsCommands::Read { notification_id } => {
            let id = parse_id(&notification_id)?;
            feed.refresh()
                .await
                .context("Failed to load notifications")?;
            feed.mark_read(&id)
                .await
                .context("Failed to mark notification read")?;
            println!("{}Marked {} read; {} unread", CHECK, id, feed.unread_count());
        }
        NotificationsCommands::Watch { interval } => {
            let interval = match interval {
                Some(secs) => Duration::from_secs(secs),
                None => app.config.poll_interval,
            };
            let interval = if interval.is_zero() {
                DEFAULT_POLL_INTERVAL
            } else {
                interval
            };

            println!(
                "Watching notifications every {}s (Ctrl-C to stop)",
                interval.as_secs()
            );
            let poller = NotificationPoller::spawn(Arc::new(Mutex::new(feed)), interval);
            let mut unread = poller.unread();

            loop {
                tokio::select! {
                    changed = unread.changed() => {
                        if changed.is_err() {
                            // Poller exited, usually because the session expired.
                            break;
                        }
                        let count = *unread.borrow_and_update();
                        println!("{}{} unread", BELL, style(count).bold());
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            poller.stop().await;

            if !app.gateway.session().is_authenticated() {
                anyhow::bail!("Session expired. Run `taskboard login <email>` again.");
            }
        }
    }
    Ok(())
}
