//! Task and tag commands — `taskboard task ...` and `taskboard tag ...`.

use anyhow::{Context, Result};
use console::style;

use taskboard::board::{BoardDetailView, ColumnView, TaskView};
use taskboard::ui::icons::{CHECK, TAG, USER, WARN};
use taskboard::ui::render;

use super::{App, parse_id};
use crate::{Cli, TagCommands, TaskCommands};

async fn open_task(app: &App, board_id: &str, task_id: &str) -> Result<(BoardDetailView, TaskView)> {
    let board = app.board(board_id).await?;
    let task_id = parse_id(task_id)?;
    let task = board
        .open_task(&task_id)
        .await
        .with_context(|| format!("Failed to load task {}", task_id))?;
    Ok((board, task))
}

pub async fn cmd_task(cli: &Cli, command: TaskCommands) -> Result<()> {
    let app = App::authenticated(cli)?;

    match command {
        TaskCommands::Add {
            board_id,
            column_id,
            name,
        } => {
            let mut board = app.board(&board_id).await?;
            let mut column = ColumnView::new(parse_id(&column_id)?);
            column.begin_task();
            column.set_task_draft(&name);
            let id = column
                .commit_task(&mut board)
                .await
                .context("Failed to add task")?;
            println!("{}Added task {} #{}", CHECK, style(name.trim()).bold(), id);
        }
        TaskCommands::Rename {
            board_id,
            task_id,
            name,
        } => {
            let mut board = app.board(&board_id).await?;
            let task_id = parse_id(&task_id)?;
            board
                .rename_task(&task_id, &name)
                .await
                .context("Failed to rename task")?;
            println!("{}Renamed task {} to {}", CHECK, task_id, style(name.trim()).bold());
        }
        TaskCommands::Delete { board_id, task_id } => {
            let (mut board, mut task) = open_task(&app, &board_id, &task_id).await?;
            let prompt = format!(
                "Delete task '{}' with {} tag(s) and {} assignee(s)?",
                task.task().task_name,
                task.tags().len(),
                task.assigned().len()
            );
            if !app.confirm(&prompt) {
                println!("Cancelled");
                return Ok(());
            }
            let signal = task
                .delete_with_dependents()
                .await
                .context("Failed to delete task")?;
            board.apply_signal(signal).await?;
            println!("{}Deleted task {}", CHECK, task_id);
        }
        TaskCommands::Move {
            board_id,
            task_id,
            column_id,
        } => {
            let mut board = app.board(&board_id).await?;
            let task_id = parse_id(&task_id)?;
            let column = ColumnView::new(parse_id(&column_id)?);
            column
                .drop_task(&mut board, &task_id)
                .await
                .context("Failed to move task")?;
            let name = board
                .column(column.column_id())
                .map(|c| c.column_name.clone())
                .unwrap_or_default();
            println!("{}Moved task {} to {}", CHECK, task_id, style(name).bold());
        }
        TaskCommands::Show { board_id, task_id } => {
            let (board, task) = open_task(&app, &board_id, &task_id).await?;
            let column = board
                .find_task(&task.task().task_id)
                .map(|(c, _)| c.column_name.clone())
                .unwrap_or_default();
            println!(
                "{} {} in {}",
                style(&task.task().task_name).bold(),
                style(format!("#{}", task.task().task_id)).dim(),
                column
            );

            println!();
            println!("{}Tags:", TAG);
            if task.tags().is_empty() {
                println!("  (none)");
            }
            for tag in task.tags() {
                println!("  {}", render::tag_line(tag));
            }

            println!("{}Assigned:", USER);
            if task.assigned().is_empty() {
                println!("  (nobody)");
            }
            for user in task.assigned() {
                println!("  {}", render::user_line(user));
            }
            for stale in task.stale_assignees(board.members()) {
                println!(
                    "  {}{} is assigned but no longer a board member",
                    WARN,
                    stale.display_name()
                );
            }

            println!("Assignable:");
            for user in task.available_members(board.members()) {
                println!("  {}", render::user_line(&user));
            }
        }
        TaskCommands::Assign {
            board_id,
            task_id,
            user_id,
        } => {
            let (board, mut task) = open_task(&app, &board_id, &task_id).await?;
            let user_id = parse_id(&user_id)?;
            let result = task.assign(&user_id, board.members()).await;
            if let Some(status) = task.status() {
                println!("{}", status);
            }
            result.context("Failed to assign user")?;
        }
        TaskCommands::Unassign {
            board_id,
            task_id,
            user_id,
        } => {
            let (_, mut task) = open_task(&app, &board_id, &task_id).await?;
            let user_id = parse_id(&user_id)?;
            let result = task.unassign(&user_id).await;
            if let Some(status) = task.status() {
                println!("{}", status);
            }
            result.context("Failed to unassign user")?;
        }
    }
    Ok(())
}

pub async fn cmd_tag(cli: &Cli, command: TagCommands) -> Result<()> {
    let app = App::authenticated(cli)?;

    match command {
        TagCommands::Add {
            board_id,
            task_id,
            name,
        } => {
            let (_, mut task) = open_task(&app, &board_id, &task_id).await?;
            let id = task.add_tag(&name).await.context("Failed to add tag")?;
            println!("{}Tagged {} with {} #{}", CHECK, task.task().task_name, name.trim(), id);
        }
        TagCommands::Remove {
            board_id,
            task_id,
            tag_id,
        } => {
            let (_, mut task) = open_task(&app, &board_id, &task_id).await?;
            let tag_id = parse_id(&tag_id)?;
            task.remove_tag(&tag_id)
                .await
                .context("Failed to remove tag")?;
            println!("{}Removed tag {}; {} tag(s) left", CHECK, tag_id, task.tags().len());
        }
    }
    Ok(())
}
