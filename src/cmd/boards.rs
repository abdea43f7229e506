//! Board commands — `taskboard boards ...` and `taskboard board ...`.

use anyhow::{Context, Result};
use console::style;

use taskboard::board::BoardListView;
use taskboard::ui::icons::{CHECK, USER};
use taskboard::ui::render;

use super::{App, parse_id};
use crate::{BoardCommands, BoardsCommands, Cli};

pub async fn cmd_boards(cli: &Cli, command: Option<BoardsCommands>) -> Result<()> {
    let app = App::authenticated(cli)?;
    let mut list = BoardListView::new(app.gateway.clone());

    match command.unwrap_or(BoardsCommands::List) {
        BoardsCommands::List => {
            list.load().await.context("Failed to load boards")?;
            if list.boards().is_empty() {
                println!("No boards yet. Create one with `taskboard boards create <name>`.");
            }
            for board in list.boards() {
                println!("{}", render::board_line(board));
            }
        }
        BoardsCommands::Create { name } => {
            list.create(&name).await.context("Failed to create board")?;
            println!("{}Created board {}", CHECK, style(name.trim()).bold());
        }
        BoardsCommands::Rename { board_id, name } => {
            let id = parse_id(&board_id)?;
            list.rename(&id, &name)
                .await
                .context("Failed to rename board")?;
            println!("{}Renamed board {} to {}", CHECK, id, style(name.trim()).bold());
        }
        BoardsCommands::Delete { board_id } => {
            let id = parse_id(&board_id)?;
            if !app.confirm(&format!("Delete board {}?", id)) {
                println!("Cancelled");
                return Ok(());
            }
            list.delete(&id).await?;
            println!("{}Deleted board {}", CHECK, id);
        }
    }
    Ok(())
}

pub async fn cmd_board(cli: &Cli, command: BoardCommands) -> Result<()> {
    let app = App::authenticated(cli)?;

    match command {
        BoardCommands::Show { board_id } => {
            let view = app.board(&board_id).await?;
            println!("{}", render::board_line(view.board()));
            println!();
            if view.columns().is_empty() {
                println!("  (no columns)");
            }
            for column in view.columns() {
                println!("{}", render::column_block(column));
            }
            println!();
            println!("{}{} member(s)", USER, view.members().len());
        }
        BoardCommands::Members { board_id } => {
            let view = app.board(&board_id).await?;
            if view.members().is_empty() {
                println!("No members");
            }
            for member in view.members() {
                println!("{}", render::user_line(member));
            }
        }
        BoardCommands::Invite { board_id, email } => {
            let mut view = app.board(&board_id).await?;
            let user = view
                .invite_by_email(&email)
                .await
                .context("Failed to invite user")?;
            println!(
                "{}Added {} to {}",
                CHECK,
                user.display_name(),
                view.board().board_name
            );
        }
        BoardCommands::AddMember { board_id, user_id } => {
            let mut view = app.board(&board_id).await?;
            let user_id = parse_id(&user_id)?;
            view.add_member(&user_id)
                .await
                .context("Failed to add member")?;
            println!("{}Added user {}; board has {} member(s)", CHECK, user_id, view.members().len());
        }
        BoardCommands::RemoveMember { board_id, user_id } => {
            let mut view = app.board(&board_id).await?;
            let user_id = parse_id(&user_id)?;
            if !app.confirm(&format!("Remove user {} from this board?", user_id)) {
                println!("Cancelled");
                return Ok(());
            }
            view.remove_member(&user_id)
                .await
                .context("Failed to remove member")?;
            println!(
                "{}Removed user {}. Existing task assignments are kept.",
                CHECK, user_id
            );
        }
        BoardCommands::Available { board_id, search } => {
            let view = app.board(&board_id).await?;
            let available = view.available_invitees(&search);
            if available.is_empty() {
                println!("No users available to invite");
            }
            for user in &available {
                println!("{}", render::user_line(user));
            }
        }
    }
    Ok(())
}
