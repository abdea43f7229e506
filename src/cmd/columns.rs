//! Column commands — `taskboard column add|rename|delete`.

use anyhow::{Context, Result};
use console::style;

use taskboard::board::ColumnView;
use taskboard::ui::icons::CHECK;

use super::{App, parse_id};
use crate::{Cli, ColumnCommands};

pub async fn cmd_column(cli: &Cli, command: ColumnCommands) -> Result<()> {
    let app = App::authenticated(cli)?;

    match command {
        ColumnCommands::Add { board_id, name } => {
            let mut view = app.board(&board_id).await?;
            let id = view
                .add_column(&name)
                .await
                .context("Failed to add column")?;
            println!("{}Added column {} #{}", CHECK, style(name.trim()).bold(), id);
        }
        ColumnCommands::Rename {
            board_id,
            column_id,
            name,
        } => {
            let mut view = app.board(&board_id).await?;
            let mut column = ColumnView::new(parse_id(&column_id)?);
            column.begin_rename(&view);
            column.set_rename_draft(&name);
            column
                .commit_rename(&mut view)
                .await
                .context("Failed to rename column")?;
            println!("{}Renamed column {} to {}", CHECK, column.column_id(), style(name.trim()).bold());
        }
        ColumnCommands::Delete {
            board_id,
            column_id,
        } => {
            let mut view = app.board(&board_id).await?;
            let column = ColumnView::new(parse_id(&column_id)?);
            let count = column.tasks(&view).len();
            if !app.confirm(&format!(
                "Delete column {} and its {} task(s)?",
                column.column_id(),
                count
            )) {
                println!("Cancelled");
                return Ok(());
            }
            column
                .delete(&mut view)
                .await
                .context("Failed to delete column")?;
            println!("{}Deleted column {}", CHECK, column.column_id());
        }
    }
    Ok(())
}
