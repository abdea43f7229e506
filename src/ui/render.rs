//! Plain-text rendering of board state for the terminal.

use console::style;

use super::icons::{BOARD, COLUMN, TAG, TASK, UNREAD, USER};
use crate::board::identity::UserKeyed;
use crate::board::models::{Board, Column, Notification, Tag, UserRef};

fn id_suffix(id: impl std::fmt::Display) -> String {
    style(format!("#{}", id)).dim().to_string()
}

pub fn board_line(board: &Board) -> String {
    format!(
        "{}{} {}",
        BOARD,
        style(&board.board_name).bold(),
        id_suffix(&board.board_id)
    )
}

/// A column header followed by one indented line per task.
pub fn column_block(column: &Column) -> String {
    let mut out = format!(
        "{}{} {} ({} tasks)",
        COLUMN,
        style(&column.column_name).bold().cyan(),
        id_suffix(&column.column_id),
        column.tasks.len()
    );
    for task in &column.tasks {
        out.push_str(&format!(
            "\n    {}{} {}",
            TASK,
            task.task_name,
            id_suffix(&task.task_id)
        ));
    }
    out
}

pub fn user_line(user: &UserRef) -> String {
    let id = user
        .primary_user_id()
        .map(id_suffix)
        .unwrap_or_default();
    if user.display_name() == user.email {
        format!("{}{} {}", USER, user.email, id)
    } else {
        format!("{}{} <{}> {}", USER, user.display_name(), user.email, id)
    }
}

pub fn tag_line(tag: &Tag) -> String {
    format!("{}{} {}", TAG, tag.tag_name, id_suffix(&tag.tag_id))
}

pub fn notification_line(note: &Notification) -> String {
    let marker = if note.read {
        "  ".to_string()
    } else {
        style(UNREAD.to_string()).yellow().to_string()
    };
    let when = note
        .created_at
        .map(|ts| format!(" {}", style(ts.format("%Y-%m-%d %H:%M")).dim()))
        .unwrap_or_default();
    format!(
        "{}{} {}{}",
        marker,
        note.message,
        id_suffix(&note.notification_id),
        when
    )
}
