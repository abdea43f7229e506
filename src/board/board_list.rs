//! Dashboard: the boards visible to the session user.

use tracing::{debug, info};

use super::board_detail::BoardDetailView;
use super::gateway::Gateway;
use super::identity::EntityId;
use super::models::Board;
use crate::errors::ClientError;

pub struct BoardListView {
    gateway: Gateway,
    boards: Vec<Board>,
}

fn required_name(name: &str) -> Result<&str, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput("Board name is required".into()));
    }
    Ok(name)
}

impl BoardListView {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            boards: Vec::new(),
        }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn find(&self, board_id: &EntityId) -> Option<&Board> {
        self.boards.iter().find(|b| &b.board_id == board_id)
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.boards = self.gateway.list_boards().await?;
        debug!(count = self.boards.len(), "Loaded boards");
        Ok(())
    }

    /// Create a board and refresh the list, since the create response is not
    /// guaranteed to carry the full board record.
    pub async fn create(&mut self, name: &str) -> Result<(), ClientError> {
        let name = required_name(name)?;
        self.gateway.create_board(name).await?;
        info!(board_name = name, "Created board");
        self.load().await
    }

    pub async fn rename(&mut self, board_id: &EntityId, name: &str) -> Result<(), ClientError> {
        let name = required_name(name)?;
        self.gateway.rename_board(board_id, name).await?;
        if let Some(board) = self.boards.iter_mut().find(|b| &b.board_id == board_id) {
            board.board_name = name.to_string();
        }
        Ok(())
    }

    /// Delete an empty board. A board with columns, tasks or members is left
    /// in the list and `BoardHasDependents` is returned.
    pub async fn delete(&mut self, board_id: &EntityId) -> Result<(), ClientError> {
        self.gateway.delete_board(board_id).await?;
        self.boards.retain(|b| &b.board_id != board_id);
        info!(board_id = %board_id, "Deleted board");
        Ok(())
    }

    /// Open a board, loading its columns and membership.
    pub async fn open(&self, board_id: &EntityId) -> Result<BoardDetailView, ClientError> {
        let Some(board) = self.find(board_id) else {
            return BoardDetailView::fetch(self.gateway.clone(), board_id.clone()).await;
        };
        let mut view = BoardDetailView::new(self.gateway.clone(), board.clone());
        view.load().await?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::testing::{MockBackend, gateway_for};
    use std::sync::Arc;

    #[tokio::test]
    async fn create_refetches_list() {
        let backend = Arc::new(MockBackend::new());
        let mut view = BoardListView::new(gateway_for(&backend, 1));

        view.create("  Sprint 1 ").await.unwrap();

        assert_eq!(view.boards().len(), 1);
        assert_eq!(view.boards()[0].board_name, "Sprint 1");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let backend = Arc::new(MockBackend::new());
        let mut view = BoardListView::new(gateway_for(&backend, 1));

        let err = view.create("   ").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn rename_updates_in_place() {
        let backend = Arc::new(MockBackend::new());
        let id = backend.seed_board("Old");
        let mut view = BoardListView::new(gateway_for(&backend, 1));
        view.load().await.unwrap();

        view.rename(&id, "New").await.unwrap();
        assert_eq!(view.find(&id).unwrap().board_name, "New");
    }

    #[tokio::test]
    async fn delete_with_dependents_keeps_board() {
        let backend = Arc::new(MockBackend::new());
        let id = backend.seed_board("Busy");
        backend.seed_column(&id, "To Do");
        let mut view = BoardListView::new(gateway_for(&backend, 1));
        view.load().await.unwrap();

        let err = view.delete(&id).await.unwrap_err();
        assert!(matches!(err, ClientError::BoardHasDependents { .. }));
        assert!(view.find(&id).is_some());
        assert!(backend.board_exists(&id));
    }

    #[tokio::test]
    async fn delete_empty_board_removes_it() {
        let backend = Arc::new(MockBackend::new());
        let id = backend.seed_board("Empty");
        let mut view = BoardListView::new(gateway_for(&backend, 1));
        view.load().await.unwrap();

        view.delete(&id).await.unwrap();
        assert!(view.boards().is_empty());
    }

    #[tokio::test]
    async fn open_loads_board_detail() {
        let backend = Arc::new(MockBackend::new());
        let id = backend.seed_board("Sprint 1");
        backend.seed_column(&id, "To Do");
        let view = BoardListView::new(gateway_for(&backend, 1));

        let detail = view.open(&id).await.unwrap();
        assert_eq!(detail.board().board_name, "Sprint 1");
        assert_eq!(detail.columns().len(), 1);
    }
}
