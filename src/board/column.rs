//! Inline editing state for one column.
//!
//! A `ColumnView` owns only its drafts. Every mutation is forwarded to the
//! owning [`BoardDetailView`], which holds the column and its tasks.

use super::board_detail::BoardDetailView;
use super::identity::EntityId;
use super::models::Task;
use crate::errors::ClientError;

#[derive(Debug, Clone)]
pub struct ColumnView {
    column_id: EntityId,
    rename_draft: Option<String>,
    task_draft: Option<String>,
}

impl ColumnView {
    pub fn new(column_id: EntityId) -> Self {
        Self {
            column_id,
            rename_draft: None,
            task_draft: None,
        }
    }

    pub fn column_id(&self) -> &EntityId {
        &self.column_id
    }

    pub fn tasks<'a>(&self, board: &'a BoardDetailView) -> &'a [Task] {
        board
            .column(&self.column_id)
            .map(|c| c.tasks.as_slice())
            .unwrap_or(&[])
    }

    // -- Rename -----------------------------------------------------------

    pub fn is_renaming(&self) -> bool {
        self.rename_draft.is_some()
    }

    /// Start editing, seeded with the current name.
    pub fn begin_rename(&mut self, board: &BoardDetailView) {
        let current = board
            .column(&self.column_id)
            .map(|c| c.column_name.clone())
            .unwrap_or_default();
        self.rename_draft = Some(current);
    }

    pub fn set_rename_draft(&mut self, text: &str) {
        self.rename_draft = Some(text.to_string());
    }

    pub fn cancel_rename(&mut self) {
        self.rename_draft = None;
    }

    /// Submit the draft. On failure the draft is kept for another attempt.
    pub async fn commit_rename(&mut self, board: &mut BoardDetailView) -> Result<(), ClientError> {
        let Some(draft) = self.rename_draft.as_deref() else {
            return Ok(());
        };
        board.rename_column(&self.column_id, draft).await?;
        self.rename_draft = None;
        Ok(())
    }

    // -- New task ---------------------------------------------------------

    pub fn is_adding_task(&self) -> bool {
        self.task_draft.is_some()
    }

    pub fn begin_task(&mut self) {
        self.task_draft = Some(String::new());
    }

    pub fn set_task_draft(&mut self, text: &str) {
        self.task_draft = Some(text.to_string());
    }

    pub fn cancel_task(&mut self) {
        self.task_draft = None;
    }

    pub async fn commit_task(
        &mut self,
        board: &mut BoardDetailView,
    ) -> Result<EntityId, ClientError> {
        let draft = self.task_draft.clone().unwrap_or_default();
        let task_id = board.add_task(&self.column_id, &draft).await?;
        self.task_draft = None;
        Ok(task_id)
    }

    // -- Forwarded ----------------------------------------------------------

    pub async fn delete(&self, board: &mut BoardDetailView) -> Result<(), ClientError> {
        board.delete_column(&self.column_id).await
    }

    /// Receive a task dropped onto this column.
    pub async fn drop_task(
        &self,
        board: &mut BoardDetailView,
        task_id: &EntityId,
    ) -> Result<(), ClientError> {
        board.move_task(task_id, &self.column_id).await
    }
}
