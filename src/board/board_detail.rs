//! One board: its columns with nested tasks, and its membership.
//!
//! Mutations follow confirm-then-apply: the remote call must succeed before
//! the local cache changes, so a failure leaves the previous state intact.
//! Membership changes re-fetch the whole join instead of patching locally.

use tracing::{debug, info, warn};

use super::gateway::Gateway;
use super::identity::{EntityId, UserKeyed, excluding, intersecting, same_user};
use super::inflight::InFlight;
use super::models::{Board, Column, Task, UserRef};
use super::task::{TaskSignal, TaskView};
use crate::errors::ClientError;

pub struct BoardDetailView {
    gateway: Gateway,
    board: Board,
    columns: Vec<Column>,
    members: Vec<UserRef>,
    users: Vec<UserRef>,
    membership: InFlight,
    loading: bool,
}

fn required(kind: &str, name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput(format!("{} name is required", kind)));
    }
    Ok(name.to_string())
}

impl BoardDetailView {
    pub fn new(gateway: Gateway, board: Board) -> Self {
        Self {
            gateway,
            board,
            columns: Vec::new(),
            members: Vec::new(),
            users: Vec::new(),
            membership: InFlight::new(),
            loading: false,
        }
    }

    /// Open a board known only by id. The name arrives with the membership
    /// fetch, so `GET /boards/:id` is issued once.
    pub async fn fetch(gateway: Gateway, board_id: EntityId) -> Result<Self, ClientError> {
        let board = Board {
            board_id,
            board_name: String::new(),
        };
        let mut view = Self::new(gateway, board);
        view.load().await?;
        Ok(view)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_id(&self) -> &EntityId {
        &self.board.board_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: &EntityId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.column_id == column_id)
    }

    /// Board members, joined against the user directory.
    pub fn members(&self) -> &[UserRef] {
        &self.members
    }

    pub fn users(&self) -> &[UserRef] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_membership_busy(&self) -> bool {
        self.membership.is_active()
    }

    pub fn find_task(&self, task_id: &EntityId) -> Option<(&Column, &Task)> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .find(|t| &t.task_id == task_id)
                .map(|task| (column, task))
        })
    }

    // -- Loading ----------------------------------------------------------

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.load_all().await;
        self.loading = false;
        result
    }

    async fn load_all(&mut self) -> Result<(), ClientError> {
        self.refresh_columns().await?;
        self.refresh_members().await
    }

    pub async fn refresh_columns(&mut self) -> Result<(), ClientError> {
        let columns = self.gateway.list_columns(&self.board.board_id).await?;
        debug!(
            board_id = %self.board.board_id,
            columns = columns.len(),
            "Loaded columns"
        );
        self.columns = columns;
        Ok(())
    }

    /// Membership relations, then the user directory, then their intersection.
    /// The board name is refreshed from the same detail payload.
    pub async fn refresh_members(&mut self) -> Result<(), ClientError> {
        let (board, relations) = self.gateway.board_with_members(&self.board.board_id).await?;
        let users = self.gateway.list_users().await?;
        if let Some(board) = board
            && !board.board_name.is_empty()
        {
            self.board.board_name = board.board_name;
        }
        self.members = intersecting(&users, &relations);
        self.users = users;
        debug!(
            board_id = %self.board.board_id,
            members = self.members.len(),
            "Loaded members"
        );
        Ok(())
    }

    // -- Columns ----------------------------------------------------------

    pub async fn add_column(&mut self, name: &str) -> Result<EntityId, ClientError> {
        let name = required("Column", name)?;
        let mut column = self
            .gateway
            .create_column(&self.board.board_id, &name)
            .await?;
        column.tasks.clear();
        let id = column.column_id.clone();
        self.columns.push(column);
        Ok(id)
    }

    pub async fn rename_column(
        &mut self,
        column_id: &EntityId,
        name: &str,
    ) -> Result<(), ClientError> {
        let name = required("Column", name)?;
        self.gateway.rename_column(column_id, &name).await?;
        if let Some(column) = self.columns.iter_mut().find(|c| &c.column_id == column_id) {
            column.column_name = name;
        }
        Ok(())
    }

    /// Delete a column and its tasks, then re-fetch the columns aggregate.
    pub async fn delete_column(&mut self, column_id: &EntityId) -> Result<(), ClientError> {
        self.gateway.delete_column(column_id).await?;
        self.columns.retain(|c| &c.column_id != column_id);
        if let Err(e) = self.refresh_columns().await {
            warn!(error = %e, "Column deleted but re-fetch failed; keeping local view");
        }
        Ok(())
    }

    // -- Tasks ------------------------------------------------------------

    pub async fn add_task(
        &mut self,
        column_id: &EntityId,
        name: &str,
    ) -> Result<EntityId, ClientError> {
        let name = required("Task", name)?;
        if self.column(column_id).is_none() {
            return Err(ClientError::NotFound {
                kind: "column",
                id: column_id.to_string(),
            });
        }
        let mut task = self.gateway.create_task(column_id, &name).await?;
        task.board_id.get_or_insert_with(|| self.board.board_id.clone());
        let id = task.task_id.clone();
        if let Some(column) = self.columns.iter_mut().find(|c| &c.column_id == column_id) {
            column.tasks.push(task);
        }
        Ok(id)
    }

    pub async fn rename_task(&mut self, task_id: &EntityId, name: &str) -> Result<(), ClientError> {
        let name = required("Task", name)?;
        self.gateway.rename_task(task_id, &name).await?;
        self.rename_local(task_id, &name);
        Ok(())
    }

    pub async fn delete_task(&mut self, task_id: &EntityId) -> Result<(), ClientError> {
        self.gateway.delete_task(task_id).await?;
        self.remove_local(task_id);
        Ok(())
    }

    /// Move a task to another column. Moving onto its current column is a
    /// no-op that never reaches the server.
    pub async fn move_task(
        &mut self,
        task_id: &EntityId,
        to_column: &EntityId,
    ) -> Result<(), ClientError> {
        if self.column(to_column).is_none() {
            return Err(ClientError::NotFound {
                kind: "column",
                id: to_column.to_string(),
            });
        }
        if self
            .column(to_column)
            .is_some_and(|c| c.contains_task(task_id))
        {
            return Ok(());
        }

        self.gateway.move_task(task_id, to_column).await?;
        if !self.relocate(task_id, to_column) {
            debug!(task_id = %task_id, "Moved task not in local view, re-fetching columns");
            self.refresh_columns().await?;
        }
        Ok(())
    }

    /// Reconcile a change a [`TaskView`] already confirmed with the server.
    pub async fn apply_signal(&mut self, signal: TaskSignal) -> Result<(), ClientError> {
        match signal {
            TaskSignal::Moved { task_id, to, .. } => {
                if !self.relocate(&task_id, &to) {
                    self.refresh_columns().await?;
                }
            }
            TaskSignal::Renamed { task_id, name } => self.rename_local(&task_id, &name),
            TaskSignal::Deleted { task_id } => self.remove_local(&task_id),
        }
        Ok(())
    }

    fn rename_local(&mut self, task_id: &EntityId, name: &str) {
        for task in self
            .columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .filter(|t| &t.task_id == task_id)
        {
            task.task_name = name.to_string();
        }
    }

    fn remove_local(&mut self, task_id: &EntityId) {
        for column in &mut self.columns {
            column.tasks.retain(|t| &t.task_id != task_id);
        }
    }

    /// Pull the task out of every column and append it to `to_column`.
    /// Returns false when the task or the column is not in the local view.
    fn relocate(&mut self, task_id: &EntityId, to_column: &EntityId) -> bool {
        if !self.columns.iter().any(|c| &c.column_id == to_column) {
            return false;
        }
        let mut moved = None;
        for column in &mut self.columns {
            if let Some(pos) = column.tasks.iter().position(|t| &t.task_id == task_id) {
                moved.get_or_insert(column.tasks.remove(pos));
            }
        }
        let Some(mut task) = moved else {
            return false;
        };
        task.column_id = Some(to_column.clone());
        if let Some(column) = self.columns.iter_mut().find(|c| &c.column_id == to_column) {
            column.tasks.push(task);
        }
        true
    }

    /// A loaded [`TaskView`] for one of this board's tasks.
    pub async fn open_task(&self, task_id: &EntityId) -> Result<TaskView, ClientError> {
        let (_, task) = self.find_task(task_id).ok_or_else(|| ClientError::NotFound {
            kind: "task",
            id: task_id.to_string(),
        })?;
        let mut view = TaskView::new(self.gateway.clone(), task.clone());
        view.load().await?;
        Ok(view)
    }

    // -- Membership -------------------------------------------------------

    pub async fn add_member(&mut self, user_id: &EntityId) -> Result<(), ClientError> {
        let _guard = self.membership.begin("membership")?;
        self.gateway
            .add_member(&self.board.board_id, user_id)
            .await?;
        info!(board_id = %self.board.board_id, user_id = %user_id, "Added member");
        self.refresh_members().await
    }

    pub async fn remove_member(&mut self, user_id: &EntityId) -> Result<(), ClientError> {
        let _guard = self.membership.begin("membership")?;
        self.gateway
            .remove_member(&self.board.board_id, user_id)
            .await?;
        info!(board_id = %self.board.board_id, user_id = %user_id, "Removed member");
        self.refresh_members().await
    }

    /// Look an email up in the user directory and add that user.
    pub async fn invite_by_email(&mut self, email: &str) -> Result<UserRef, ClientError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::InvalidInput("Email is required".into()));
        }
        if self.users.is_empty() {
            self.refresh_members().await?;
        }
        let user = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind: "user",
                id: email.to_string(),
            })?;
        if self.members.iter().any(|m| same_user(m, &user)) {
            return Err(ClientError::InvalidInput(format!(
                "{} is already a member of this board",
                email
            )));
        }
        let user_id = user
            .primary_user_id()
            .cloned()
            .ok_or_else(|| ClientError::Decode {
                path: "/user".into(),
                message: format!("User {} has no id", email),
            })?;
        self.add_member(&user_id).await?;
        Ok(user)
    }

    /// Directory users who are not yet members, filtered by a
    /// case-insensitive search over email and names.
    pub fn available_invitees(&self, search: &str) -> Vec<UserRef> {
        excluding(&self.users, &self.members)
            .into_iter()
            .filter(|u| u.matches_search(search))
            .collect()
    }

    /// Members who can still be assigned to a task with `assigned` users.
    /// Recomputed on every call.
    pub fn assignable_members(&self, assigned: &[UserRef]) -> Vec<UserRef> {
        excluding(&self.members, assigned)
    }
}
