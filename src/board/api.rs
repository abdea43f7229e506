//! Typed endpoint wrappers.
//!
//! One method per service call; each builds the request body the service
//! expects and runs the response through the matching [`shape`] adapter.

use serde_json::{Value, json};
use tracing::debug;

use super::gateway::Gateway;
use super::identity::EntityId;
use super::models::{Board, Column, NewAccount, NewNotification, Notification, Tag, Task, UserRef};
use super::shape;
use crate::errors::ClientError;

impl Gateway {
    // -- Auth -------------------------------------------------------------

    pub async fn login_raw(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        self.post(
            "/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn register_account(&self, account: &NewAccount) -> Result<Value, ClientError> {
        self.post("/auth/register", account).await
    }

    // -- Boards -----------------------------------------------------------

    pub async fn list_boards(&self) -> Result<Vec<Board>, ClientError> {
        let path = "/boards";
        shape::boards(path, self.get(path).await?)
    }

    pub async fn create_board(&self, name: &str) -> Result<Value, ClientError> {
        self.post("/boards", &json!({ "board_name": name })).await
    }

    pub async fn rename_board(&self, board_id: &EntityId, name: &str) -> Result<Value, ClientError> {
        self.put(
            &format!("/boards/{}", board_id),
            &json!({ "board_name": name }),
        )
        .await
    }

    /// Delete a board. The service refuses while columns, tasks or members
    /// remain, which surfaces as `BoardHasDependents`.
    pub async fn delete_board(&self, board_id: &EntityId) -> Result<(), ClientError> {
        match self.delete(&format!("/boards/{}", board_id)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_integrity() => Err(ClientError::BoardHasDependents {
                board_id: board_id.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn board_detail(&self, board_id: &EntityId) -> Result<Board, ClientError> {
        let path = format!("/boards/{}", board_id);
        shape::board(&path, self.get(&path).await?)
    }

    /// The board detail and its membership relations from one request. The
    /// board is `None` for payloads that only carry members.
    pub async fn board_with_members(
        &self,
        board_id: &EntityId,
    ) -> Result<(Option<Board>, Vec<UserRef>), ClientError> {
        let path = format!("/boards/{}", board_id);
        let value = self.get(&path).await?;
        let board = shape::board(&path, value.clone()).ok();
        let members = shape::board_members(&path, value)?;
        Ok((board, members))
    }

    pub async fn list_users(&self) -> Result<Vec<UserRef>, ClientError> {
        let path = "/user";
        shape::users(path, self.get(path).await?)
    }

    // -- Membership -------------------------------------------------------

    pub async fn add_member(
        &self,
        board_id: &EntityId,
        user_id: &EntityId,
    ) -> Result<(), ClientError> {
        self.post(
            &format!("/board-member/{}/members", board_id),
            &json!({ "userId": user_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn remove_member(
        &self,
        board_id: &EntityId,
        user_id: &EntityId,
    ) -> Result<(), ClientError> {
        self.delete(&format!("/board-member/{}/members/{}", board_id, user_id))
            .await?;
        Ok(())
    }

    // -- Columns ----------------------------------------------------------

    pub async fn list_columns(&self, board_id: &EntityId) -> Result<Vec<Column>, ClientError> {
        let path = format!("/columns/board/{}", board_id);
        shape::columns(&path, self.get(&path).await?)
    }

    pub async fn create_column(
        &self,
        board_id: &EntityId,
        name: &str,
    ) -> Result<Column, ClientError> {
        let path = "/columns";
        let body = self
            .post(path, &json!({ "columnName": name, "boardId": board_id }))
            .await?;
        let mut column = shape::column(path, body)?;
        column.board_id.get_or_insert_with(|| board_id.clone());
        Ok(column)
    }

    pub async fn rename_column(&self, column_id: &EntityId, name: &str) -> Result<(), ClientError> {
        self.patch(
            "/columns",
            &json!({ "columnId": column_id, "columnName": name }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_column(&self, column_id: &EntityId) -> Result<(), ClientError> {
        self.delete(&format!("/columns/{}", column_id)).await?;
        Ok(())
    }

    // -- Tasks ------------------------------------------------------------

    pub async fn create_task(&self, column_id: &EntityId, name: &str) -> Result<Task, ClientError> {
        let path = "/tasks";
        let body = self
            .post(path, &json!({ "taskName": name, "columnId": column_id }))
            .await?;
        let mut task = shape::task(path, body)?;
        task.column_id.get_or_insert_with(|| column_id.clone());
        Ok(task)
    }

    pub async fn rename_task(&self, task_id: &EntityId, name: &str) -> Result<(), ClientError> {
        self.patch(
            &format!("/tasks/{}/name", task_id),
            &json!({ "taskName": name }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_task(&self, task_id: &EntityId) -> Result<(), ClientError> {
        self.delete(&format!("/tasks/{}", task_id)).await?;
        Ok(())
    }

    pub async fn move_task(
        &self,
        task_id: &EntityId,
        column_id: &EntityId,
    ) -> Result<(), ClientError> {
        self.patch(
            &format!("/tasks/{}/move", task_id),
            &json!({ "columnId": column_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn assign_task(&self, task_id: &EntityId, user_id: &EntityId) -> Result<(), ClientError> {
        self.patch(
            &format!("/tasks/{}/assign", task_id),
            &json!({ "userId": user_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn unassign_task(
        &self,
        task_id: &EntityId,
        user_id: &EntityId,
    ) -> Result<(), ClientError> {
        self.patch(
            &format!("/tasks/{}/unassign", task_id),
            &json!({ "userId": user_id }),
        )
        .await?;
        Ok(())
    }

    /// Assigned users from the task detail, or `None` when the payload
    /// carries no recognizable assignee list.
    pub async fn task_assignees(
        &self,
        task_id: &EntityId,
    ) -> Result<Option<Vec<UserRef>>, ClientError> {
        let path = format!("/tasks/{}", task_id);
        let assigned = shape::assignees(&path, self.get(&path).await?)?;
        if assigned.is_none() {
            debug!(task_id = %task_id, "Task detail carried no assignee list");
        }
        Ok(assigned)
    }

    // -- Tags -------------------------------------------------------------

    pub async fn list_tags(&self, task_id: &EntityId) -> Result<Vec<Tag>, ClientError> {
        let path = format!("/tags/task/{}", task_id);
        let mut tags = shape::tags(&path, self.get(&path).await?)?;
        for tag in &mut tags {
            tag.task_id.get_or_insert_with(|| task_id.clone());
        }
        Ok(tags)
    }

    pub async fn create_tag(&self, task_id: &EntityId, name: &str) -> Result<Tag, ClientError> {
        let path = "/tags";
        let body = self
            .post(path, &json!({ "name": name, "taskId": task_id }))
            .await?;
        let mut tag = shape::tag(path, body)?;
        tag.task_id.get_or_insert_with(|| task_id.clone());
        Ok(tag)
    }

    pub async fn delete_tag(&self, tag_id: &EntityId) -> Result<(), ClientError> {
        self.delete(&format!("/tags/{}", tag_id)).await?;
        Ok(())
    }

    // -- Notifications ----------------------------------------------------

    pub async fn user_notifications(
        &self,
        user_id: &EntityId,
    ) -> Result<Vec<Notification>, ClientError> {
        let path = format!("/notifications/user/{}", user_id);
        shape::notifications(&path, self.get(&path).await?)
    }

    pub async fn all_notifications(&self) -> Result<Vec<Notification>, ClientError> {
        let path = "/notifications";
        shape::notifications(path, self.get(path).await?)
    }

    pub async fn create_notification(&self, note: &NewNotification) -> Result<(), ClientError> {
        self.post("/notifications", note).await?;
        Ok(())
    }

    pub async fn mark_notification_read(&self, notification_id: &EntityId) -> Result<(), ClientError> {
        self.patch(
            &format!("/notifications/{}/read", notification_id),
            &json!({}),
        )
        .await?;
        Ok(())
    }
}
