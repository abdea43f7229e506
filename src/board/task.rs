//! A single task: its tags, its assignees, and moves out of its column.
//!
//! Assignment is optimistic-then-reconcile: after the server accepts an
//! assign, the user is appended locally and the task detail is re-fetched,
//! which always wins over the local patch.

use std::fmt;

use tracing::{debug, info, warn};

use super::gateway::Gateway;
use super::identity::{EntityId, UserKeyed, excluding, has_user_id, same_user};
use super::inflight::InFlight;
use super::models::{NewNotification, Tag, Task, UserRef};
use crate::errors::ClientError;

/// A change confirmed with the server that the owning board must mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskSignal {
    Moved {
        task_id: EntityId,
        from: Option<EntityId>,
        to: EntityId,
    },
    Renamed {
        task_id: EntityId,
        name: String,
    },
    Deleted {
        task_id: EntityId,
    },
}

/// Outcome of the last assign/unassign, for display next to the task.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentStatus {
    Assigned(String),
    Unassigned(String),
    Failed(String),
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Assigned(name) => write!(f, "{} assigned", name),
            AssignmentStatus::Unassigned(name) => write!(f, "{} unassigned", name),
            AssignmentStatus::Failed(reason) => write!(f, "Assignment failed: {}", reason),
        }
    }
}

pub struct TaskView {
    gateway: Gateway,
    task: Task,
    tags: Vec<Tag>,
    assigned: Vec<UserRef>,
    status: Option<AssignmentStatus>,
    assignment: InFlight,
}

impl TaskView {
    pub fn new(gateway: Gateway, task: Task) -> Self {
        Self {
            gateway,
            task,
            tags: Vec::new(),
            assigned: Vec::new(),
            status: None,
            assignment: InFlight::new(),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn assigned(&self) -> &[UserRef] {
        &self.assigned
    }

    pub fn status(&self) -> Option<&AssignmentStatus> {
        self.status.as_ref()
    }

    pub fn is_assignment_busy(&self) -> bool {
        self.assignment.is_active()
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.refresh_tags().await?;
        self.refresh_assigned().await
    }

    pub async fn refresh_tags(&mut self) -> Result<(), ClientError> {
        self.tags = self.gateway.list_tags(&self.task.task_id).await?;
        Ok(())
    }

    /// Replace the assigned set with the server's list. A detail payload
    /// without one leaves the current set in place.
    pub async fn refresh_assigned(&mut self) -> Result<(), ClientError> {
        let Some(assigned) = self.gateway.task_assignees(&self.task.task_id).await? else {
            return Ok(());
        };
        self.assigned = assigned;
        debug!(
            task_id = %self.task.task_id,
            assigned = self.assigned.len(),
            "Loaded assignees"
        );
        Ok(())
    }

    // -- Tags -------------------------------------------------------------

    pub async fn add_tag(&mut self, name: &str) -> Result<EntityId, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput("Tag name is required".into()));
        }
        let tag = self.gateway.create_tag(&self.task.task_id, name).await?;
        let id = tag.tag_id.clone();
        self.tags.push(tag);
        Ok(id)
    }

    pub async fn remove_tag(&mut self, tag_id: &EntityId) -> Result<(), ClientError> {
        self.gateway.delete_tag(tag_id).await?;
        self.tags.retain(|t| &t.tag_id != tag_id);
        if let Err(e) = self.refresh_tags().await {
            warn!(error = %e, "Tag removed but re-fetch failed; keeping local view");
        }
        Ok(())
    }

    // -- Assignment -------------------------------------------------------

    /// Assign a board member. `members` is the owning board's membership and
    /// is trusted as-is.
    pub async fn assign(
        &mut self,
        user_id: &EntityId,
        members: &[UserRef],
    ) -> Result<(), ClientError> {
        let _guard = self.assignment.begin("assignment")?;

        let Some(member) = members.iter().find(|m| has_user_id(*m, user_id)).cloned() else {
            let err = ClientError::NotAMember {
                user_id: user_id.clone(),
            };
            self.status = Some(AssignmentStatus::Failed(err.to_string()));
            return Err(err);
        };

        if let Err(e) = self.gateway.assign_task(&self.task.task_id, user_id).await {
            self.status = Some(AssignmentStatus::Failed(e.to_string()));
            return Err(e);
        }

        let note = NewNotification::assignment(&self.task, user_id.clone());
        if let Err(e) = self.gateway.create_notification(&note).await {
            warn!(user_id = %user_id, error = %e, "Assignment notification failed");
        }

        if !self.assigned.iter().any(|a| same_user(a, &member)) {
            self.assigned.push(member.clone());
        }
        self.status = Some(AssignmentStatus::Assigned(member.display_name()));
        info!(task_id = %self.task.task_id, user_id = %user_id, "Assigned user");

        if let Err(e) = self.refresh_assigned().await {
            warn!(error = %e, "Assigned but re-fetch failed; keeping local view");
        }
        Ok(())
    }

    pub async fn unassign(&mut self, user_id: &EntityId) -> Result<(), ClientError> {
        let _guard = self.assignment.begin("assignment")?;

        if let Err(e) = self.gateway.unassign_task(&self.task.task_id, user_id).await {
            self.status = Some(AssignmentStatus::Failed(e.to_string()));
            return Err(e);
        }

        let name = self
            .assigned
            .iter()
            .find(|a| has_user_id(*a, user_id))
            .map(UserRef::display_name)
            .unwrap_or_else(|| user_id.to_string());
        self.assigned.retain(|a| !has_user_id(a, user_id));
        self.status = Some(AssignmentStatus::Unassigned(name));
        info!(task_id = %self.task.task_id, user_id = %user_id, "Unassigned user");

        if let Err(e) = self.refresh_assigned().await {
            warn!(error = %e, "Unassigned but re-fetch failed; keeping local view");
        }
        Ok(())
    }

    /// Board members not yet assigned to this task.
    pub fn available_members(&self, members: &[UserRef]) -> Vec<UserRef> {
        excluding(members, &self.assigned)
    }

    /// Assignees who are no longer members of the board.
    pub fn stale_assignees(&self, members: &[UserRef]) -> Vec<UserRef> {
        self.assigned
            .iter()
            .filter(|a| !members.iter().any(|m| same_user(*a, m)))
            .cloned()
            .collect()
    }

    // -- Task mutations signalled to the board ----------------------------

    /// Move to `column_id`. Returns `None` when the task is already there.
    pub async fn move_to(&mut self, column_id: &EntityId) -> Result<Option<TaskSignal>, ClientError> {
        if self.task.column_id.as_ref() == Some(column_id) {
            return Ok(None);
        }
        self.gateway.move_task(&self.task.task_id, column_id).await?;
        let from = self.task.column_id.replace(column_id.clone());
        Ok(Some(TaskSignal::Moved {
            task_id: self.task.task_id.clone(),
            from,
            to: column_id.clone(),
        }))
    }

    pub async fn rename(&mut self, name: &str) -> Result<TaskSignal, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput("Task name is required".into()));
        }
        self.gateway.rename_task(&self.task.task_id, name).await?;
        self.task.task_name = name.to_string();
        Ok(TaskSignal::Renamed {
            task_id: self.task.task_id.clone(),
            name: name.to_string(),
        })
    }

    /// Unassign everyone, delete every tag, then delete the task itself.
    pub async fn delete_with_dependents(&mut self) -> Result<TaskSignal, ClientError> {
        self.load().await?;
        let task_id = self.task.task_id.clone();

        for user in self.assigned.clone() {
            if let Some(user_id) = user.primary_user_id() {
                self.gateway.unassign_task(&task_id, user_id).await?;
                self.assigned.retain(|a| !has_user_id(a, user_id));
            }
        }
        for tag in self.tags.clone() {
            self.gateway.delete_tag(&tag.tag_id).await?;
            self.tags.retain(|t| t.tag_id != tag.tag_id);
        }
        self.gateway.delete_task(&task_id).await?;
        info!(task_id = %task_id, "Deleted task");
        Ok(TaskSignal::Deleted { task_id })
    }
}
