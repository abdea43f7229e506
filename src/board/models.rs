use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{EntityId, UserKeyed};

/// A board as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub board_id: EntityId,
    #[serde(default)]
    pub board_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub column_id: EntityId,
    #[serde(default)]
    pub column_name: String,
    #[serde(default)]
    pub board_id: Option<EntityId>,
    /// Display order, not a server-enforced invariant.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn contains_task(&self, task_id: &EntityId) -> bool {
        self.tasks.iter().any(|t| &t.task_id == task_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub task_id: EntityId,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub column_id: Option<EntityId>,
    #[serde(default)]
    pub board_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub tag_id: EntityId,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub task_id: Option<EntityId>,
}

/// Any user-shaped record: a directory entry from `/user`, a membership
/// relation from a board, or an assignee on a task.
///
/// Which key is populated depends on the endpoint, so both are kept and
/// compared through [`crate::board::identity::same_user`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
}

impl UserRef {
    pub fn display_name(&self) -> String {
        let full = [self.fname.as_deref(), self.lname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }

    /// Case-insensitive match against email, first and last name.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.email.to_lowercase().contains(&term)
            || self
                .fname
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&term))
            || self
                .lname
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&term))
    }
}

impl UserKeyed for UserRef {
    fn user_id(&self) -> Option<&EntityId> {
        self.user_id.as_ref()
    }

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub notification_id: EntityId,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /notifications`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub message: String,
    pub user_id: EntityId,
    pub task_id: EntityId,
}

impl NewNotification {
    pub fn assignment(task: &Task, user_id: EntityId) -> Self {
        Self {
            message: format!("You have been assigned to task: {}", task.task_name),
            user_id,
            task_id: task.task_id.clone(),
        }
    }
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub fname: String,
    pub lname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, fname: Option<&str>, lname: Option<&str>) -> UserRef {
        UserRef {
            id: Some(1.into()),
            user_id: None,
            email: email.to_string(),
            fname: fname.map(str::to_string),
            lname: lname.map(str::to_string),
        }
    }

    #[test]
    fn display_name_joins_names() {
        let u = user("ada@example.com", Some("Ada"), Some("Lovelace"));
        assert_eq!(u.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let u = user("grace@example.com", None, Some(""));
        assert_eq!(u.display_name(), "grace@example.com");
    }

    #[test]
    fn search_is_case_insensitive_over_all_fields() {
        let u = user("ada@example.com", Some("Ada"), Some("Lovelace"));
        assert!(u.matches_search("LOVE"));
        assert!(u.matches_search("example"));
        assert!(u.matches_search("ad"));
        assert!(u.matches_search(""));
        assert!(!u.matches_search("turing"));
    }

    #[test]
    fn user_ref_omits_missing_keys_when_serialized() {
        let u = UserRef {
            user_id: Some(5.into()),
            ..UserRef::default()
        };
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["user_id"], 5);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn column_defaults_to_empty_task_list() {
        let column: Column =
            serde_json::from_str(r#"{"column_id": 1, "column_name": "To Do"}"#).unwrap();
        assert!(column.tasks.is_empty());
        assert!(!column.contains_task(&EntityId::from(1)));
    }

    #[test]
    fn assignment_notification_names_the_task() {
        let task = Task {
            task_id: 8.into(),
            task_name: "Write spec".into(),
            column_id: None,
            board_id: None,
        };
        let note = NewNotification::assignment(&task, 2.into());
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["message"], "You have been assigned to task: Write spec");
        assert_eq!(json["userId"], 2);
        assert_eq!(json["taskId"], 8);
    }
}
