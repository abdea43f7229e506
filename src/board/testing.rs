//! In-memory stand-in for the board service.
//!
//! `MockBackend` implements [`Transport`] over plain vectors, answering with
//! the same payload shapes the real service uses (wrapped board lists, nested
//! board detail, `{id, name}` tags, `readStatus` notifications) so the shape
//! adapters get exercised by every controller test.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::gateway::{ApiRequest, ApiResponse, Gateway, Method, Transport};
use super::identity::EntityId;
use super::models::UserRef;
use super::session::{Credentials, MemorySessionStore, SessionContext};
use crate::errors::ClientError;

pub const MOCK_PASSWORD: &str = "secret";

struct MockUser {
    id: i64,
    email: String,
    fname: String,
    lname: String,
    password: String,
}

struct MockColumn {
    id: i64,
    board_id: i64,
    name: String,
}

struct MockTask {
    id: i64,
    column_id: i64,
    name: String,
}

struct MockTag {
    id: i64,
    task_id: i64,
    name: String,
}

struct MockNotification {
    id: i64,
    user_id: i64,
    message: String,
    read: bool,
}

#[derive(Default)]
struct MockState {
    next_id: i64,
    users: Vec<MockUser>,
    boards: Vec<(i64, String)>,
    members: Vec<(i64, i64)>,
    columns: Vec<MockColumn>,
    tasks: Vec<MockTask>,
    tags: Vec<MockTag>,
    assignments: Vec<(i64, i64)>,
    notifications: Vec<MockNotification>,
    requests: Vec<ApiRequest>,
    failures: Vec<(Method, String, u16)>,
    fail_next_transport: bool,
    omit_login_token: bool,
    nested_assignees: bool,
    omit_assignees: bool,
}

impl MockState {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_json(user: &MockUser) -> Value {
        json!({
            "id": user.id,
            "email": user.email,
            "fname": user.fname,
            "lname": user.lname,
        })
    }

    fn task_json(task: &MockTask) -> Value {
        json!({
            "task_id": task.id,
            "task_name": task.name,
            "column_id": task.column_id,
        })
    }

    fn column_json(&self, column: &MockColumn) -> Value {
        let tasks: Vec<Value> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column.id)
            .map(Self::task_json)
            .collect();
        json!({
            "column_id": column.id,
            "column_name": column.name,
            "board_id": column.board_id,
            "tasks": tasks,
        })
    }

    fn delete_task_cascade(&mut self, task_id: i64) {
        self.tasks.retain(|t| t.id != task_id);
        self.tags.retain(|t| t.task_id != task_id);
        self.assignments.retain(|(t, _)| *t != task_id);
    }
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse { status, body }
}

fn message(status: u16, text: &str) -> ApiResponse {
    reply(status, json!({ "message": text }))
}

fn id_field(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    // -- Seeding ----------------------------------------------------------

    pub fn seed_user(&self, email: &str, fname: &str, lname: &str) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.users.push(MockUser {
                id,
                email: email.into(),
                fname: fname.into(),
                lname: lname.into(),
                password: MOCK_PASSWORD.into(),
            });
            id.into()
        })
    }

    pub fn seed_board(&self, name: &str) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.boards.push((id, name.into()));
            id.into()
        })
    }

    pub fn seed_member(&self, board: &EntityId, user: &EntityId) {
        self.with_state(|s| s.members.push((key(board), key(user))));
    }

    pub fn seed_column(&self, board: &EntityId, name: &str) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.columns.push(MockColumn {
                id,
                board_id: key(board),
                name: name.into(),
            });
            id.into()
        })
    }

    pub fn seed_task(&self, column: &EntityId, name: &str) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.tasks.push(MockTask {
                id,
                column_id: key(column),
                name: name.into(),
            });
            id.into()
        })
    }

    pub fn seed_tag(&self, task: &EntityId, name: &str) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.tags.push(MockTag {
                id,
                task_id: key(task),
                name: name.into(),
            });
            id.into()
        })
    }

    pub fn seed_assignment(&self, task: &EntityId, user: &EntityId) {
        self.with_state(|s| s.assignments.push((key(task), key(user))));
    }

    pub fn seed_notification(&self, user: &EntityId, text: &str, read: bool) -> EntityId {
        self.with_state(|s| {
            let id = s.id();
            s.notifications.push(MockNotification {
                id,
                user_id: key(user),
                message: text.into(),
                read,
            });
            id.into()
        })
    }

    // -- Behaviour switches -----------------------------------------------

    /// Answer `method path` with `status` until cleared.
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.with_state(|s| s.failures.push((method, path.to_string(), status)));
    }

    pub fn clear_failures(&self) {
        self.with_state(|s| s.failures.clear());
    }

    pub fn fail_next_transport(&self) {
        self.with_state(|s| s.fail_next_transport = true);
    }

    pub fn omit_login_token(&self) {
        self.with_state(|s| s.omit_login_token = true);
    }

    /// Serve task assignees as `{"assignedUsers": [[...]]}`.
    pub fn nest_assignees(&self) {
        self.with_state(|s| s.nested_assignees = true);
    }

    /// Serve task details without any assignee list.
    pub fn omit_assignees(&self) {
        self.with_state(|s| s.omit_assignees = true);
    }

    // -- Inspection -------------------------------------------------------

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.with_state(|s| s.requests.clone())
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.with_state(|s| s.requests.last().cloned())
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.with_state(|s| {
            s.requests
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        })
    }

    pub fn assigned_to(&self, task: &EntityId) -> Vec<EntityId> {
        let task = key(task);
        self.with_state(|s| {
            s.assignments
                .iter()
                .filter(|(t, _)| *t == task)
                .map(|(_, u)| EntityId::from(*u))
                .collect()
        })
    }

    pub fn notification_messages(&self, user: &EntityId) -> Vec<String> {
        let user = key(user);
        self.with_state(|s| {
            s.notifications
                .iter()
                .filter(|n| n.user_id == user)
                .map(|n| n.message.clone())
                .collect()
        })
    }

    pub fn task_exists(&self, task: &EntityId) -> bool {
        let task = key(task);
        self.with_state(|s| s.tasks.iter().any(|t| t.id == task))
    }

    pub fn board_exists(&self, board: &EntityId) -> bool {
        let board = key(board);
        self.with_state(|s| s.boards.iter().any(|(id, _)| *id == board))
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;

        if let Some((_, _, status)) = s
            .failures
            .iter()
            .find(|(m, p, _)| *m == request.method && *p == request.path)
        {
            return message(*status, "Injected failure");
        }

        let segments: Vec<&str> = request
            .path
            .trim_start_matches('/')
            .split('/')
            .filter(|seg| !seg.is_empty())
            .collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        if segments.first() != Some(&"auth") {
            let authorized = request
                .bearer
                .as_deref()
                .is_some_and(|t| t.starts_with("token-"));
            if !authorized {
                return message(401, "Unauthorized");
            }
        }

        let num = |i: usize| segments.get(i).and_then(|seg| seg.parse::<i64>().ok());

        match (request.method, segments.as_slice()) {
            // -- auth
            (Method::Post, ["auth", "login"]) => {
                let email = str_field(&body, "email");
                let password = body.get("password").and_then(Value::as_str).unwrap_or("");
                match s
                    .users
                    .iter()
                    .find(|u| u.email == email && u.password == password)
                {
                    Some(user) if s.omit_login_token => {
                        reply(200, json!({ "user": MockState::user_json(user) }))
                    }
                    Some(user) => reply(
                        200,
                        json!({
                            "accessToken": format!("token-{}", user.id),
                            "user": MockState::user_json(user),
                        }),
                    ),
                    None => message(400, "Invalid credentials"),
                }
            }
            (Method::Post, ["auth", "register"]) => {
                let email = str_field(&body, "email").to_string();
                if s.users.iter().any(|u| u.email == email) {
                    return message(409, "Email already registered");
                }
                let id = s.id();
                s.users.push(MockUser {
                    id,
                    email,
                    fname: str_field(&body, "fname").into(),
                    lname: str_field(&body, "lname").into(),
                    password: body
                        .get("password")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .into(),
                });
                message(201, "User registered")
            }

            // -- boards
            (Method::Get, ["boards"]) => {
                let boards: Vec<Value> = s
                    .boards
                    .iter()
                    .map(|(id, name)| json!({ "board_id": id, "board_name": name }))
                    .collect();
                reply(200, json!({ "boards": boards }))
            }
            (Method::Post, ["boards"]) => {
                let name = str_field(&body, "board_name").to_string();
                if name.is_empty() {
                    return message(400, "Board name is required");
                }
                let id = s.id();
                s.boards.push((id, name.clone()));
                reply(201, json!({ "board_id": id, "board_name": name }))
            }
            (Method::Get, ["boards", _]) => {
                let Some(board_id) = num(1) else {
                    return message(400, "Invalid board id");
                };
                let Some((_, name)) = s.boards.iter().find(|(id, _)| *id == board_id) else {
                    return message(404, "Board not found");
                };
                let members: Vec<Value> = s
                    .members
                    .iter()
                    .enumerate()
                    .filter(|(_, (b, _))| *b == board_id)
                    .map(|(row, (_, u))| json!({ "id": row + 1, "user_id": u, "board_id": board_id }))
                    .collect();
                reply(
                    200,
                    json!({ "board": {
                        "board_id": board_id,
                        "board_name": name,
                        "members": members,
                    }}),
                )
            }
            (Method::Put, ["boards", _]) => {
                let board_id = num(1).unwrap_or_default();
                let name = str_field(&body, "board_name").to_string();
                if name.is_empty() {
                    return message(400, "Board name is required");
                }
                match s.boards.iter_mut().find(|(id, _)| *id == board_id) {
                    Some(board) => {
                        board.1 = name.clone();
                        reply(200, json!({ "board_id": board_id, "board_name": name }))
                    }
                    None => message(404, "Board not found"),
                }
            }
            (Method::Delete, ["boards", _]) => {
                let board_id = num(1).unwrap_or_default();
                if !s.boards.iter().any(|(id, _)| *id == board_id) {
                    return message(404, "Board not found");
                }
                let has_columns = s.columns.iter().any(|c| c.board_id == board_id);
                let has_members = s.members.iter().any(|(b, _)| *b == board_id);
                if has_columns || has_members {
                    return reply(
                        500,
                        json!({ "error": "update or delete on table \"boards\" violates foreign key constraint" }),
                    );
                }
                s.boards.retain(|(id, _)| *id != board_id);
                message(200, "Board deleted")
            }

            // -- users and membership
            (Method::Get, ["user"]) => {
                let users: Vec<Value> = s.users.iter().map(MockState::user_json).collect();
                reply(200, Value::Array(users))
            }
            (Method::Post, ["board-member", _, "members"]) => {
                let board_id = num(1).unwrap_or_default();
                let Some(user_id) = id_field(&body, "userId") else {
                    return message(400, "userId is required");
                };
                if !s.users.iter().any(|u| u.id == user_id) {
                    return message(404, "User not found");
                }
                if s.members.contains(&(board_id, user_id)) {
                    return message(409, "User is already a member of this board");
                }
                s.members.push((board_id, user_id));
                message(201, "Member added")
            }
            (Method::Delete, ["board-member", _, "members", _]) => {
                let pair = (num(1).unwrap_or_default(), num(3).unwrap_or_default());
                if !s.members.contains(&pair) {
                    return message(404, "Member not found");
                }
                s.members.retain(|m| *m != pair);
                message(200, "Member removed")
            }

            // -- columns
            (Method::Get, ["columns", "board", _]) => {
                let board_id = num(2).unwrap_or_default();
                let columns: Vec<Value> = s
                    .columns
                    .iter()
                    .filter(|c| c.board_id == board_id)
                    .map(|c| s.column_json(c))
                    .collect();
                reply(200, Value::Array(columns))
            }
            (Method::Post, ["columns"]) => {
                let name = str_field(&body, "columnName").to_string();
                if name.is_empty() {
                    return message(400, "Column name is required");
                }
                let Some(board_id) = id_field(&body, "boardId") else {
                    return message(400, "boardId is required");
                };
                let id = s.id();
                s.columns.push(MockColumn {
                    id,
                    board_id,
                    name: name.clone(),
                });
                reply(
                    201,
                    json!({ "column_id": id, "column_name": name, "board_id": board_id }),
                )
            }
            (Method::Patch, ["columns"]) => {
                let column_id = id_field(&body, "columnId").unwrap_or_default();
                let name = str_field(&body, "columnName").to_string();
                if name.is_empty() {
                    return message(400, "Column name is required");
                }
                match s.columns.iter_mut().find(|c| c.id == column_id) {
                    Some(column) => {
                        column.name = name;
                        message(200, "Column updated")
                    }
                    None => message(404, "Column not found"),
                }
            }
            (Method::Delete, ["columns", _]) => {
                let column_id = num(1).unwrap_or_default();
                if !s.columns.iter().any(|c| c.id == column_id) {
                    return message(404, "Column not found");
                }
                let doomed: Vec<i64> = s
                    .tasks
                    .iter()
                    .filter(|t| t.column_id == column_id)
                    .map(|t| t.id)
                    .collect();
                for task_id in doomed {
                    s.delete_task_cascade(task_id);
                }
                s.columns.retain(|c| c.id != column_id);
                message(200, "Column deleted")
            }

            // -- tasks
            (Method::Post, ["tasks"]) => {
                let name = str_field(&body, "taskName").to_string();
                if name.is_empty() {
                    return message(400, "Task name is required");
                }
                let column_id = id_field(&body, "columnId").unwrap_or_default();
                if !s.columns.iter().any(|c| c.id == column_id) {
                    return message(404, "Column not found");
                }
                let id = s.id();
                let task = MockTask {
                    id,
                    column_id,
                    name,
                };
                let json = MockState::task_json(&task);
                s.tasks.push(task);
                reply(201, json)
            }
            (Method::Get, ["tasks", _]) => {
                let task_id = num(1).unwrap_or_default();
                let Some(task) = s.tasks.iter().find(|t| t.id == task_id) else {
                    return message(404, "Task not found");
                };
                let assigned: Vec<Value> = s
                    .assignments
                    .iter()
                    .filter(|(t, _)| *t == task_id)
                    .filter_map(|(_, u)| s.users.iter().find(|user| user.id == *u))
                    .map(|u| {
                        json!({
                            "user_id": u.id,
                            "email": u.email,
                            "fname": u.fname,
                            "lname": u.lname,
                        })
                    })
                    .collect();
                let mut json = MockState::task_json(task);
                if s.omit_assignees {
                    return reply(200, json);
                }
                json["assignedUsers"] = if s.nested_assignees {
                    json!([assigned])
                } else {
                    Value::Array(assigned)
                };
                reply(200, json)
            }
            (Method::Patch, ["tasks", _, "name"]) => {
                let task_id = num(1).unwrap_or_default();
                let name = str_field(&body, "taskName").to_string();
                if name.is_empty() {
                    return message(400, "Task name is required");
                }
                match s.tasks.iter_mut().find(|t| t.id == task_id) {
                    Some(task) => {
                        task.name = name;
                        message(200, "Task updated")
                    }
                    None => message(404, "Task not found"),
                }
            }
            (Method::Patch, ["tasks", _, "move"]) => {
                let task_id = num(1).unwrap_or_default();
                let Some(column_id) = id_field(&body, "columnId") else {
                    return message(400, "columnId is required");
                };
                if !s.columns.iter().any(|c| c.id == column_id) {
                    return message(404, "Column not found");
                }
                match s.tasks.iter_mut().find(|t| t.id == task_id) {
                    Some(task) => {
                        task.column_id = column_id;
                        message(200, "Task moved")
                    }
                    None => message(404, "Task not found"),
                }
            }
            (Method::Delete, ["tasks", _]) => {
                let task_id = num(1).unwrap_or_default();
                if !s.tasks.iter().any(|t| t.id == task_id) {
                    return message(404, "Task not found");
                }
                let has_tags = s.tags.iter().any(|t| t.task_id == task_id);
                let has_assignees = s.assignments.iter().any(|(t, _)| *t == task_id);
                if has_tags || has_assignees {
                    return reply(
                        500,
                        json!({ "error": "update or delete on table \"tasks\" violates foreign key constraint" }),
                    );
                }
                s.delete_task_cascade(task_id);
                message(200, "Task deleted")
            }
            (Method::Patch, ["tasks", _, "assign"]) => {
                let task_id = num(1).unwrap_or_default();
                let Some(user_id) = id_field(&body, "userId") else {
                    return message(400, "userId is required");
                };
                if !s.tasks.iter().any(|t| t.id == task_id) {
                    return message(404, "Task not found");
                }
                if !s.assignments.contains(&(task_id, user_id)) {
                    s.assignments.push((task_id, user_id));
                }
                message(200, "User assigned")
            }
            (Method::Patch, ["tasks", _, "unassign"]) => {
                let task_id = num(1).unwrap_or_default();
                let user_id = id_field(&body, "userId").unwrap_or_default();
                s.assignments.retain(|a| *a != (task_id, user_id));
                message(200, "User unassigned")
            }

            // -- tags
            (Method::Get, ["tags", "task", _]) => {
                let task_id = num(2).unwrap_or_default();
                let tags: Vec<Value> = s
                    .tags
                    .iter()
                    .filter(|t| t.task_id == task_id)
                    .map(|t| json!({ "id": t.id, "name": t.name }))
                    .collect();
                reply(200, Value::Array(tags))
            }
            (Method::Post, ["tags"]) => {
                let name = str_field(&body, "name").to_string();
                if name.is_empty() {
                    return message(400, "Tag name is required");
                }
                let task_id = id_field(&body, "taskId").unwrap_or_default();
                let id = s.id();
                s.tags.push(MockTag {
                    id,
                    task_id,
                    name: name.clone(),
                });
                reply(201, json!({ "id": id, "name": name, "task_id": task_id }))
            }
            (Method::Delete, ["tags", _]) => {
                let tag_id = num(1).unwrap_or_default();
                if !s.tags.iter().any(|t| t.id == tag_id) {
                    return message(404, "Tag not found");
                }
                s.tags.retain(|t| t.id != tag_id);
                message(200, "Tag deleted")
            }

            // -- notifications
            (Method::Get, ["notifications", "user", _]) => {
                let user_id = num(2).unwrap_or_default();
                let list: Vec<Value> = s
                    .notifications
                    .iter()
                    .filter(|n| n.user_id == user_id)
                    .map(|n| {
                        json!({
                            "notification_id": n.id,
                            "message": n.message,
                            "user_id": n.user_id,
                            "readStatus": n.read,
                            "created_at": "2026-03-01 09:30:00",
                        })
                    })
                    .collect();
                reply(200, Value::Array(list))
            }
            (Method::Get, ["notifications"]) => {
                let list: Vec<Value> = s
                    .notifications
                    .iter()
                    .map(|n| json!({ "id": n.id, "message": n.message, "read": n.read }))
                    .collect();
                reply(200, json!({ "notifications": list }))
            }
            (Method::Post, ["notifications"]) => {
                let Some(user_id) = id_field(&body, "userId") else {
                    return message(400, "userId is required");
                };
                let id = s.id();
                s.notifications.push(MockNotification {
                    id,
                    user_id,
                    message: str_field(&body, "message").into(),
                    read: false,
                });
                reply(201, json!({ "notification_id": id }))
            }
            (Method::Patch, ["notifications", _, "read"]) => {
                let id = num(1).unwrap_or_default();
                match s.notifications.iter_mut().find(|n| n.id == id) {
                    Some(n) => {
                        n.read = true;
                        message(200, "Marked as read")
                    }
                    None => message(404, "Notification not found"),
                }
            }

            _ => message(404, "Route not found"),
        }
    }
}

fn key(id: &EntityId) -> i64 {
    id.as_i64().expect("mock ids are numeric")
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let transport_down = self.with_state(|s| {
            s.requests.push(request.clone());
            std::mem::take(&mut s.fail_next_transport)
        });
        if transport_down {
            return Err(ClientError::Transport {
                path: request.path,
                message: "connection refused".into(),
            });
        }
        Ok(self.handle(&request))
    }
}

/// A session already holding a token the mock accepts.
pub fn logged_in_session(user_id: i64) -> SessionContext {
    let store = MemorySessionStore::with(Credentials {
        token: format!("token-{}", user_id),
        user: Some(UserRef {
            id: Some(user_id.into()),
            ..UserRef::default()
        }),
    });
    SessionContext::new(Arc::new(store)).unwrap()
}

pub fn gateway_for(backend: &Arc<MockBackend>, user_id: i64) -> Gateway {
    Gateway::new(backend.clone(), logged_in_session(user_id))
}
