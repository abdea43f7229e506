//! Response-shape adapters, one per endpoint family.
//!
//! The service wraps, nests and renames fields differently per endpoint.
//! Each function here takes the raw JSON body and returns the typed model, so
//! view controllers never inspect payload layout themselves.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::models::{Board, Column, Notification, Tag, Task, UserRef};
use crate::errors::ClientError;

/// Keys under which a task detail payload may carry its assignees, in the
/// order they are tried.
const ASSIGNEE_KEYS: &[&str] = &[
    "assignedUsers",
    "assigned_users",
    "members",
    "assignees",
    "users",
];

const READ_MARKERS: &[&str] = &["read", "readStatus", "is_read"];

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Move the first present alias into `primary` unless `primary` is already set.
fn promote_key(obj: &mut Map<String, Value>, primary: &str, aliases: &[&str]) {
    if obj.get(primary).is_some_and(|v| !v.is_null()) {
        return;
    }
    for alias in aliases {
        if let Some(value) = obj.remove(*alias)
            && !value.is_null()
        {
            obj.insert(primary.to_string(), value);
            return;
        }
    }
}

fn normalize_objects(items: &mut [Value], f: impl Fn(&mut Map<String, Value>)) {
    for item in items {
        if let Value::Object(obj) = item {
            f(obj);
        }
    }
}

/// The array at `value`, or at `value[key]`; anything else is an empty list.
fn list_at(path: &str, value: Value, key: Option<&str>) -> Vec<Value> {
    let candidate = match (value, key) {
        (Value::Array(items), _) => return items,
        (Value::Object(mut obj), Some(key)) => obj.remove(key).unwrap_or(Value::Null),
        (other, _) => other,
    };
    match candidate {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!(path, kind = json_kind(&other), "Expected a list, treating as empty");
            Vec::new()
        }
    }
}

/// Unwrap `{"<key>": {...}}` into the inner object.
fn unwrap_object(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut obj) if obj.get(key).is_some_and(Value::is_object) => {
            obj.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Boards ───────────────────────────────────────────────────────────

fn normalize_board(obj: &mut Map<String, Value>) {
    promote_key(obj, "board_id", &["id", "boardId"]);
    promote_key(obj, "board_name", &["name", "boardName"]);
}

pub fn boards(path: &str, value: Value) -> Result<Vec<Board>, ClientError> {
    let mut items = list_at(path, value, Some("boards"));
    normalize_objects(&mut items, normalize_board);
    decode(path, Value::Array(items))
}

pub fn board(path: &str, value: Value) -> Result<Board, ClientError> {
    let mut value = unwrap_object(value, "board");
    if let Value::Object(obj) = &mut value {
        normalize_board(obj);
    }
    decode(path, value)
}

/// A relation row's own `id` is the membership key, not a user key. Keep
/// only `user_id`, falling back to `id` for rows that carry nothing else.
fn normalize_relation(obj: &mut Map<String, Value>) {
    promote_key(obj, "user_id", &["userId"]);
    let row_id = obj.remove("id");
    if obj.get("user_id").is_none_or(Value::is_null)
        && let Some(id) = row_id
    {
        obj.insert("user_id".into(), id);
    }
}

/// Membership relation records from `GET /boards/:id`.
///
/// The detail endpoint nests them under `board.members`; an older variant
/// returns them at the top level.
pub fn board_members(path: &str, value: Value) -> Result<Vec<UserRef>, ClientError> {
    let value = unwrap_object(value, "board");
    let mut items = list_at(path, value, Some("members"));
    normalize_objects(&mut items, normalize_relation);
    decode(path, Value::Array(items))
}

pub fn users(path: &str, value: Value) -> Result<Vec<UserRef>, ClientError> {
    let items = list_at(path, value, Some("users"));
    decode(path, Value::Array(items))
}

// ── Columns and tasks ────────────────────────────────────────────────

fn normalize_task(obj: &mut Map<String, Value>) {
    promote_key(obj, "task_id", &["id", "taskId"]);
    promote_key(obj, "task_name", &["name", "taskName"]);
    promote_key(obj, "column_id", &["columnId"]);
}

fn normalize_column(obj: &mut Map<String, Value>) {
    promote_key(obj, "column_id", &["id", "columnId"]);
    promote_key(obj, "column_name", &["name", "columnName"]);
    promote_key(obj, "board_id", &["boardId"]);
    match obj.get_mut("tasks") {
        Some(Value::Array(tasks)) => normalize_objects(tasks, normalize_task),
        _ => {
            obj.insert("tasks".to_string(), Value::Array(Vec::new()));
        }
    }
}

pub fn columns(path: &str, value: Value) -> Result<Vec<Column>, ClientError> {
    let mut items = list_at(path, value, Some("columns"));
    normalize_objects(&mut items, normalize_column);
    decode(path, Value::Array(items))
}

pub fn column(path: &str, value: Value) -> Result<Column, ClientError> {
    let mut value = unwrap_object(value, "column");
    if let Value::Object(obj) = &mut value {
        normalize_column(obj);
    }
    decode(path, value)
}

pub fn task(path: &str, value: Value) -> Result<Task, ClientError> {
    let mut value = unwrap_object(value, "task");
    if let Value::Object(obj) = &mut value {
        normalize_task(obj);
    }
    decode(path, value)
}

/// Assigned users from a task detail payload.
///
/// Returns `None` when the payload carries no recognizable assignee list, so
/// callers can keep their current state instead of wiping it. A list nested
/// one level deep (`[[{..}, {..}]]`) is flattened.
pub fn assignees(path: &str, value: Value) -> Result<Option<Vec<UserRef>>, ClientError> {
    let Value::Object(mut obj) = value else {
        return Ok(None);
    };
    if let Some(Value::Object(inner)) = obj.remove("task") {
        obj.extend(inner);
    }
    let Some(raw) = ASSIGNEE_KEYS.iter().find_map(|key| match obj.remove(*key) {
        Some(list @ Value::Array(_)) => Some(list),
        // The primary key present with a non-list value means "nobody".
        Some(_) if *key == "assignedUsers" => Some(Value::Array(Vec::new())),
        _ => None,
    }) else {
        return Ok(None);
    };

    let Value::Array(items) = raw else {
        return Ok(None);
    };
    let flattened: Vec<Value> = if items.first().is_some_and(Value::is_array) {
        items
            .into_iter()
            .flat_map(|item| match item {
                Value::Array(inner) => inner,
                other => vec![other],
            })
            .collect()
    } else {
        items
    };
    decode(path, Value::Array(flattened)).map(Some)
}

// ── Tags ─────────────────────────────────────────────────────────────

fn normalize_tag(obj: &mut Map<String, Value>) {
    promote_key(obj, "tag_id", &["id", "tagId"]);
    promote_key(obj, "tag_name", &["name", "tagName"]);
    promote_key(obj, "task_id", &["taskId"]);
}

pub fn tags(path: &str, value: Value) -> Result<Vec<Tag>, ClientError> {
    let mut items = list_at(path, value, Some("tags"));
    normalize_objects(&mut items, normalize_tag);
    decode(path, Value::Array(items))
}

pub fn tag(path: &str, value: Value) -> Result<Tag, ClientError> {
    let mut value = unwrap_object(value, "tag");
    if let Value::Object(obj) = &mut value {
        normalize_tag(obj);
    }
    decode(path, value)
}

// ── Notifications ────────────────────────────────────────────────────

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "true" | "1" | "read"),
        _ => false,
    }
}

/// RFC 3339, or the `YYYY-MM-DD HH:MM:SS` form SQL backends emit (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn normalize_notification(obj: &mut Map<String, Value>) {
    promote_key(obj, "notification_id", &["id", "notificationId"]);
    promote_key(obj, "user_id", &["userId"]);
    let read = READ_MARKERS
        .iter()
        .any(|key| obj.get(*key).is_some_and(truthy));
    for key in READ_MARKERS {
        obj.remove(*key);
    }
    obj.insert("read".to_string(), Value::Bool(read));

    let created_at = obj
        .remove("created_at")
        .or_else(|| obj.remove("createdAt"))
        .and_then(|v| v.as_str().and_then(parse_timestamp));
    if let Some(ts) = created_at {
        obj.insert("created_at".to_string(), Value::String(ts.to_rfc3339()));
    }
}

pub fn notifications(path: &str, value: Value) -> Result<Vec<Notification>, ClientError> {
    let mut items = list_at(path, value, Some("notifications"));
    normalize_objects(&mut items, normalize_notification);
    decode(path, Value::Array(items))
}

// ── Auth ─────────────────────────────────────────────────────────────

pub fn access_token(value: &Value) -> Option<String> {
    ["accessToken", "access_token", "token"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

pub fn session_user(value: &Value) -> Option<UserRef> {
    value
        .get("user")
        .filter(|u| u.is_object())
        .and_then(|u| serde_json::from_value(u.clone()).ok())
}
