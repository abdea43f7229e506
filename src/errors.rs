//! Typed error hierarchy for the board client.
//!
//! `ClientError` covers every failure a view controller can surface:
//! - transport failures (the request never produced a response)
//! - `Unauthorized` — a 401; the session has already been torn down
//! - `Api` — any other non-2xx status, carrying the server's message
//! - local precondition failures (`NotAMember`, `Busy`, `NoSession`, ...)

use thiserror::Error;

use crate::board::identity::EntityId;

/// Message shown when the server refuses to delete a board that still has
/// columns, tasks or members attached.
pub const BOARD_DEPENDENTS_MESSAGE: &str =
    "Board cannot be deleted: remove its columns, tasks and members first";

/// Errors from the gateway and the view controllers built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("Session expired or invalid, please log in again")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{}", BOARD_DEPENDENTS_MESSAGE)]
    BoardHasDependents { board_id: EntityId },

    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("User {user_id} is not a member of this board")]
    NotAMember { user_id: EntityId },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Another {action} request is still in flight")]
    Busy { action: &'static str },

    #[error("Not logged in")]
    NoSession,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl ClientError {
    /// Build an `Api` error, pulling the message out of a JSON error payload
    /// (`{"message": ..}` or `{"error": ..}`) when the server sent one.
    pub fn from_status(status: u16, body: &serde_json::Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| default_status_message(status).to_string());
        ClientError::Api { status, message }
    }

    /// 4xx failures other than 401: the server rejected the input.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if (400..500).contains(status))
    }

    /// 5xx failures, typically a relational integrity violation on delete.
    pub fn is_integrity(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status >= 500)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        403 => "Forbidden",
        404 => "Not found",
        409 => "Conflict",
        422 => "Unprocessable entity",
        500..=599 => "Internal server error",
        _ => "Unknown error",
    }
}
