//! Board client: local view state kept in sync with the remote board service.
//!
//! ## Overview
//!
//! Each view controller owns its own cache, fills it by explicit fetch, and
//! after every successful remote call either patches it in place or re-fetches
//! the owning collection. Caches are never shared; children hand changes to
//! their parent as return values (`TaskSignal`) or through `&mut` parent
//! access (`ColumnView`).
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────────┐ open  ┌─────────────────────┐ open_task ┌────────────┐
//! │ board_list   │ ────> │ board_detail        │ ────────> │ task       │
//! │ BoardListView│       │ columns + members   │ <──────── │ TaskView   │
//! └──────────────┘       └─────────────────────┘ TaskSignal└────────────┘
//!        │                  ^        │                          │
//!        │       &mut board │        │                          │
//!        │            ┌─────┴──────┐ │      ┌───────────────┐   │
//!        │            │ column     │ │      │ notifications │   │
//!        │            │ ColumnView │ │      │ Feed + Poller │   │
//!        │            └────────────┘ │      └───────────────┘   │
//!        v                           v              v           v
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ api.rs (typed endpoints) -> shape.rs (payload normalizers)        │
//! │ gateway.rs (Gateway, Transport trait, HttpTransport)              │
//! │   └─ session.rs (SessionContext: bearer token, 401 -> Route::Login)│
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module      | Responsibility                                           |
//! |-------------|----------------------------------------------------------|
//! | `models`    | `Board`, `Column`, `Task`, `Tag`, `UserRef`, `Notification` |
//! | `identity`  | `EntityId`, the `same_user` predicate and set helpers   |
//! | `auth`      | login / register / logout against the session           |
//! | `inflight`  | `InFlight` guard rejecting overlapping requests          |
//!
//! ## Reconciliation per entity
//!
//! - columns, tasks, tags, boards: confirm, then apply locally
//! - membership: confirm, then re-fetch the member join
//! - assignment: confirm, patch locally, then re-fetch (server wins)

pub mod api;
pub mod auth;
pub mod board_detail;
pub mod board_list;
pub mod column;
pub mod gateway;
pub mod identity;
pub mod inflight;
pub mod models;
pub mod notifications;
pub mod session;
pub mod shape;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use board_detail::BoardDetailView;
pub use board_list::BoardListView;
pub use column::ColumnView;
pub use gateway::{Gateway, HttpTransport, Transport};
pub use identity::EntityId;
pub use notifications::{NotificationFeed, NotificationPoller};
pub use session::{FileSessionStore, Route, SessionContext, SessionStore};
pub use task::{AssignmentStatus, TaskSignal, TaskView};
