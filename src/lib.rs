//! taskboard - Task Board Engine
//!
//! The model and mutation core behind a Kanban/Gantt task board: the task
//! entity and its status state machine, drag-driven mutations with
//! optimistic apply and snapshot rollback, a composable filter engine, and
//! comment/assignee management. Rendering is out of scope; views consume
//! the store and the command traits.
//!
//! # Core Concepts
//!
//! - **Status is placement**: Kanban columns and Gantt lanes are both
//!   derived by grouping on `task.status`; nothing else stores position
//! - **Optimistic mutations**: gestures merge into the store before the
//!   persistence round-trip; a failure restores the proposal-time snapshot
//! - **Command seams**: `TaskCommands` and `CommentCommands` decouple the
//!   engine from any particular view technology
//!
//! # Module Organization
//!
//! - `model`: task, comment, and member entities plus partial updates
//! - `status`: status enumeration, workflow membership, column/lane grouping
//! - `store`: in-memory task store with apply/revert/subscribe
//! - `filter`: AND-composed, empty-meaning-unconstrained task predicates
//! - `drag`: card drops and Gantt bar sessions producing task patches
//! - `mutation`: the optimistic mutation manager and board controller
//! - `comments`: comment thread commands with author-only edit/delete
//! - `assignees`: member multi-select with total set replacement
//! - `gateway`: async persistence boundary trait
//! - `storage`: JSON-file gateway implementation
//! - `events`: JSONL event emission for external integrations
//! - `config`: `.taskboard.toml` loading
//! - `cli`: command-line interface using clap
//! - `error`: error types and result aliases

pub mod assignees;
pub mod cli;
pub mod comments;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod filter;
pub mod gateway;
pub mod model;
pub mod mutation;
pub mod output;
pub mod status;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
