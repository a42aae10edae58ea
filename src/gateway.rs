//! Persistence boundary.
//!
//! The board core owns no wire protocol; it talks to the surrounding
//! application through this trait. Update calls return no body: once a
//! mutation is accepted, the optimistic local state is authoritative, so
//! server-side derived fields may lag until the next full fetch.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Comment, CommentUpdate, Profile, Task, TaskUpdate};

/// Logical request/response contracts with the surrounding application.
///
/// Implementations must not block; every method is a suspension point for
/// the mutation managers.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// All tasks of a project. Order is not meaningful.
    async fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>>;

    /// Persist a partial task update.
    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()>;

    /// Remove a task. The store entry is only dropped after this succeeds.
    async fn delete_task(&self, task_id: &str) -> Result<()>;

    /// A task's comments, ordered by creation.
    async fn fetch_comments(&self, task_id: &str) -> Result<Vec<Comment>>;

    /// Persist a comment created locally (the core assigns the id).
    async fn add_comment(&self, comment: &Comment) -> Result<()>;

    /// Persist a comment edit.
    async fn update_comment(&self, comment_id: &str, update: &CommentUpdate) -> Result<()>;

    /// Remove a comment.
    async fn delete_comment(&self, comment_id: &str) -> Result<()>;

    /// The member universe assignees are selected from. Read-only.
    async fn fetch_members(&self, project_id: &str) -> Result<Vec<Profile>>;
}
