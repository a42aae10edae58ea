//! Comment thread manager.
//!
//! Same optimistic shape as task updates, applied to a task's comment
//! thread: the thread plus the owning task's `comment_count` are
//! snapshotted together, mutated synchronously, and restored as a unit if
//! persistence fails, so the count is never adjusted twice.
//!
//! Edit and delete are author-only. The check happens here, before any
//! request; a rendering layer uses [`CommentCommands::can_modify`] to hide
//! the affordances for non-authors, and the server enforces the same rule
//! independently.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{Comment, CommentUpdate};
use crate::mutation::{optimistic, BoardController};

/// Comment-level commands, consumed by any rendering layer.
#[async_trait]
pub trait CommentCommands: Send + Sync {
    /// Whether the current user may edit or delete this comment.
    fn can_modify(&self, comment: &Comment) -> bool;

    /// Append a comment authored by the current user.
    async fn add(&self, task_id: &str, text: &str) -> Result<Comment>;

    /// Replace a comment's text. Marks it edited.
    async fn edit(&self, comment_id: &str, text: &str) -> Result<()>;

    /// Delete a comment.
    async fn remove(&self, comment_id: &str) -> Result<()>;
}

impl BoardController {
    /// Locate a comment and check authorship, before any optimistic change.
    fn authorized_comment(&self, comment_id: &str) -> Result<Comment> {
        let store = self.store().lock();
        let comment = store
            .comment(comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        if comment.author.id != self.user().id {
            return Err(Error::NotCommentAuthor {
                comment_id: comment_id.to_string(),
                author: comment.author.name.clone(),
            });
        }
        Ok(comment.clone())
    }
}

#[async_trait]
impl CommentCommands for BoardController {
    fn can_modify(&self, comment: &Comment) -> bool {
        comment.author.id == self.user().id
    }

    async fn add(&self, task_id: &str, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("comment text cannot be empty".to_string()));
        }

        let comment = Comment::new(task_id, self.user().profile(), text);
        optimistic(
            self.store(),
            |store| store.thread_snapshot(task_id),
            |store| {
                store.push_comment(comment.clone());
                Ok(())
            },
            self.gateway().add_comment(&comment),
            |store, snap| store.revert_thread(snap),
        )
        .await?;
        Ok(comment)
    }

    async fn edit(&self, comment_id: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("comment text cannot be empty".to_string()));
        }

        let comment = self.authorized_comment(comment_id)?;
        let update = CommentUpdate {
            comment_text: text.to_string(),
        };
        optimistic(
            self.store(),
            |store| store.thread_snapshot(&comment.task_id),
            |store| store.edit_comment(comment_id, text),
            self.gateway().update_comment(comment_id, &update),
            |store, snap| store.revert_thread(snap),
        )
        .await
    }

    async fn remove(&self, comment_id: &str) -> Result<()> {
        let comment = self.authorized_comment(comment_id)?;
        optimistic(
            self.store(),
            |store| store.thread_snapshot(&comment.task_id),
            |store| store.remove_comment(comment_id).map(|_| ()),
            self.gateway().delete_comment(comment_id),
            |store, snap| store.revert_thread(snap),
        )
        .await
    }
}
