//! In-memory task store.
//!
//! Single source of truth for everything both views render. Only the
//! mutation controller writes to it; the Kanban/Gantt groupings and the
//! filter engine are pure readers. Mutations go through `apply`/`revert`
//! so the optimistic rollback contract holds in one place, and every write
//! bumps a revision observable through `subscribe`.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Comment, Task, TaskPatch};

/// Pre-operation copy of a comment thread, used solely for rollback.
/// Carries the owning task's `comment_count` so a revert restores both in
/// one step and the count is never adjusted twice.
#[derive(Debug, Clone)]
pub struct ThreadSnapshot {
    pub task_id: String,
    pub comments: Vec<Comment>,
    pub comment_count: u32,
}

/// In-memory collection of tasks and their comment threads for one project.
#[derive(Debug)]
pub struct TaskStore {
    tasks: HashMap<String, Task>,
    threads: HashMap<String, Vec<Comment>>,
    revision: watch::Sender<u64>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            tasks: HashMap::new(),
            threads: HashMap::new(),
            revision,
        }
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        store.load(tasks);
        store
    }

    /// Replace the whole task collection (a full refetch).
    pub fn load(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        self.bump();
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn require(&self, task_id: &str) -> Result<&Task> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// All tasks, ordered by id. Card order inside a column is derived at
    /// render time and is not durable.
    pub fn tasks(&self) -> Vec<&Task> {
        let mut out: Vec<&Task> = self.tasks.values().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Deep copy of one task, taken at proposal time for rollback.
    pub fn snapshot(&self, task_id: &str) -> Result<Task> {
        self.require(task_id).cloned()
    }

    /// Merge a partial update into a task. The caller has already decided
    /// the patch is non-empty and legal.
    pub fn apply(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        patch.apply_to(task);
        debug!(task = %task_id, "patch applied");
        self.bump();
        Ok(())
    }

    /// Restore a task to its pre-mutation snapshot.
    pub fn revert(&mut self, snapshot: Task) {
        debug!(task = %snapshot.id, "task reverted to snapshot");
        self.tasks.insert(snapshot.id.clone(), snapshot);
        self.bump();
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
        self.bump();
    }

    pub fn remove(&mut self, task_id: &str) -> Option<Task> {
        let removed = self.tasks.remove(task_id);
        if removed.is_some() {
            self.threads.remove(task_id);
            self.bump();
        }
        removed
    }

    // =========================================================================
    // Comment threads
    // =========================================================================

    pub fn thread(&self, task_id: &str) -> &[Comment] {
        self.threads.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Install a fetched thread and sync the task's derived comment count.
    pub fn set_thread(&mut self, task_id: &str, comments: Vec<Comment>) {
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.comment_count = comments.len() as u32;
        }
        self.threads.insert(task_id.to_string(), comments);
        self.bump();
    }

    pub fn thread_snapshot(&self, task_id: &str) -> Result<ThreadSnapshot> {
        let task = self.require(task_id)?;
        Ok(ThreadSnapshot {
            task_id: task_id.to_string(),
            comments: self.thread(task_id).to_vec(),
            comment_count: task.comment_count,
        })
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.threads
            .values()
            .flat_map(|thread| thread.iter())
            .find(|c| c.id == comment_id)
    }

    pub fn push_comment(&mut self, comment: Comment) {
        if let Some(task) = self.tasks.get_mut(&comment.task_id) {
            task.comment_count += 1;
        }
        self.threads
            .entry(comment.task_id.clone())
            .or_default()
            .push(comment);
        self.bump();
    }

    /// Apply an edit to a comment in place. Marks it edited and refreshes
    /// `updated_at`.
    pub fn edit_comment(&mut self, comment_id: &str, text: &str) -> Result<()> {
        let comment = self
            .threads
            .values_mut()
            .flat_map(|thread| thread.iter_mut())
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        comment.text = text.to_string();
        comment.updated_at = chrono::Utc::now();
        comment.is_edited = true;
        self.bump();
        Ok(())
    }

    pub fn remove_comment(&mut self, comment_id: &str) -> Result<Comment> {
        let task_id = self
            .comment(comment_id)
            .map(|c| c.task_id.clone())
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        let thread = self.threads.entry(task_id.clone()).or_default();
        let index = thread
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        let removed = thread.remove(index);
        if let Some(task) = self.tasks.get_mut(&task_id) {
            task.comment_count = task.comment_count.saturating_sub(1);
        }
        self.bump();
        Ok(removed)
    }

    /// Restore a thread and the owning task's comment count from a
    /// pre-operation snapshot.
    pub fn revert_thread(&mut self, snapshot: ThreadSnapshot) {
        debug!(task = %snapshot.task_id, "comment thread reverted to snapshot");
        if let Some(task) = self.tasks.get_mut(&snapshot.task_id) {
            task.comment_count = snapshot.comment_count;
        }
        self.threads.insert(snapshot.task_id, snapshot.comments);
        self.bump();
    }

    // =========================================================================
    // Change notification
    // =========================================================================

    /// Observe store revisions. Receivers wake on every mutation; the value
    /// is a monotonically increasing counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
