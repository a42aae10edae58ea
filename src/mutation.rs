//! Optimistic mutation manager.
//!
//! Every mutating gesture funnels through the same shape: snapshot the
//! affected state at proposal time, merge the change synchronously so the
//! caller sees it before any network round-trip, fire the persistence
//! request, and on failure restore the snapshot. Success needs no
//! reconciliation; the optimistic state is final. There is no retry.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::model::{CurrentUser, Profile, TaskPatch};
use crate::status::Workflow;
use crate::store::TaskStore;

/// The store handle shared between the controller and read-only views.
pub type SharedStore = Arc<Mutex<TaskStore>>;

/// Run one optimistic mutation against locked state.
///
/// The snapshot is taken and the merge applied under a single lock
/// acquisition, and the lock is released before the persistence future is
/// awaited. Rollback restores exactly the snapshot that was taken at
/// proposal time.
pub(crate) async fn optimistic<St, Snap, Fut>(
    state: &Mutex<St>,
    snapshot: impl FnOnce(&St) -> Result<Snap>,
    merge: impl FnOnce(&mut St) -> Result<()>,
    persist: Fut,
    revert: impl FnOnce(&mut St, Snap),
) -> Result<()>
where
    Fut: Future<Output = Result<()>>,
{
    let snap = {
        let mut guard = state.lock();
        let snap = snapshot(&guard)?;
        merge(&mut guard)?;
        snap
    };

    match persist.await {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(error = %err, "persistence failed; rolling back optimistic state");
            revert(&mut state.lock(), snap);
            Err(err)
        }
    }
}

/// Task-level commands, the seam any rendering layer talks to.
#[async_trait]
pub trait TaskCommands: Send + Sync {
    /// Apply a partial update optimistically and persist it.
    async fn update(&self, task_id: &str, patch: TaskPatch) -> Result<()>;

    /// Delete a task. Unlike updates this is not optimistic: the store
    /// entry is removed only after the gateway confirms.
    async fn delete(&self, task_id: &str) -> Result<()>;
}

/// The single mutator of the task store.
///
/// Holds the store, the persistence gateway, the board workflow (for status
/// membership checks), and the interactive user's identity.
pub struct BoardController {
    store: SharedStore,
    gateway: Arc<dyn Gateway>,
    workflow: Workflow,
    user: CurrentUser,
}

impl BoardController {
    pub fn new(
        store: SharedStore,
        gateway: Arc<dyn Gateway>,
        workflow: Workflow,
        user: CurrentUser,
    ) -> Self {
        Self {
            store,
            gateway,
            workflow,
            user,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Replace the store contents with a fresh fetch of the project.
    pub async fn load_project(&self, project_id: &str) -> Result<()> {
        let tasks = self.gateway.fetch_tasks(project_id).await?;
        debug!(project = %project_id, count = tasks.len(), "project loaded");
        self.store.lock().load(tasks);
        Ok(())
    }

    /// Fetch one task's comment thread into the store.
    pub async fn load_thread(&self, task_id: &str) -> Result<()> {
        let comments = self.gateway.fetch_comments(task_id).await?;
        self.store.lock().set_thread(task_id, comments);
        Ok(())
    }

    /// The member universe for assignee selection.
    pub async fn members(&self, project_id: &str) -> Result<Vec<Profile>> {
        self.gateway.fetch_members(project_id).await
    }
}

#[async_trait]
impl TaskCommands for BoardController {
    /// Overlapping updates on the same task are an accepted race: each
    /// mutation's rollback restores its own proposal-time snapshot, so a
    /// failure can discard a later overlapping change. The board is
    /// single-editor, last-write-wins.
    async fn update(&self, task_id: &str, patch: TaskPatch) -> Result<()> {
        if patch.is_empty() {
            debug!(task = %task_id, "empty patch; skipping");
            return Ok(());
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("task name cannot be empty".to_string()));
            }
        }
        if let Some(status) = patch.status {
            self.workflow.validate(status)?;
        }

        let update = patch.to_update();
        optimistic(
            &self.store,
            |store| store.snapshot(task_id),
            |store| store.apply(task_id, &patch),
            self.gateway.update_task(task_id, &update),
            |store, snap| store.revert(snap),
        )
        .await
    }

    async fn delete(&self, task_id: &str) -> Result<()> {
        self.store.lock().require(task_id)?;
        self.gateway.delete_task(task_id).await?;
        self.store.lock().remove(task_id);
        Ok(())
    }
}
