//! File-backed persistence.
//!
//! A [`Gateway`] implementation over a single JSON board file, used by the
//! CLI and by integration tests. Writes are atomic (tempfile in the same
//! directory, then rename) so a failed write never leaves a torn file.
//!
//! # Layout
//!
//! ```text
//! .taskboard/
//!   board.json    # tasks, comments, members for one project
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::model::{Comment, CommentUpdate, Profile, Task, TaskUpdate};

/// Name of the board data directory
pub const BOARD_DIR: &str = ".taskboard";

/// Name of the board data file
pub const BOARD_FILE: &str = "board.json";

pub const BOARD_SCHEMA_VERSION: &str = "board.store.v1";

fn default_schema_version() -> String {
    BOARD_SCHEMA_VERSION.to_string()
}

/// On-disk shape of one project's board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub project_id: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub members: Vec<Profile>,
}

impl BoardFile {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            schema_version: BOARD_SCHEMA_VERSION.to_string(),
            project_id: project_id.into(),
            tasks: Vec::new(),
            comments: Vec::new(),
            members: Vec::new(),
        }
    }
}

/// Gateway over a board file under `<root>/.taskboard/`.
#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn board_dir(&self) -> PathBuf {
        self.root.join(BOARD_DIR)
    }

    pub fn board_path(&self) -> PathBuf {
        self.board_dir().join(BOARD_FILE)
    }

    pub fn exists(&self) -> bool {
        self.board_path().exists()
    }

    pub fn read_board(&self) -> Result<BoardFile> {
        let path = self.board_path();
        if !path.exists() {
            return Err(Error::Persistence(format!(
                "no board data at {} (run 'board init' first)",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(&path)?;
        let board = serde_json::from_str(&contents)?;
        Ok(board)
    }

    pub fn write_board(&self, board: &BoardFile) -> Result<()> {
        let dir = self.board_dir();
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_vec_pretty(board)?;
        write_atomic(&self.board_path(), &json)?;
        Ok(())
    }

    fn resolve_assignees(board: &BoardFile, ids: &[String]) -> Result<Vec<Profile>> {
        ids.iter()
            .map(|id| {
                board
                    .members
                    .iter()
                    .find(|m| &m.id == id)
                    .cloned()
                    .ok_or_else(|| Error::Persistence(format!("unknown member id '{id}'")))
            })
            .collect()
    }

    fn apply_update(board: &mut BoardFile, task_id: &str, update: &TaskUpdate) -> Result<()> {
        let assignees = update
            .assignee_ids
            .as_ref()
            .map(|ids| Self::resolve_assignees(board, ids))
            .transpose()?;

        let task = board
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::Persistence(format!("task '{task_id}' not in remote store")))?;

        if let Some(name) = &update.task_name {
            task.name = name.clone();
        }
        if let Some(description) = &update.task_description {
            task.description = Some(description.clone());
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(started_at) = update.started_at {
            task.started_at = Some(started_at);
        }
        if let Some(due_date) = update.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(assignees) = assignees {
            task.assignees = assignees;
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for FileGateway {
    async fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let board = self.read_board()?;
        Ok(board
            .tasks
            .into_iter()
            .filter(|t| t.project_id == project_id)
            .collect())
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        let mut board = self.read_board()?;
        Self::apply_update(&mut board, task_id, update)?;
        self.write_board(&board)
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        let mut board = self.read_board()?;
        let before = board.tasks.len();
        board.tasks.retain(|t| t.id != task_id);
        if board.tasks.len() == before {
            return Err(Error::Persistence(format!(
                "task '{task_id}' not in remote store"
            )));
        }
        board.comments.retain(|c| c.task_id != task_id);
        self.write_board(&board)
    }

    async fn fetch_comments(&self, task_id: &str) -> Result<Vec<Comment>> {
        let board = self.read_board()?;
        let mut comments: Vec<Comment> = board
            .comments
            .into_iter()
            .filter(|c| c.task_id == task_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn add_comment(&self, comment: &Comment) -> Result<()> {
        let mut board = self.read_board()?;
        if !board.tasks.iter().any(|t| t.id == comment.task_id) {
            return Err(Error::Persistence(format!(
                "task '{}' not in remote store",
                comment.task_id
            )));
        }
        if let Some(task) = board.tasks.iter_mut().find(|t| t.id == comment.task_id) {
            task.comment_count += 1;
        }
        board.comments.push(comment.clone());
        self.write_board(&board)
    }

    async fn update_comment(&self, comment_id: &str, update: &CommentUpdate) -> Result<()> {
        let mut board = self.read_board()?;
        let comment = board
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| {
                Error::Persistence(format!("comment '{comment_id}' not in remote store"))
            })?;
        comment.text = update.comment_text.clone();
        comment.updated_at = Utc::now();
        comment.is_edited = true;
        self.write_board(&board)
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let mut board = self.read_board()?;
        let task_id = board
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| c.task_id.clone())
            .ok_or_else(|| {
                Error::Persistence(format!("comment '{comment_id}' not in remote store"))
            })?;
        board.comments.retain(|c| c.id != comment_id);
        if let Some(task) = board.tasks.iter_mut().find(|t| t.id == task_id) {
            task.comment_count = task.comment_count.saturating_sub(1);
        }
        self.write_board(&board)
    }

    async fn fetch_members(&self, _project_id: &str) -> Result<Vec<Profile>> {
        let board = self.read_board()?;
        Ok(board.members)
    }
}

/// Write a file atomically: tempfile in the destination directory, then
/// rename over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::OperationFailed(format!("no parent dir for {}", path.display())))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, contents)?;
    tmp.persist(path)
        .map_err(|err| Error::Io(err.error))?;
    Ok(())
}
