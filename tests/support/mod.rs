#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tempfile::TempDir;

use taskboard::error::{Error, Result};
use taskboard::gateway::Gateway;
use taskboard::model::{Comment, CommentUpdate, CurrentUser, Priority, Profile, Task, TaskUpdate};
use taskboard::mutation::BoardController;
use taskboard::status::{Status, Workflow};
use taskboard::storage::{BoardFile, FileGateway};
use taskboard::store::TaskStore;

pub const PROJECT: &str = "p1";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn member(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: None,
    }
}

pub fn ada() -> Profile {
    member("u-ada", "Ada Lovelace")
}

pub fn grace() -> Profile {
    member("u-grace", "Grace Hopper")
}

pub fn ada_user() -> CurrentUser {
    CurrentUser {
        id: "u-ada".to_string(),
        name: "Ada Lovelace".to_string(),
        avatar_url: None,
    }
}

pub fn task(id: &str, status: Status) -> Task {
    Task {
        id: id.to_string(),
        project_id: PROJECT.to_string(),
        name: format!("task {id}"),
        description: None,
        status,
        priority: Priority::Medium,
        started_at: None,
        due_date: None,
        assignees: Vec::new(),
        comment_count: 0,
    }
}

/// The standard three-task board used across the integration tests.
pub fn seed_board() -> BoardFile {
    let mut board = BoardFile::new(PROJECT);
    board.members = vec![ada(), grace()];

    let mut t1 = task("t1", Status::Todo);
    t1.name = "Ship the quarterly report".to_string();
    t1.priority = Priority::High;
    t1.started_at = Some(day(2025, 1, 10));
    t1.due_date = Some(day(2025, 1, 15));
    t1.assignees = vec![ada()];

    let mut t2 = task("t2", Status::InProgress);
    t2.name = "Wire up the payments webhook".to_string();
    t2.assignees = vec![grace()];

    let t3 = task("t3", Status::Done);

    board.tasks = vec![t1, t2, t3];
    board
}

/// A board directory on disk, seeded with [`seed_board`].
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = FileGateway::new(dir.path());
        gateway.write_board(&seed_board()).expect("seed board");
        let board = Self { dir };
        board.write_config("[board]\nproject = \"p1\"\n");
        board
    }

    /// An empty directory with no board file.
    pub fn bare() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn gateway(&self) -> FileGateway {
        FileGateway::new(self.dir.path())
    }

    pub fn read_board(&self) -> BoardFile {
        self.gateway().read_board().expect("board file")
    }

    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.dir.path().join(".taskboard.toml"), contents).expect("config");
    }

    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("board").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd.env("BOARD_USER", "u-ada");
        cmd
    }
}

/// Gateway wrapper with per-operation failure injection and call counts,
/// for exercising optimistic rollback against real file-backed state.
pub struct FlakyGateway {
    inner: FileGateway,
    pub fail_task_updates: AtomicBool,
    pub fail_comment_ops: AtomicBool,
    pub task_update_calls: AtomicUsize,
    pub comment_calls: AtomicUsize,
}

impl FlakyGateway {
    pub fn new(inner: FileGateway) -> Self {
        Self {
            inner,
            fail_task_updates: AtomicBool::new(false),
            fail_comment_ops: AtomicBool::new(false),
            task_update_calls: AtomicUsize::new(0),
            comment_calls: AtomicUsize::new(0),
        }
    }

    fn task_update_gate(&self) -> Result<()> {
        self.task_update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_task_updates.load(Ordering::SeqCst) {
            return Err(Error::Persistence("injected update failure".to_string()));
        }
        Ok(())
    }

    fn comment_gate(&self) -> Result<()> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_comment_ops.load(Ordering::SeqCst) {
            return Err(Error::Persistence("injected comment failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for FlakyGateway {
    async fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        self.inner.fetch_tasks(project_id).await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        self.task_update_gate()?;
        self.inner.update_task(task_id, update).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.task_update_gate()?;
        self.inner.delete_task(task_id).await
    }

    async fn fetch_comments(&self, task_id: &str) -> Result<Vec<Comment>> {
        self.inner.fetch_comments(task_id).await
    }

    async fn add_comment(&self, comment: &Comment) -> Result<()> {
        self.comment_gate()?;
        self.inner.add_comment(comment).await
    }

    async fn update_comment(&self, comment_id: &str, update: &CommentUpdate) -> Result<()> {
        self.comment_gate()?;
        self.inner.update_comment(comment_id, update).await
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.comment_gate()?;
        self.inner.delete_comment(comment_id).await
    }

    async fn fetch_members(&self, project_id: &str) -> Result<Vec<Profile>> {
        self.inner.fetch_members(project_id).await
    }
}

/// A controller over a seeded board with failure injection, loaded and
/// ready for mutations.
pub async fn controller_over(board: &TestBoard) -> (BoardController, Arc<FlakyGateway>) {
    let gateway = Arc::new(FlakyGateway::new(board.gateway()));
    let store = Arc::new(Mutex::new(TaskStore::new()));
    let controller = BoardController::new(store, gateway.clone(), Workflow::FourStage, ada_user());
    controller.load_project(PROJECT).await.expect("load project");
    (controller, gateway)
}
