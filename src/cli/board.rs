//! Board-level command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::assignees::AssigneeSelection;
use crate::config::Config;
use crate::drag::{card_drop, GanttDrag, Grip};
use crate::error::{Error, Result};
use crate::events::{Event, EventDestination, EventKind};
use crate::filter::{self, FilterSet};
use crate::gateway::Gateway;
use crate::model::{CurrentUser, Priority, Profile, Task};
use crate::mutation::{BoardController, TaskCommands};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::status::{self, Status};
use crate::storage::{BoardFile, FileGateway};
use crate::store::TaskStore;

use super::Cli;

/// Resolved global options shared by every handler.
pub(crate) struct Globals {
    pub dir: PathBuf,
    pub config: Config,
    pub options: OutputOptions,
    pub events: Option<EventDestination>,
    user_override: Option<String>,
}

impl Globals {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let dir = match &cli.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load_from_dir(&dir)?;
        Ok(Self {
            dir,
            config,
            options: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
            events: EventDestination::parse(cli.events.as_deref()),
            user_override: cli.user.clone(),
        })
    }

    fn user_id(&self) -> String {
        self.user_override
            .clone()
            .or_else(|| self.config.user.id.clone())
            .unwrap_or_else(|| "local".to_string())
    }
}

/// A controller wired to the board file, plus the project it operates on.
pub(crate) struct Ctx {
    pub controller: BoardController,
    pub project: String,
}

/// Build the controller: gateway over the data directory, user identity
/// resolved against the member list, store loaded with the project.
pub(crate) async fn context(globals: &Globals) -> Result<Ctx> {
    let gateway = Arc::new(FileGateway::new(&globals.dir));
    let project = globals.config.board.project.clone();
    let members = gateway.fetch_members(&project).await?;
    let user = resolve_user(globals, &members);

    let store = Arc::new(Mutex::new(TaskStore::new()));
    let controller = BoardController::new(
        store,
        gateway,
        globals.config.board.workflow,
        user,
    );
    controller.load_project(&project).await?;
    Ok(Ctx {
        controller,
        project,
    })
}

fn resolve_user(globals: &Globals, members: &[Profile]) -> CurrentUser {
    let id = globals.user_id();
    match members.iter().find(|m| m.id == id) {
        Some(profile) => CurrentUser {
            id: profile.id.clone(),
            name: profile.name.clone(),
            avatar_url: profile.avatar_url.clone(),
        },
        None => CurrentUser {
            name: globals.config.user.name.clone().unwrap_or_else(|| id.clone()),
            id,
            avatar_url: None,
        },
    }
}

/// Append one event to the configured sink, if any.
pub(crate) fn emit_event(
    globals: &Globals,
    kind: EventKind,
    actor: &str,
    data: serde_json::Value,
) -> Result<()> {
    if let Some(destination) = &globals.events {
        let event = Event::new(kind, Some(actor.to_string())).with_data(data)?;
        destination.open()?.emit(&event)?;
    }
    Ok(())
}

/// Run a task mutation and translate its outcome into events: an update
/// event on success, a revert event when persistence failed and the
/// optimistic state was rolled back.
async fn update_with_events(
    globals: &Globals,
    ctx: &Ctx,
    task_id: &str,
    patch: crate::model::TaskPatch,
    success: EventKind,
    data: serde_json::Value,
) -> Result<()> {
    let actor = ctx.controller.user().id.clone();
    match ctx.controller.update(task_id, patch).await {
        Ok(()) => {
            emit_event(globals, success, &actor, data)?;
            Ok(())
        }
        Err(err) => {
            if matches!(err, Error::Persistence(_)) {
                emit_event(
                    globals,
                    EventKind::TaskReverted,
                    &actor,
                    json!({ "task_id": task_id, "reason": err.to_string() }),
                )?;
            }
            Err(err)
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid date '{raw}' (expected YYYY-MM-DD)")))
}

// =============================================================================
// init
// =============================================================================

pub(crate) fn init(globals: &Globals, force: bool) -> Result<()> {
    let gateway = FileGateway::new(&globals.dir);
    if gateway.exists() && !force {
        return Err(Error::Validation(format!(
            "board already initialized at {} (use --force to overwrite)",
            gateway.board_path().display()
        )));
    }

    let board = demo_board(&globals.config);
    gateway.write_board(&board)?;
    info!(path = %gateway.board_path().display(), "board initialized");

    let mut human = HumanOutput::new(format!("Initialized board '{}'", board.project_id));
    human.push_summary("path", gateway.board_path().display().to_string());
    human.push_summary("tasks", board.tasks.len().to_string());
    human.push_summary("members", board.members.len().to_string());

    emit_success(
        globals.options,
        "init",
        &json!({
            "path": gateway.board_path().display().to_string(),
            "project": board.project_id,
            "tasks": board.tasks.len(),
            "members": board.members.len(),
        }),
        Some(&human),
    )
}

fn demo_board(config: &Config) -> BoardFile {
    let mut board = BoardFile::new(config.board.project.clone());
    board.members = vec![
        demo_member("u-ada", "Ada Lovelace"),
        demo_member("u-grace", "Grace Hopper"),
        demo_member("u-alan", "Alan Turing"),
    ];

    let statuses = config.board.workflow.statuses();
    let names = [
        "Sketch the onboarding flow",
        "Wire up the payments webhook",
        "Review the retry budget",
        "Ship the quarterly report",
        "Tidy the backlog",
    ];
    let priorities = [
        Priority::High,
        Priority::Urgent,
        Priority::Medium,
        Priority::Low,
        Priority::Medium,
    ];

    let today = Local::now().date_naive();
    for (i, name) in names.iter().enumerate() {
        let start = today + Duration::days(i as i64 - 2);
        board.tasks.push(Task {
            id: format!("t-{:02}", i + 1),
            project_id: board.project_id.clone(),
            name: (*name).to_string(),
            description: None,
            status: statuses[i % statuses.len()],
            priority: priorities[i % priorities.len()],
            started_at: Some(start),
            due_date: Some(start + Duration::days(4)),
            assignees: vec![board.members[i % board.members.len()].clone()],
            comment_count: 0,
        });
    }
    board
}

fn demo_member(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: None,
    }
}

// =============================================================================
// show
// =============================================================================

pub(crate) struct ShowOptions {
    pub text: Option<String>,
    pub priorities: Vec<String>,
    pub assignees: Vec<String>,
    pub mine: bool,
    pub due_from: Option<String>,
    pub due_to: Option<String>,
    pub gantt: bool,
}

impl ShowOptions {
    fn filters(&self) -> Result<FilterSet> {
        let priorities = self
            .priorities
            .iter()
            .map(|p| Priority::parse(p))
            .collect::<Result<Vec<_>>>()?;

        let due_between = match (&self.due_from, &self.due_to) {
            (None, None) => None,
            (from, to) => {
                let from = match from {
                    Some(raw) => parse_date(raw)?,
                    None => NaiveDate::MIN,
                };
                let to = match to {
                    Some(raw) => parse_date(raw)?,
                    None => NaiveDate::MAX,
                };
                Some((from, to))
            }
        };

        Ok(FilterSet {
            text: self.text.clone(),
            priorities,
            due_between,
            assignees: self.assignees.clone(),
            mine_only: self.mine,
        })
    }
}

#[derive(Serialize)]
struct ColumnView {
    status: Status,
    count: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct BoardView {
    project: String,
    view: &'static str,
    columns: Vec<ColumnView>,
}

pub(crate) async fn show(globals: &Globals, opts: ShowOptions) -> Result<()> {
    let ctx = context(globals).await?;
    let filters = opts.filters()?;
    let user_id = ctx.controller.user().id.clone();

    let visible: Vec<Task> = {
        let store = ctx.controller.store().lock();
        let tasks = store.tasks();
        filter::apply(&tasks, &filters, Some(&user_id))
            .into_iter()
            .cloned()
            .collect()
    };

    let workflow = ctx.controller.workflow();
    let grouped = if opts.gantt {
        status::lanes(workflow, &visible)
    } else {
        status::columns(workflow, &visible)
    };
    let view = BoardView {
        project: ctx.project.clone(),
        view: if opts.gantt { "gantt" } else { "kanban" },
        columns: grouped
            .into_iter()
            .map(|col| ColumnView {
                status: col.status,
                count: col.tasks.len(),
                tasks: col.tasks.into_iter().cloned().collect(),
            })
            .collect(),
    };

    let total: usize = view.columns.iter().map(|c| c.count).sum();
    let mut human = HumanOutput::new(format!(
        "{} ({}, {} task{})",
        view.project,
        view.view,
        total,
        if total == 1 { "" } else { "s" }
    ));
    for col in &view.columns {
        human.push_detail(format!("{} ({})", col.status.as_str(), col.count));
        for task in &col.tasks {
            human.push_detail(format_task_line(task, opts.gantt));
        }
    }

    emit_success(globals.options, "show", &view, Some(&human))
}

fn format_task_line(task: &Task, gantt: bool) -> String {
    let mut line = format!("  {}  {}  [{}]", task.id, task.name, task.priority.as_str());
    if gantt {
        match (task.started_at, task.due_date) {
            (Some(start), Some(due)) => line.push_str(&format!("  {start} -> {due}")),
            _ => line.push_str("  (unscheduled)"),
        }
    }
    if !task.assignees.is_empty() {
        let ids: Vec<&str> = task.assignees.iter().map(|a| a.id.as_str()).collect();
        line.push_str(&format!("  @{}", ids.join(",@")));
    }
    if task.comment_count > 0 {
        line.push_str(&format!("  ({} comments)", task.comment_count));
    }
    line
}

// =============================================================================
// move / schedule / shift
// =============================================================================

pub(crate) async fn move_card(globals: &Globals, task_id: &str, status: &str) -> Result<()> {
    let ctx = context(globals).await?;
    let target = Status::parse(status)?;
    let source = {
        let store = ctx.controller.store().lock();
        store.require(task_id)?.status
    };

    let Some(patch) = card_drop(source, target) else {
        let mut human = HumanOutput::new(format!(
            "{task_id} is already in {}; nothing to do",
            target.as_str()
        ));
        human.push_summary("changed", "false".to_string());
        return emit_success(
            globals.options,
            "move",
            &json!({ "task_id": task_id, "status": target.as_str(), "changed": false }),
            Some(&human),
        );
    };

    update_with_events(
        globals,
        &ctx,
        task_id,
        patch,
        EventKind::TaskUpdated,
        json!({ "task_id": task_id, "from": source.as_str(), "to": target.as_str() }),
    )
    .await?;

    let mut human = HumanOutput::new(format!(
        "Moved {task_id}: {} -> {}",
        source.as_str(),
        target.as_str()
    ));
    human.push_summary("changed", "true".to_string());
    emit_success(
        globals.options,
        "move",
        &json!({
            "task_id": task_id,
            "from": source.as_str(),
            "to": target.as_str(),
            "changed": true,
        }),
        Some(&human),
    )
}

pub(crate) async fn schedule(
    globals: &Globals,
    task_id: &str,
    start: &str,
    due: &str,
) -> Result<()> {
    let ctx = context(globals).await?;
    let start = parse_date(start)?;
    let due = parse_date(due)?;
    if due < start {
        return Err(Error::Validation(format!(
            "due date {due} is before start date {start}"
        )));
    }

    update_with_events(
        globals,
        &ctx,
        task_id,
        crate::model::TaskPatch::dates(start, due),
        EventKind::TaskUpdated,
        json!({ "task_id": task_id, "started_at": start, "due_date": due }),
    )
    .await?;

    let human = HumanOutput::new(format!("Scheduled {task_id}: {start} -> {due}"));
    emit_success(
        globals.options,
        "schedule",
        &json!({ "task_id": task_id, "started_at": start, "due_date": due }),
        Some(&human),
    )
}

pub(crate) async fn shift(globals: &Globals, task_id: &str, days: i64) -> Result<()> {
    let ctx = context(globals).await?;
    let task = {
        let store = ctx.controller.store().lock();
        store.require(task_id)?.clone()
    };

    let no_schedule = || {
        Error::Validation(format!(
            "{task_id} has no schedule; set dates with 'board schedule' first"
        ))
    };
    let grab_day = task.started_at.ok_or_else(no_schedule)?;
    let mut drag = GanttDrag::grab(&task, Grip::Bar, grab_day).ok_or_else(no_schedule)?;
    drag.drag_to(grab_day + Duration::days(days));

    let Some(patch) = drag.drop() else {
        let human = HumanOutput::new(format!("{task_id} unchanged; shift of 0 days"));
        return emit_success(
            globals.options,
            "shift",
            &json!({ "task_id": task_id, "changed": false }),
            Some(&human),
        );
    };
    let (started_at, due_date) = (patch.started_at, patch.due_date);

    update_with_events(
        globals,
        &ctx,
        task_id,
        patch,
        EventKind::TaskUpdated,
        json!({ "task_id": task_id, "days": days, "started_at": started_at, "due_date": due_date }),
    )
    .await?;

    let human = HumanOutput::new(format!("Shifted {task_id} by {days} day(s)"));
    emit_success(
        globals.options,
        "shift",
        &json!({
            "task_id": task_id,
            "days": days,
            "started_at": started_at,
            "due_date": due_date,
            "changed": true,
        }),
        Some(&human),
    )
}

// =============================================================================
// assign / members / rm
// =============================================================================

pub(crate) async fn assign(globals: &Globals, task_id: &str, members: Vec<String>) -> Result<()> {
    let ctx = context(globals).await?;
    ctx.controller.store().lock().require(task_id)?;

    let universe = ctx.controller.members(&ctx.project).await?;
    let mut selection = AssigneeSelection::new(universe);
    for id in &members {
        if !selection.universe().iter().any(|m| &m.id == id) {
            let known: Vec<&str> = selection.universe().iter().map(|m| m.id.as_str()).collect();
            return Err(Error::Validation(format!(
                "unknown member '{id}' (known: {})",
                known.join(", ")
            )));
        }
        selection.select(id);
    }
    let ids = selection.selected_ids();

    update_with_events(
        globals,
        &ctx,
        task_id,
        selection.confirm(),
        EventKind::AssigneesReplaced,
        json!({ "task_id": task_id, "assignee_ids": ids }),
    )
    .await?;

    let human = if ids.is_empty() {
        HumanOutput::new(format!("Cleared assignees on {task_id}"))
    } else {
        HumanOutput::new(format!("Assigned {task_id} to {}", ids.join(", ")))
    };
    emit_success(
        globals.options,
        "assign",
        &json!({ "task_id": task_id, "assignee_ids": ids }),
        Some(&human),
    )
}

pub(crate) async fn members(globals: &Globals) -> Result<()> {
    let ctx = context(globals).await?;
    let members = ctx.controller.members(&ctx.project).await?;

    let mut human = HumanOutput::new(format!(
        "{} member{}",
        members.len(),
        if members.len() == 1 { "" } else { "s" }
    ));
    for member in &members {
        human.push_detail(format!("  {}  {}", member.id, member.name));
    }
    emit_success(globals.options, "members", &members, Some(&human))
}

pub(crate) async fn remove_task(globals: &Globals, task_id: &str) -> Result<()> {
    let ctx = context(globals).await?;
    let actor = ctx.controller.user().id.clone();
    ctx.controller.delete(task_id).await?;
    emit_event(
        globals,
        EventKind::TaskDeleted,
        &actor,
        json!({ "task_id": task_id }),
    )?;

    let human = HumanOutput::new(format!("Deleted {task_id}"));
    emit_success(
        globals.options,
        "rm",
        &json!({ "task_id": task_id }),
        Some(&human),
    )
}
