//! Status state machine and view placement.
//!
//! The status set is closed and chosen by the board workflow. Any status may
//! transition to any other status in the set; legality is membership, not
//! ordering. Kanban columns and Gantt lanes are both derived by grouping on
//! `task.status`, so the two views can never disagree about where a task
//! lives.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::Task;

/// Closed, ordered enumeration of task statuses across both workflows.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Review,
    Done,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Review => "review",
            Status::Done => "done",
            Status::Completed => "completed",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "todo" | "to_do" => Ok(Status::Todo),
            "in_progress" | "inprogress" => Ok(Status::InProgress),
            "review" => Ok(Status::Review),
            "done" => Ok(Status::Done),
            "completed" => Ok(Status::Completed),
            other => Err(Error::UnknownStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Board workflow: which status subset the board runs on.
///
/// New tasks start in `Todo` either way; there is no terminal status, a
/// completed task can move back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// todo / in_progress / review / done
    #[default]
    FourStage,
    /// todo / in_progress / completed
    ThreeStage,
}

impl Workflow {
    pub fn statuses(&self) -> &'static [Status] {
        match self {
            Workflow::FourStage => &[
                Status::Todo,
                Status::InProgress,
                Status::Review,
                Status::Done,
            ],
            Workflow::ThreeStage => &[Status::Todo, Status::InProgress, Status::Completed],
        }
    }

    pub fn contains(&self, status: Status) -> bool {
        self.statuses().contains(&status)
    }

    /// Transition legality: the target must be a member of this workflow.
    /// There is no forward-only ordering and no terminal state.
    pub fn can_transition(&self, _from: Status, to: Status) -> bool {
        self.contains(to)
    }

    pub fn validate(&self, status: Status) -> Result<()> {
        if self.contains(status) {
            Ok(())
        } else {
            Err(Error::UnknownStatus {
                status: status.as_str().to_string(),
            })
        }
    }
}

/// One Kanban column (or, identically, one Gantt lane): the workflow status
/// plus references to the tasks whose status equals it.
#[derive(Debug)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// Gantt lanes are the same grouping as Kanban columns.
pub type Lane<'a> = Column<'a>;

/// Group tasks into columns by status, one column per workflow status in
/// workflow order. Card order within a column is render-time only (sorted by
/// id here); it is not a durable property and is not persisted.
pub fn columns<'a>(workflow: Workflow, tasks: &'a [Task]) -> Vec<Column<'a>> {
    let mut out: Vec<Column<'a>> = workflow
        .statuses()
        .iter()
        .map(|&status| Column {
            status,
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        match out.iter_mut().find(|col| col.status == task.status) {
            Some(col) => col.tasks.push(task),
            None => {
                warn!(task = %task.id, status = task.status.as_str(), "task status outside workflow; not placed");
            }
        }
    }

    for col in &mut out {
        col.tasks.sort_by(|a, b| a.id.cmp(&b.id));
    }
    out
}

/// Group tasks into Gantt lanes. Identical to [`columns`] by construction.
pub fn lanes<'a>(workflow: Workflow, tasks: &'a [Task]) -> Vec<Lane<'a>> {
    columns(workflow, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn task(id: &str, status: Status) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
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

    #[test]
    fn any_member_transitions_to_any_member() {
        let wf = Workflow::FourStage;
        for &from in wf.statuses() {
            for &to in wf.statuses() {
                assert!(wf.can_transition(from, to));
            }
        }
        // Backwards from done is legal: no terminal state.
        assert!(wf.can_transition(Status::Done, Status::Todo));
    }

    #[test]
    fn transition_outside_workflow_is_illegal() {
        assert!(!Workflow::FourStage.can_transition(Status::Todo, Status::Completed));
        assert!(!Workflow::ThreeStage.can_transition(Status::Todo, Status::Review));
        assert!(Workflow::ThreeStage.validate(Status::Done).is_err());
    }

    #[test]
    fn every_task_lands_in_exactly_one_column_matching_its_status() {
        let tasks = vec![
            task("t1", Status::Todo),
            task("t2", Status::InProgress),
            task("t3", Status::Done),
            task("t4", Status::Todo),
        ];
        let cols = columns(Workflow::FourStage, &tasks);
        assert_eq!(cols.len(), 4);

        for t in &tasks {
            let holding: Vec<_> = cols
                .iter()
                .filter(|col| col.tasks.iter().any(|c| c.id == t.id))
                .collect();
            assert_eq!(holding.len(), 1);
            assert_eq!(holding[0].status, t.status);
        }
    }

    #[test]
    fn lanes_agree_with_columns() {
        let tasks = vec![task("t1", Status::Review), task("t2", Status::Todo)];
        let cols = columns(Workflow::FourStage, &tasks);
        let lns = lanes(Workflow::FourStage, &tasks);
        for (col, lane) in cols.iter().zip(lns.iter()) {
            assert_eq!(col.status, lane.status);
            let col_ids: Vec<_> = col.tasks.iter().map(|t| &t.id).collect();
            let lane_ids: Vec<_> = lane.tasks.iter().map(|t| &t.id).collect();
            assert_eq!(col_ids, lane_ids);
        }
    }

    #[test]
    fn out_of_workflow_status_is_not_placed() {
        let tasks = vec![task("t1", Status::Completed)];
        let cols = columns(Workflow::FourStage, &tasks);
        assert!(cols.iter().all(|col| col.tasks.is_empty()));
    }
}
