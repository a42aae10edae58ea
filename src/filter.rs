//! Composable task filters.
//!
//! A `FilterSet` is a record of independent predicates, each of which is
//! unconstrained when empty. All active predicates are AND-combined.
//! Evaluation is pure: same `(task, filters, current_user)` in, same answer
//! out, no side effects.

use chrono::NaiveDate;

use crate::model::{Priority, Task};

/// Independent filter predicates. Empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    /// Case-insensitive substring match against name and description.
    pub text: Option<String>,
    /// Include tasks whose priority is in the set.
    pub priorities: Vec<Priority>,
    /// Include tasks whose due date falls within the inclusive range.
    pub due_between: Option<(NaiveDate, NaiveDate)>,
    /// Include tasks assigned to any of these member ids.
    pub assignees: Vec<String>,
    /// Include only tasks assigned to the current user.
    pub mine_only: bool,
}

impl FilterSet {
    pub fn is_unconstrained(&self) -> bool {
        self == &Self::default()
    }
}

/// Single inclusion test combining every active predicate by logical AND.
pub fn matches(task: &Task, filters: &FilterSet, current_user: Option<&str>) -> bool {
    if let Some(needle) = &filters.text {
        let needle = needle.to_lowercase();
        if !needle.is_empty() {
            let in_name = task.name.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }
    }

    if !filters.priorities.is_empty() && !filters.priorities.contains(&task.priority) {
        return false;
    }

    if let Some((from, to)) = filters.due_between {
        match task.due_date {
            Some(due) if due >= from && due <= to => {}
            _ => return false,
        }
    }

    if !filters.assignees.is_empty()
        && !filters.assignees.iter().any(|id| task.has_assignee(id))
    {
        return false;
    }

    if filters.mine_only {
        match current_user {
            Some(user_id) if task.has_assignee(user_id) => {}
            _ => return false,
        }
    }

    true
}

/// Filter a rendered task list. Read-only; the store is untouched.
pub fn apply<'a>(
    tasks: &[&'a Task],
    filters: &FilterSet,
    current_user: Option<&str>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .copied()
        .filter(|task| matches(task, filters, current_user))
        .collect()
}
