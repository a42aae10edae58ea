//! Drag gestures and the mutations they propose.
//!
//! Two gesture families terminate in the same primitive, a partial
//! [`TaskPatch`] handed to the mutation controller: dropping a Kanban card
//! on a column, and moving or resizing a Gantt bar over a time axis.
//!
//! Dates are canonicalized to the local calendar day, never an instant, so
//! a bar redrawn in another timezone cannot shift by a day.

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::model::{Task, TaskPatch};
use crate::status::Status;

/// Interpret a card drop. Dropping a card back into its own column is an
/// explicit no-op: no patch, no store write, no persistence call.
pub fn card_drop(source: Status, target: Status) -> Option<TaskPatch> {
    if source == target {
        return None;
    }
    Some(TaskPatch::status(target))
}

/// Canonical date for a pointer instant: the local calendar day.
pub fn local_day(instant: DateTime<Local>) -> NaiveDate {
    instant.date_naive()
}

/// Maps pointer x-offsets on the timeline to calendar days.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    pub origin: NaiveDate,
    pub day_px: f64,
}

impl TimeAxis {
    pub fn new(origin: NaiveDate, day_px: f64) -> Self {
        Self { origin, day_px }
    }

    /// The day under an x-offset from the axis origin. Offsets left of the
    /// origin resolve to earlier days.
    pub fn day_at(&self, offset_px: f64) -> NaiveDate {
        let days = (offset_px / self.day_px).floor() as i64;
        self.origin + Duration::days(days)
    }
}

/// What part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grip {
    /// The bar body: both dates shift, the span is preserved.
    Bar,
    /// The left edge: only `started_at` follows the pointer.
    StartEdge,
    /// The right edge: only `due_date` follows the pointer.
    DueEdge,
}

/// An in-flight Gantt drag. Cancelable until dropped; only `drop` can
/// propose a mutation.
///
/// A resize may cross the opposite edge and produce a backwards interval;
/// the proposal is passed through as-is and the persistence layer is the
/// arbiter.
#[derive(Debug, Clone)]
pub struct GanttDrag {
    grip: Grip,
    started_at: NaiveDate,
    due_date: NaiveDate,
    grab_day: NaiveDate,
    pointer_day: NaiveDate,
}

impl GanttDrag {
    /// Start a drag on a task's bar. Tasks without both dates have no bar
    /// to grab.
    pub fn grab(task: &Task, grip: Grip, pointer_day: NaiveDate) -> Option<Self> {
        let started_at = task.started_at?;
        let due_date = task.due_date?;
        Some(Self {
            grip,
            started_at,
            due_date,
            grab_day: pointer_day,
            pointer_day,
        })
    }

    /// Track the pointer. May be called any number of times before the
    /// gesture ends.
    pub fn drag_to(&mut self, pointer_day: NaiveDate) {
        self.pointer_day = pointer_day;
    }

    /// The dates the bar would have if dropped now.
    pub fn preview(&self) -> (NaiveDate, NaiveDate) {
        match self.grip {
            Grip::Bar => {
                let delta = self.pointer_day.signed_duration_since(self.grab_day);
                (self.started_at + delta, self.due_date + delta)
            }
            Grip::StartEdge => (self.pointer_day, self.due_date),
            Grip::DueEdge => (self.started_at, self.pointer_day),
        }
    }

    /// Abandon the gesture. No mutation is proposed.
    pub fn cancel(self) {}

    /// End the gesture. Returns `None` when nothing moved.
    pub fn drop(self) -> Option<TaskPatch> {
        let (started_at, due_date) = self.preview();
        if started_at == self.started_at && due_date == self.due_date {
            return None;
        }
        Some(TaskPatch::dates(started_at, due_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_with_dates(started: NaiveDate, due: NaiveDate) -> Task {
        Task {
            id: "t1".to_string(),
            project_id: "p1".to_string(),
            name: "Bar".to_string(),
            description: None,
            status: Status::InProgress,
            priority: Priority::Medium,
            started_at: Some(started),
            due_date: Some(due),
            assignees: Vec::new(),
            comment_count: 0,
        }
    }

    #[test]
    fn dropping_a_card_in_its_own_column_proposes_nothing() {
        assert!(card_drop(Status::Todo, Status::Todo).is_none());
    }

    #[test]
    fn dropping_a_card_elsewhere_proposes_a_status_patch() {
        let patch = card_drop(Status::Todo, Status::InProgress).unwrap();
        assert_eq!(patch.status, Some(Status::InProgress));
        assert!(patch.started_at.is_none());
    }

    #[test]
    fn bar_move_preserves_the_span() {
        // Five-day span shifted two days right.
        let task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        let mut drag = GanttDrag::grab(&task, Grip::Bar, day(2025, 1, 10)).unwrap();
        drag.drag_to(day(2025, 1, 12));
        let patch = drag.drop().unwrap();
        assert_eq!(patch.started_at, Some(day(2025, 1, 12)));
        assert_eq!(patch.due_date, Some(day(2025, 1, 17)));
    }

    #[test]
    fn edge_resize_moves_only_one_date() {
        let task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        let mut drag = GanttDrag::grab(&task, Grip::DueEdge, day(2025, 1, 15)).unwrap();
        drag.drag_to(day(2025, 1, 20));
        let patch = drag.drop().unwrap();
        assert_eq!(patch.started_at, Some(day(2025, 1, 10)));
        assert_eq!(patch.due_date, Some(day(2025, 1, 20)));
    }

    #[test]
    fn backwards_interval_is_passed_through() {
        let task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        let mut drag = GanttDrag::grab(&task, Grip::DueEdge, day(2025, 1, 15)).unwrap();
        drag.drag_to(day(2025, 1, 5));
        let patch = drag.drop().unwrap();
        assert_eq!(patch.started_at, Some(day(2025, 1, 10)));
        assert_eq!(patch.due_date, Some(day(2025, 1, 5)));
    }

    #[test]
    fn dropping_without_movement_proposes_nothing() {
        let task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        let drag = GanttDrag::grab(&task, Grip::Bar, day(2025, 1, 10)).unwrap();
        assert!(drag.drop().is_none());
    }

    #[test]
    fn cancel_discards_the_gesture() {
        let task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        let mut drag = GanttDrag::grab(&task, Grip::Bar, day(2025, 1, 10)).unwrap();
        drag.drag_to(day(2025, 2, 1));
        drag.cancel();
        // Nothing to assert beyond the move: cancel consumes the session,
        // so no patch can be produced from it.
    }

    #[test]
    fn bars_need_both_dates() {
        let mut task = task_with_dates(day(2025, 1, 10), day(2025, 1, 15));
        task.due_date = None;
        assert!(GanttDrag::grab(&task, Grip::Bar, day(2025, 1, 10)).is_none());
    }

    #[test]
    fn axis_maps_offsets_to_days_with_floor() {
        let axis = TimeAxis::new(day(2025, 1, 10), 24.0);
        assert_eq!(axis.day_at(0.0), day(2025, 1, 10));
        assert_eq!(axis.day_at(23.9), day(2025, 1, 10));
        assert_eq!(axis.day_at(24.0), day(2025, 1, 11));
        assert_eq!(axis.day_at(-0.1), day(2025, 1, 9));
    }
}
