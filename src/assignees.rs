//! Assignee selection surface.
//!
//! Presents the project member universe as a multi-select. The selection is
//! local until confirmed; confirmation produces a single total-replacement
//! patch (the whole assignee set, never an incremental add/remove) that
//! goes through the normal task update pathway.

use std::collections::HashSet;

use crate::model::{Profile, Task, TaskPatch};

/// A pending assignee selection, distinct from the task's persisted set.
#[derive(Debug, Clone)]
pub struct AssigneeSelection {
    universe: Vec<Profile>,
    selected: HashSet<String>,
}

impl AssigneeSelection {
    /// An empty selection over the member universe.
    pub fn new(universe: Vec<Profile>) -> Self {
        Self {
            universe,
            selected: HashSet::new(),
        }
    }

    /// Seeded with a task's current assignees, for editing.
    pub fn for_task(task: &Task, universe: Vec<Profile>) -> Self {
        let mut selection = Self::new(universe);
        for assignee in &task.assignees {
            if selection.universe.iter().any(|m| m.id == assignee.id) {
                selection.selected.insert(assignee.id.clone());
            }
        }
        selection
    }

    pub fn universe(&self) -> &[Profile] {
        &self.universe
    }

    /// Flip one member in or out. Ids outside the universe are ignored;
    /// returns whether the id is selected afterwards.
    pub fn toggle(&mut self, member_id: &str) -> bool {
        if !self.universe.iter().any(|m| m.id == member_id) {
            return false;
        }
        if !self.selected.remove(member_id) {
            self.selected.insert(member_id.to_string());
        }
        self.selected.contains(member_id)
    }

    pub fn select(&mut self, member_id: &str) {
        if self.universe.iter().any(|m| m.id == member_id) {
            self.selected.insert(member_id.to_string());
        }
    }

    pub fn is_selected(&self, member_id: &str) -> bool {
        self.selected.contains(member_id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in universe order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.universe
            .iter()
            .filter(|m| self.selected.contains(&m.id))
            .map(|m| m.id.clone())
            .collect()
    }

    /// Confirm the selection: a patch replacing the task's entire assignee
    /// set with the resolved profiles. An empty selection clears the set.
    pub fn confirm(self) -> TaskPatch {
        let assignees = self
            .universe
            .iter()
            .filter(|m| self.selected.contains(&m.id))
            .cloned()
            .collect();
        TaskPatch::assignees(assignees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::status::Status;

    fn member(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("member {id}"),
            avatar_url: None,
        }
    }

    fn universe() -> Vec<Profile> {
        vec![member("u1"), member("u2"), member("u3")]
    }

    #[test]
    fn toggle_flips_membership_and_ignores_strangers() {
        let mut selection = AssigneeSelection::new(universe());
        assert!(selection.toggle("u1"));
        assert!(!selection.toggle("u1"));
        assert!(!selection.toggle("ghost"));
        assert!(!selection.is_selected("ghost"));
    }

    #[test]
    fn for_task_seeds_from_current_assignees() {
        let task = Task {
            id: "t1".to_string(),
            project_id: "p1".to_string(),
            name: "Staffed".to_string(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            started_at: None,
            due_date: None,
            assignees: vec![member("u2")],
            comment_count: 0,
        };
        let selection = AssigneeSelection::for_task(&task, universe());
        assert!(selection.is_selected("u2"));
        assert!(!selection.is_selected("u1"));
    }

    #[test]
    fn confirm_produces_a_total_replacement() {
        let mut selection = AssigneeSelection::new(universe());
        selection.select("u3");
        selection.select("u1");

        let patch = selection.confirm();
        let ids: Vec<String> = patch
            .assignees
            .as_ref()
            .unwrap()
            .iter()
            .map(|a| a.id.clone())
            .collect();
        // Exactly the selected set, in universe order; nothing merged in.
        assert_eq!(ids, vec!["u1".to_string(), "u3".to_string()]);
        assert!(patch.status.is_none());
    }

    #[test]
    fn confirming_an_empty_selection_clears_the_set() {
        let patch = AssigneeSelection::new(universe()).confirm();
        assert_eq!(patch.assignees, Some(Vec::new()));
    }
}
