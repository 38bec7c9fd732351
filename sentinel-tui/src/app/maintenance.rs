use super::*;
use crate::time_utils::{days_between, parse_date};
use crate::types::MaintenanceTask;

pub const COMPLETED: &str = "Completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DueGroup {
    Overdue,
    DueToday,
    Upcoming,
}

impl DueGroup {
    pub fn title(self) -> &'static str {
        match self {
            DueGroup::Overdue => "Overdue",
            DueGroup::DueToday => "Due today",
            DueGroup::Upcoming => "Upcoming",
        }
    }
}

/// Group and day offset of a task. Undated tasks sort as upcoming with no offset.
pub fn due_group(task: &MaintenanceTask, today: Date) -> (DueGroup, Option<i64>) {
    match task.next_due_date.as_deref().and_then(parse_date) {
        Some(due) => {
            let days = days_between(today, due);
            let group = match days {
                d if d < 0 => DueGroup::Overdue,
                0 => DueGroup::DueToday,
                _ => DueGroup::Upcoming,
            };
            (group, Some(days))
        }
        None => (DueGroup::Upcoming, None),
    }
}

impl MaintenanceState {
    /// Tasks in display order: overdue, due today, upcoming. Within a group the
    /// service order (by due date, undated last) is kept.
    pub fn rows(&self, today: Date) -> Vec<(DueGroup, Option<i64>, &MaintenanceTask)> {
        let mut rows: Vec<_> = self
            .tasks
            .iter()
            .map(|task| {
                let (group, days) = due_group(task, today);
                (group, days, task)
            })
            .collect();
        rows.sort_by_key(|(group, _, _)| *group);
        rows
    }
}

impl App {
    pub fn apply_maintenance(&mut self, result: Result<Vec<MaintenanceTask>, String>) {
        self.maintenance.is_loading = false;
        match result {
            Ok(tasks) => {
                self.maintenance.tasks = tasks;
                let len = self.maintenance.tasks.len();
                if self.maintenance.selected >= len {
                    self.maintenance.selected = len.saturating_sub(1);
                }
            }
            Err(e) => self.show_error(format!("Could not load maintenance tasks: {}", e)),
        }
    }

    pub fn maintenance_select_next(&mut self) {
        let len = self.maintenance.tasks.len();
        if len > 0 && self.maintenance.selected + 1 < len {
            self.maintenance.selected += 1;
        }
    }

    pub fn maintenance_select_previous(&mut self) {
        self.maintenance.selected = self.maintenance.selected.saturating_sub(1);
    }

    pub fn begin_complete_task(&mut self) -> Option<CompleteRequest> {
        let today = self.snapshot.date;
        let (group, task) = self
            .maintenance
            .rows(today)
            .get(self.maintenance.selected)
            .map(|(group, _, task)| (*group, (*task).clone()))?;

        if group == DueGroup::Upcoming {
            self.show_toast("Not due yet");
            return None;
        }
        if !self.maintenance.completing.insert(task.id.clone()) {
            return None;
        }
        Some(CompleteRequest {
            task_id: task.id,
            task_name: task.name,
        })
    }

    pub fn finish_complete_task(&mut self, request: &CompleteRequest, result: Result<(), String>) {
        self.maintenance.completing.remove(&request.task_id);
        match result {
            Ok(()) => self.show_toast(COMPLETED),
            Err(e) => self.show_error(format!("Could not complete {}: {}", request.task_name, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::Recurrence;

    fn task(id: &str, due: Option<&str>) -> MaintenanceTask {
        MaintenanceTask {
            id: id.to_string(),
            name: id.to_string(),
            next_due_date: due.map(str::to_string),
            last_completed_at: None,
            recurrence: Recurrence::Weekly,
            recurrence_interval: None,
        }
    }

    fn maintenance_app() -> App {
        let mut app = habits_app();
        app.apply_maintenance(Ok(vec![
            task("passport", Some("2025-04-16")),
            task("haircut", Some("2025-03-04")),
            task("plants", Some("2025-03-07")),
            task("someday", None),
        ]));
        app
    }

    #[test]
    fn due_groups_follow_today() {
        let today = TODAY;
        assert_eq!(
            due_group(&task("a", Some("2025-03-05")), today),
            (DueGroup::Overdue, Some(-2))
        );
        assert_eq!(
            due_group(&task("a", Some("2025-03-07")), today),
            (DueGroup::DueToday, Some(0))
        );
        assert_eq!(
            due_group(&task("a", Some("2025-03-10T00:00:00Z")), today),
            (DueGroup::Upcoming, Some(3))
        );
        assert_eq!(due_group(&task("a", None), today), (DueGroup::Upcoming, None));
    }

    #[test]
    fn rows_are_grouped_in_display_order() {
        let app = maintenance_app();
        let ids: Vec<&str> = app
            .maintenance
            .rows(TODAY)
            .iter()
            .map(|(_, _, task)| task.id.as_str())
            .collect();
        assert_eq!(ids, vec!["haircut", "plants", "passport", "someday"]);
    }

    #[test]
    fn completing_overdue_task_builds_request_once() {
        let mut app = maintenance_app();
        let request = app.begin_complete_task().expect("request");
        assert_eq!(request.task_id, "haircut");
        assert!(app.begin_complete_task().is_none(), "already in flight");

        app.finish_complete_task(&request, Ok(()));
        assert!(app.maintenance.completing.is_empty());
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(COMPLETED));
    }

    #[test]
    fn upcoming_task_cannot_be_completed() {
        let mut app = maintenance_app();
        app.maintenance_select_next();
        app.maintenance_select_next();
        assert!(app.begin_complete_task().is_none());
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Not due yet")
        );
    }

    #[test]
    fn reload_clamps_selection() {
        let mut app = maintenance_app();
        for _ in 0..10 {
            app.maintenance_select_next();
        }
        assert_eq!(app.maintenance.selected, 3);
        app.apply_maintenance(Ok(vec![task("plants", Some("2025-03-07"))]));
        assert_eq!(app.maintenance.selected, 0);
    }
}
