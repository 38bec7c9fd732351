use crate::api::{ServiceError, Store};
use crate::app::{App, ForgeRequest};
use crate::snapshot::load_snapshot;
use crate::time_utils::today_local;
use crate::types::Identity;

use super::action_queue::{enqueue_action, Action, ActionTx, Outcome, OutcomeTx};

/// What an action needs to talk to the outside world.
#[derive(Clone)]
pub struct Services {
    pub store: Store,
    pub user: Identity,
}

impl Services {
    pub fn new(store: Store, user: Identity) -> Self {
        Self { store, user }
    }
}

/// Run the action on its own task; the outcome comes back through `outcome_tx`.
pub(super) fn spawn_action(action: Action, services: &Services, outcome_tx: &OutcomeTx) {
    let services = services.clone();
    let outcome_tx = outcome_tx.clone();
    tokio::spawn(async move {
        let outcome = perform(action, &services).await;
        let _ = outcome_tx.send(outcome);
    });
}

fn settle<T>(operation: &'static str, result: Result<T, ServiceError>) -> Result<T, String> {
    result.map_err(|e| {
        tracing::error!(operation, error = %e, "service call failed");
        e.to_string()
    })
}

pub(super) async fn perform(action: Action, services: &Services) -> Outcome {
    let store = &services.store;
    match action {
        Action::ReloadSnapshot => {
            Outcome::SnapshotLoaded(load_snapshot(store, &services.user.id, today_local()).await)
        }
        Action::LogActivity(request) => {
            let result = store
                .insert_log(&services.user.id, &request.activity_id, request.date)
                .await;
            if result.is_ok() {
                tracing::info!(activity_id = %request.activity_id, "activity logged");
            }
            Outcome::Logged {
                result: settle("log activity", result),
                request,
            }
        }
        Action::UndoLog { log_id } => {
            let result = settle("undo log", store.delete_log(&log_id).await);
            Outcome::Undone { log_id, result }
        }
        Action::SaveEdit(request) => {
            let result = store
                .update_activity(&request.activity_id, &request.patch)
                .await;
            Outcome::EditSaved {
                result: settle("save activity", result),
                request,
            }
        }
        Action::DeleteActivity(request) => {
            let result = store.delete_activity(&request.activity_id).await;
            if result.is_ok() {
                tracing::info!(activity_id = %request.activity_id, "activity deleted");
            }
            Outcome::Deleted {
                result: settle("delete activity", result),
                request,
            }
        }
        Action::Create(request) => {
            let result = match &request {
                ForgeRequest::Habit(habit) => store.create_activity(habit).await.map(|_| ()),
                ForgeRequest::Task(task) => store.create_maintenance_task(task).await.map(|_| ()),
            };
            Outcome::Created {
                result: settle("create", result),
                request,
            }
        }
        Action::LoadMaintenance => Outcome::MaintenanceLoaded(settle(
            "load maintenance tasks",
            store.maintenance_tasks().await,
        )),
        Action::CompleteTask(request) => {
            let result = store.complete_maintenance_task(&request.task_id).await;
            Outcome::TaskCompleted {
                result: settle("complete task", result),
                request,
            }
        }
    }
}

/// Fold an outcome into `App`. Every mutation, failed or not, is followed by a
/// full reload of whatever it touched.
pub(super) fn apply_outcome(outcome: Outcome, app: &mut App, action_tx: &ActionTx) {
    match outcome {
        Outcome::SnapshotLoaded(snapshot) => app.apply_snapshot(snapshot),
        Outcome::Logged { request, result } => {
            app.finish_log(&request, result);
            enqueue_action(action_tx, Action::ReloadSnapshot);
        }
        Outcome::Undone { log_id, result } => {
            app.finish_undo(&log_id, result);
            enqueue_action(action_tx, Action::ReloadSnapshot);
        }
        Outcome::EditSaved { request, result } => {
            app.finish_save_edit(&request, result);
            enqueue_action(action_tx, Action::ReloadSnapshot);
        }
        Outcome::Deleted { request, result } => {
            app.finish_delete(&request, result);
            enqueue_action(action_tx, Action::ReloadSnapshot);
        }
        Outcome::Created { request, result } => {
            app.finish_forge_submit(&request, result);
            match request {
                ForgeRequest::Habit(_) => enqueue_action(action_tx, Action::ReloadSnapshot),
                ForgeRequest::Task(_) => enqueue_action(action_tx, Action::LoadMaintenance),
            }
        }
        Outcome::MaintenanceLoaded(result) => app.apply_maintenance(result),
        Outcome::TaskCompleted { request, result } => {
            app.finish_complete_task(&request, result);
            enqueue_action(action_tx, Action::LoadMaintenance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DevBackend;
    use crate::app::{Mode, TextInput, ToastKind, View};
    use crate::types::Importance;
    use std::sync::Arc;
    use std::time::Instant;

    use super::super::action_queue::channel;

    fn services(dev: &DevBackend) -> Services {
        Services::new(
            Store::new(Arc::new(dev.clone())),
            Identity {
                id: crate::api::dev_backend::DEV_USER_ID.to_string(),
                email: None,
            },
        )
    }

    /// Run an action and everything it queues until the queue is empty.
    async fn drive(app: &mut App, services: &Services, first: Action) {
        let (tx, mut rx) = channel();
        enqueue_action(&tx, first);
        while let Ok(action) = rx.try_recv() {
            let outcome = perform(action, services).await;
            apply_outcome(outcome, app, &tx);
        }
    }

    async fn loaded_app(services: &Services) -> App {
        let mut app = App::new(services.user.clone(), today_local());
        drive(&mut app, services, Action::ReloadSnapshot).await;
        app
    }

    /// Read, Run and Reflect with no logs.
    fn three_habits() -> DevBackend {
        DevBackend::empty()
            .with_activity("Read", Importance::Medium, 7)
            .with_activity("Run", Importance::High, 7)
            .with_activity("Reflect", Importance::Low, 7)
    }

    async fn submit(app: &mut App, services: &Services, query: &str) {
        app.command_input = TextInput::from_str(query);
        if let Some(request) = app.begin_log() {
            drive(app, services, Action::LogActivity(request)).await;
        }
    }

    fn toast(app: &App) -> String {
        app.toast
            .as_ref()
            .map(|t| t.message.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn logging_first_match_then_repeat_is_rejected() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        let names: Vec<&str> = app
            .snapshot
            .activities
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Read", "Reflect", "Run"]);

        submit(&mut app, &services, "re").await;
        assert_eq!(toast(&app), "Logged Read. Ctrl+Z to undo");
        assert!(app.command_input.value.is_empty());
        let read_id = app.snapshot.activities[0].id.clone();
        assert!(app.snapshot.is_logged(&read_id));

        submit(&mut app, &services, "re").await;
        assert_eq!(toast(&app), "Already logged");
        assert_eq!(dev.rows("logs").len(), 1);
    }

    #[tokio::test]
    async fn undo_restores_logged_count() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        let before = app.snapshot.logged_count();

        submit(&mut app, &services, "run").await;
        assert_eq!(app.snapshot.logged_count(), before + 1);

        let log_id = app.begin_undo().expect("undo target");
        drive(&mut app, &services, Action::UndoLog { log_id }).await;
        assert_eq!(app.snapshot.logged_count(), before);
        assert!(dev.rows("logs").is_empty());
        assert!(app.begin_undo().is_none(), "second undo is a no-op");
    }

    #[tokio::test]
    async fn editing_frequency_is_visible_after_reload() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        assert_eq!(app.snapshot.activities[0].target_frequency, 7);

        assert!(app.start_edit());
        for _ in 0..3 {
            app.edit_next_field();
        }
        app.edit_input_char('3');
        let request = app.begin_save_edit().expect("request");
        drive(&mut app, &services, Action::SaveEdit(request)).await;

        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.snapshot.activities[0].target_frequency, 3);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_activity_and_its_log() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        submit(&mut app, &services, "read").await;

        let now = Instant::now();
        assert!(app.request_delete(now).is_none());
        let request = app.request_delete(now).expect("second press");
        drive(&mut app, &services, Action::DeleteActivity(request)).await;

        assert_eq!(app.snapshot.activities.len(), 2);
        assert!(dev.rows("logs").is_empty());
        assert!(app.last_log_id.is_none());
        assert_eq!(toast(&app), "Deleted Read");
    }

    #[tokio::test]
    async fn rejected_write_raises_error_toast_and_reloads() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        dev.set_reject_writes(true);

        submit(&mut app, &services, "run").await;

        let shown = app.toast.as_ref().expect("toast");
        assert_eq!(shown.kind, ToastKind::Error);
        assert!(shown.message.starts_with("Could not log Run"));
        assert!(app.pending_logs.is_empty());
        assert!(app.last_log_id.is_none());
        assert_eq!(app.command_input.value, "run");
    }

    #[tokio::test]
    async fn created_habit_appears_in_command_center() {
        let dev = three_habits();
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        app.navigate_to(View::Forge);
        for c in "Journal".chars() {
            app.forge_input_char(c);
        }

        let request = app.begin_forge_submit().expect("request");
        drive(&mut app, &services, Action::Create(request)).await;

        assert_eq!(toast(&app), "Habit created");
        assert!(app.snapshot.activities.iter().any(|a| a.name == "Journal"));
    }

    #[tokio::test]
    async fn completing_due_task_reschedules_it() {
        let dev = DevBackend::empty().with_maintenance_task(
            "Water plants",
            crate::types::Recurrence::CustomDays,
            Some(3),
            today_local(),
        );
        let services = services(&dev);
        let mut app = loaded_app(&services).await;
        app.navigate_to(View::Maintenance);
        drive(&mut app, &services, Action::LoadMaintenance).await;
        assert!(!app.maintenance.is_loading);
        assert_eq!(app.maintenance.tasks.len(), 1);

        let request = app.begin_complete_task().expect("due today");
        drive(&mut app, &services, Action::CompleteTask(request)).await;

        assert_eq!(toast(&app), "Completed");
        let due = app.maintenance.tasks[0].next_due_date.clone();
        assert_eq!(
            due.as_deref(),
            Some(crate::time_utils::format_date(crate::time_utils::add_days(today_local(), 3)).as_str())
        );
    }
}
