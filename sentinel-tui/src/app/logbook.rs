use super::*;
use crate::types::Log;

pub const EMPTY_QUERY: &str = "Type an activity name first";
pub const NO_MATCH: &str = "No match";
pub const ALREADY_LOGGED: &str = "Already logged";
pub const UNDONE: &str = "Undone";

impl App {
    /// Check the current query against today's snapshot. When it names an
    /// unlogged activity, mark that activity in flight and hand back the write.
    pub fn begin_log(&mut self) -> Option<LogRequest> {
        let query = self.command_input.value.clone();
        if query.trim().is_empty() {
            self.show_toast(EMPTY_QUERY);
            return None;
        }

        let Some(activity) = resolve(&query, &self.snapshot.activities).cloned() else {
            self.show_toast(NO_MATCH);
            return None;
        };

        if self.snapshot.is_logged(&activity.id) || self.pending_logs.contains(&activity.id) {
            self.show_toast(ALREADY_LOGGED);
            return None;
        }

        self.pending_logs.insert(activity.id.clone());
        Some(LogRequest {
            activity_id: activity.id,
            activity_name: activity.name,
            query,
            date: self.snapshot.date,
        })
    }

    pub fn finish_log(&mut self, request: &LogRequest, result: Result<Log, String>) {
        self.pending_logs.remove(&request.activity_id);
        match result {
            Ok(log) => {
                self.last_log_id = Some(log.id.clone());
                if self.snapshot.date == request.date {
                    self.snapshot.record_log(log);
                }
                // Whatever the user typed since submitting stays.
                if self.command_input.value == request.query {
                    self.command_input.clear();
                }
                self.show_toast(format!("Logged {}. Ctrl+Z to undo", request.activity_name));
            }
            Err(e) => {
                self.show_error(format!("Could not log {}: {}", request.activity_name, e));
            }
        }
    }

    /// Take the undo target. `None` means there is nothing to undo.
    pub fn begin_undo(&mut self) -> Option<String> {
        self.last_log_id.take()
    }

    pub fn finish_undo(&mut self, log_id: &str, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.snapshot.forget_log(log_id);
                self.show_toast(UNDONE);
            }
            Err(e) => {
                if self.last_log_id.is_none() {
                    self.last_log_id = Some(log_id.to_string());
                }
                self.show_error(format!("Could not undo: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn log(id: &str, activity_id: &str) -> Log {
        Log {
            id: id.to_string(),
            activity_id: activity_id.to_string(),
            log_date: Some("2025-03-07".to_string()),
        }
    }

    fn toast_message(app: &App) -> &str {
        app.toast.as_ref().map(|t| t.message.as_str()).unwrap_or("")
    }

    #[test]
    fn log_resolves_first_match_and_marks_pending() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("re");

        let request = app.begin_log().expect("request");
        assert_eq!(request.activity_id, "a-read");
        assert_eq!(request.query, "re");
        assert_eq!(request.date, TODAY);
        assert!(app.pending_logs.contains("a-read"));
    }

    #[test]
    fn blank_query_is_rejected_without_request() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("  ");
        assert!(app.begin_log().is_none());
        assert_eq!(toast_message(&app), EMPTY_QUERY);
    }

    #[test]
    fn unmatched_query_shows_no_match() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("swim");
        assert!(app.begin_log().is_none());
        assert_eq!(toast_message(&app), NO_MATCH);
        assert!(app.pending_logs.is_empty());
    }

    #[test]
    fn second_log_while_first_in_flight_is_rejected() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("run");
        assert!(app.begin_log().is_some());
        assert!(app.begin_log().is_none());
        assert_eq!(toast_message(&app), ALREADY_LOGGED);
    }

    #[test]
    fn logged_activity_is_rejected() {
        let mut app = habits_app();
        app.snapshot.logs.push(log("l0", "a-read"));
        app.command_input = TextInput::from_str("re");
        assert!(app.begin_log().is_none());
        assert_eq!(toast_message(&app), ALREADY_LOGGED);
    }

    #[test]
    fn success_records_undo_target_and_clears_input() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("re");
        let request = app.begin_log().expect("request");

        app.finish_log(&request, Ok(log("l1", "a-read")));

        assert_eq!(app.last_log_id.as_deref(), Some("l1"));
        assert!(app.snapshot.is_logged("a-read"));
        assert!(app.command_input.value.is_empty());
        assert!(app.pending_logs.is_empty());
        assert_eq!(toast_message(&app), "Logged Read. Ctrl+Z to undo");
    }

    #[test]
    fn success_keeps_input_typed_after_submit() {
        let mut app = habits_app();
        app.command_input = TextInput::from_str("re");
        let request = app.begin_log().expect("request");
        app.command_input.insert('f');

        app.finish_log(&request, Ok(log("l1", "a-read")));

        assert_eq!(app.command_input.value, "ref");
    }

    #[test]
    fn failure_releases_pending_and_keeps_undo_target() {
        let mut app = habits_app();
        app.last_log_id = Some("older".to_string());
        app.command_input = TextInput::from_str("run");
        let request = app.begin_log().expect("request");

        app.finish_log(&request, Err("service rejected".to_string()));

        assert_eq!(app.last_log_id.as_deref(), Some("older"));
        assert!(app.pending_logs.is_empty());
        assert_eq!(app.command_input.value, "run");
        let toast = app.toast.as_ref().expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[test]
    fn undo_consumes_target_once() {
        let mut app = habits_app();
        app.last_log_id = Some("l1".to_string());
        app.snapshot.logs.push(log("l1", "a-read"));

        let target = app.begin_undo().expect("target");
        app.finish_undo(&target, Ok(()));

        assert!(!app.snapshot.is_logged("a-read"));
        assert_eq!(toast_message(&app), UNDONE);
        assert!(app.begin_undo().is_none());
    }

    #[test]
    fn failed_undo_restores_target() {
        let mut app = habits_app();
        app.last_log_id = Some("l1".to_string());

        let target = app.begin_undo().expect("target");
        app.finish_undo(&target, Err("offline".to_string()));

        assert_eq!(app.last_log_id.as_deref(), Some("l1"));
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn failed_undo_does_not_clobber_newer_log() {
        let mut app = habits_app();
        app.last_log_id = Some("l1".to_string());
        let target = app.begin_undo().expect("target");
        app.last_log_id = Some("l2".to_string());

        app.finish_undo(&target, Err("offline".to_string()));

        assert_eq!(app.last_log_id.as_deref(), Some("l2"));
    }
}
