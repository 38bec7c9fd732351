use super::*;
use crate::api::dto::ActivityPatch;
use crate::types::{clamp_frequency, MAX_TARGET_FREQUENCY, MIN_TARGET_FREQUENCY};

pub const EMPTY_NAME: &str = "Name cannot be empty";

impl App {
    /// Open the inline editor on the selected row. Returns false if there is no row or
    /// an edit is already open.
    pub fn start_edit(&mut self) -> bool {
        if self.edit_state.is_some() {
            return false;
        }
        let Some(draft) = self.selected_activity().map(EditState::from_activity) else {
            return false;
        };
        self.edit_state = Some(draft);
        self.delete_confirm = None;
        true
    }

    /// Drop the draft without persisting anything
    pub fn cancel_edit(&mut self) {
        self.edit_state = None;
    }

    pub fn edit_next_field(&mut self) {
        if let Some(edit) = &mut self.edit_state {
            edit.focused_field = edit.focused_field.next();
        }
    }

    pub fn edit_previous_field(&mut self) {
        if let Some(edit) = &mut self.edit_state {
            edit.focused_field = edit.focused_field.previous();
        }
    }

    pub fn edit_input_char(&mut self, c: char) {
        let Some(edit) = &mut self.edit_state else {
            return;
        };
        match edit.focused_field {
            EditField::Name | EditField::Description => {
                if let Some(input) = edit.focused_text() {
                    input.insert(c);
                }
            }
            EditField::Frequency => {
                if let Some(digit) = c.to_digit(10) {
                    let digit = digit as u8;
                    if (MIN_TARGET_FREQUENCY..=MAX_TARGET_FREQUENCY).contains(&digit) {
                        edit.target_frequency = digit;
                    }
                }
            }
            EditField::Importance => {}
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Some(input) = self.edit_state.as_mut().and_then(EditState::focused_text) {
            input.backspace();
        }
    }

    /// Left/Right: move the cursor in text fields, step the value otherwise
    pub fn edit_step(&mut self, forward: bool) {
        let Some(edit) = &mut self.edit_state else {
            return;
        };
        match edit.focused_field {
            EditField::Name | EditField::Description => {
                if let Some(input) = edit.focused_text() {
                    if forward {
                        input.move_right();
                    } else {
                        input.move_left();
                    }
                }
            }
            EditField::Importance => {
                edit.importance = if forward {
                    edit.importance.raise()
                } else {
                    edit.importance.lower()
                };
            }
            EditField::Frequency => {
                let delta = if forward { 1 } else { -1 };
                edit.target_frequency = clamp_frequency(edit.target_frequency as i32 + delta);
            }
        }
    }

    pub fn edit_cursor_home_end(&mut self, home: bool) {
        if let Some(input) = self.edit_state.as_mut().and_then(EditState::focused_text) {
            if home {
                input.home();
            } else {
                input.end();
            }
        }
    }

    /// Validate the draft and hand back the patch to persist. The draft stays open
    /// until the write succeeds.
    pub fn begin_save_edit(&mut self) -> Option<EditRequest> {
        let edit = self.edit_state.as_ref()?;
        if edit.saving {
            return None;
        }

        let name = edit.name.value.trim().to_string();
        if name.is_empty() {
            self.show_error(EMPTY_NAME);
            return None;
        }
        let description = edit.description.value.trim();
        let request = EditRequest {
            activity_id: edit.activity_id.clone(),
            patch: ActivityPatch {
                name,
                description: (!description.is_empty()).then(|| description.to_string()),
                importance: edit.importance,
                target_frequency: clamp_frequency(edit.target_frequency as i32),
            },
        };

        if let Some(edit) = &mut self.edit_state {
            edit.saving = true;
        }
        Some(request)
    }

    pub fn finish_save_edit(&mut self, request: &EditRequest, result: Result<(), String>) {
        let is_current =
            matches!(&self.edit_state, Some(edit) if edit.activity_id == request.activity_id);
        match result {
            Ok(()) => {
                if is_current {
                    self.edit_state = None;
                }
                self.show_toast(format!("Saved {}", request.patch.name));
            }
            Err(e) => {
                if is_current {
                    if let Some(edit) = &mut self.edit_state {
                        edit.saving = false;
                    }
                }
                self.show_error(format!("Could not save: {}", e));
            }
        }
    }

    /// Shift+D. The first press arms the selected row, a second press on the same row
    /// within the window returns the delete to perform.
    pub fn request_delete(&mut self, now: Instant) -> Option<DeleteRequest> {
        let activity = self.selected_activity()?.clone();

        let confirmed = matches!(
            &self.delete_confirm,
            Some(confirm) if confirm.activity_id == activity.id && confirm.is_live(now)
        );
        if confirmed {
            self.delete_confirm = None;
            return Some(DeleteRequest {
                activity_id: activity.id,
                activity_name: activity.name,
            });
        }

        self.delete_confirm = Some(DeleteConfirm {
            activity_id: activity.id,
            armed_at: now,
        });
        self.show_toast_at(
            format!("Press Shift+D again to delete {}", activity.name),
            ToastKind::Info,
            now,
        );
        None
    }

    pub fn expire_delete_confirm(&mut self, now: Instant) {
        if matches!(&self.delete_confirm, Some(confirm) if !confirm.is_live(now)) {
            self.delete_confirm = None;
        }
    }

    pub fn finish_delete(&mut self, request: &DeleteRequest, result: Result<(), String>) {
        match result {
            Ok(()) => {
                // Logs go with their activity, so the undo target may be gone too.
                let undo_target_removed = self.last_log_id.as_ref().is_some_and(|log_id| {
                    self.snapshot
                        .logs
                        .iter()
                        .any(|log| &log.id == log_id && log.activity_id == request.activity_id)
                });
                if undo_target_removed {
                    self.last_log_id = None;
                }
                self.snapshot
                    .activities
                    .retain(|activity| activity.id != request.activity_id);
                self.snapshot
                    .logs
                    .retain(|log| log.activity_id != request.activity_id);
                self.clamp_selection();
                self.show_toast(format!("Deleted {}", request.activity_name));
            }
            Err(e) => {
                self.show_error(format!("Could not delete {}: {}", request.activity_name, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::{Importance, Log};
    use std::time::Duration;

    fn draft(app: &App) -> &EditState {
        app.edit_state.as_ref().expect("editing")
    }

    #[test]
    fn edit_opens_on_selected_row_only_once() {
        let mut app = habits_app();
        app.select_next();
        assert!(app.start_edit());
        assert_eq!(draft(&app).activity_id, "a-reflect");
        assert_eq!(app.mode(), Mode::Editing);
        assert!(!app.start_edit(), "one edit at a time");
    }

    #[test]
    fn edit_on_empty_list_does_nothing() {
        let mut app = app_with(Vec::new());
        assert!(!app.start_edit());
        assert_eq!(app.mode(), Mode::Normal);
    }

    #[test]
    fn cancel_discards_draft() {
        let mut app = habits_app();
        app.start_edit();
        app.edit_input_char('x');
        app.cancel_edit();
        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.snapshot.activities[0].name, "Read");
    }

    #[test]
    fn frequency_steps_are_clamped() {
        let mut app = habits_app();
        app.start_edit();
        app.edit_next_field();
        app.edit_next_field();
        app.edit_next_field();
        assert_eq!(draft(&app).focused_field, EditField::Frequency);

        app.edit_step(true);
        assert_eq!(draft(&app).target_frequency, 7);
        app.edit_input_char('9');
        assert_eq!(draft(&app).target_frequency, 7);
        app.edit_input_char('1');
        app.edit_step(false);
        assert_eq!(draft(&app).target_frequency, 1);
    }

    #[test]
    fn importance_steps_through_levels() {
        let mut app = habits_app();
        app.start_edit();
        app.edit_previous_field();
        app.edit_previous_field();
        assert_eq!(draft(&app).focused_field, EditField::Importance);
        app.edit_step(true);
        app.edit_step(true);
        assert_eq!(draft(&app).importance, Importance::Critical);
        app.edit_step(true);
        assert_eq!(draft(&app).importance, Importance::Critical);
    }

    #[test]
    fn save_builds_trimmed_patch_and_keeps_draft_until_done() {
        let mut app = habits_app();
        app.start_edit();
        app.edit_input_char(' ');
        app.edit_next_field();
        app.edit_input_char(' ');

        let request = app.begin_save_edit().expect("request");
        assert_eq!(request.patch.name, "Read");
        assert_eq!(request.patch.description, None);
        assert!(draft(&app).saving);
        assert!(app.begin_save_edit().is_none(), "no double submit");

        app.finish_save_edit(&request, Ok(()));
        assert_eq!(app.mode(), Mode::Normal);
    }

    #[test]
    fn failed_save_keeps_draft_for_retry() {
        let mut app = habits_app();
        app.start_edit();
        app.edit_input_char('!');
        let request = app.begin_save_edit().expect("request");

        app.finish_save_edit(&request, Err("offline".to_string()));

        assert_eq!(draft(&app).name.value, "Read!");
        assert!(!draft(&app).saving);
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn blank_name_is_not_saved() {
        let mut app = habits_app();
        app.start_edit();
        for _ in 0..4 {
            app.edit_backspace();
        }
        assert!(app.begin_save_edit().is_none());
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(EMPTY_NAME));
    }

    #[test]
    fn delete_needs_two_presses_within_window() {
        let mut app = habits_app();
        let now = Instant::now();
        assert!(app.request_delete(now).is_none());
        assert!(app.delete_confirm.is_some());

        let request = app
            .request_delete(now + Duration::from_secs(2))
            .expect("confirmed");
        assert_eq!(request.activity_id, "a-read");
        assert!(app.delete_confirm.is_none());
    }

    #[test]
    fn late_second_press_rearms_instead_of_deleting() {
        let mut app = habits_app();
        let now = Instant::now();
        app.request_delete(now);
        let later = now + Duration::from_secs(4);
        assert!(app.request_delete(later).is_none());
        assert_eq!(
            app.delete_confirm.as_ref().map(|c| c.armed_at),
            Some(later)
        );
    }

    #[test]
    fn armed_delete_expires_on_tick() {
        let mut app = habits_app();
        let now = Instant::now();
        app.request_delete(now);
        app.tick(now + Duration::from_millis(3500));
        assert!(app.delete_confirm.is_none());
    }

    #[test]
    fn second_press_on_other_row_rearms() {
        let mut app = habits_app();
        let now = Instant::now();
        app.request_delete(now);
        app.select_next();
        assert!(app.request_delete(now).is_none());
        assert_eq!(
            app.delete_confirm.as_ref().map(|c| c.activity_id.as_str()),
            Some("a-reflect")
        );
    }

    #[test]
    fn successful_delete_removes_row_and_stale_undo_target() {
        let mut app = habits_app();
        app.selected_index = 2;
        app.snapshot.logs.push(Log {
            id: "l1".to_string(),
            activity_id: "a-run".to_string(),
            log_date: None,
        });
        app.last_log_id = Some("l1".to_string());
        let request = DeleteRequest {
            activity_id: "a-run".to_string(),
            activity_name: "Run".to_string(),
        };

        app.finish_delete(&request, Ok(()));

        assert_eq!(app.snapshot.activities.len(), 2);
        assert_eq!(app.selected_index, 1);
        assert!(app.last_log_id.is_none());
    }
}
