use crate::snapshot::Snapshot;
use crate::types::{Activity, Identity};
use std::collections::HashSet;
use std::time::Instant;
use time::Date;

mod edit;
mod forge;
mod logbook;
mod maintenance;
mod matcher;
mod navigation;
mod state;
mod toast;
pub use maintenance::DueGroup;
pub use matcher::resolve;
pub use state::{
    CompleteRequest, DeleteConfirm, DeleteRequest, EditField, EditRequest, EditState, Focus,
    ForgeField, ForgeRequest, ForgeState, ForgeTab, LogRequest, MaintenanceState, Mode, TextInput,
    Toast, ToastKind, View,
};

pub struct App {
    pub running: bool,
    pub current_view: View,
    pub user: Identity,

    // Latest snapshot, replaced wholesale on every reload
    pub snapshot: Snapshot,
    pub is_loading: bool,
    pub throbber_state: throbber_widgets_tui::ThrobberState,

    // Command center
    pub command_input: TextInput,
    pub focus: Focus,
    pub selected_index: usize,

    // Most recent successful log, target of Ctrl+Z
    pub last_log_id: Option<String>,
    // Activities with a log write in flight
    pub pending_logs: HashSet<String>,

    pub edit_state: Option<EditState>,
    pub delete_confirm: Option<DeleteConfirm>,
    pub toast: Option<Toast>,

    pub forge: ForgeState,
    pub maintenance: MaintenanceState,
}

impl App {
    pub fn new(user: Identity, today: Date) -> Self {
        Self {
            running: true,
            current_view: View::CommandCenter,
            user,
            snapshot: Snapshot::empty(today),
            is_loading: true,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
            command_input: TextInput::new(),
            focus: Focus::Command,
            selected_index: 0,
            last_log_id: None,
            pending_logs: HashSet::new(),
            edit_state: None,
            delete_confirm: None,
            toast: None,
            forge: ForgeState::default(),
            maintenance: MaintenanceState::default(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn mode(&self) -> Mode {
        if self.edit_state.is_some() {
            Mode::Editing
        } else {
            Mode::Normal
        }
    }

    pub fn selected_activity(&self) -> Option<&Activity> {
        self.snapshot.activities.get(self.selected_index)
    }

    /// Replace the snapshot and drop UI state that points at rows which no longer exist.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.is_loading = false;
        if !snapshot.failed_reads.is_empty() {
            self.show_error(format!(
                "Could not load {}",
                snapshot.failed_reads.join(", ")
            ));
        }
        self.snapshot = snapshot;
        self.clamp_selection();

        let exists = |id: &str| self.snapshot.activities.iter().any(|a| a.id == id);
        if matches!(&self.edit_state, Some(edit) if !exists(&edit.activity_id)) {
            self.edit_state = None;
        }
        if matches!(&self.delete_confirm, Some(c) if !exists(&c.activity_id)) {
            self.delete_confirm = None;
        }
    }

    /// Called once per event-loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.expire_toast(now);
        self.expire_delete_confirm(now);
        if self.is_loading || self.maintenance.is_loading {
            self.throbber_state.calc_next();
        }
    }
}
