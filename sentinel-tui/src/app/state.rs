use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::api::dto::{ActivityPatch, NewActivity, NewMaintenanceTask};
use crate::types::{Activity, Importance, MaintenanceTask, Recurrence, MAX_TARGET_FREQUENCY};

pub const TOAST_TTL: Duration = Duration::from_secs(2);
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    CommandCenter,
    Forge,
    Maintenance,
}

/// Where keystrokes go while the command center is in normal mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Command,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Editing,
}

/// A text input with mid-string cursor support.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            value: s.to_string(),
            cursor: s.len(),
        }
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character immediately before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let new_cursor = self.prev_boundary(self.cursor);
        self.value.drain(new_cursor..self.cursor);
        self.cursor = new_cursor;
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary(self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.next_boundary(self.cursor);
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Returns the string split at the cursor: (before, after).
    pub fn split_at_cursor(&self) -> (&str, &str) {
        (&self.value[..self.cursor], &self.value[self.cursor..])
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        let mut p = pos;
        loop {
            p -= 1;
            if self.value.is_char_boundary(p) {
                return p;
            }
        }
    }

    fn next_boundary(&self, pos: usize) -> usize {
        let mut p = pos + 1;
        while p <= self.value.len() && !self.value.is_char_boundary(p) {
            p += 1;
        }
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditField {
    Name,
    Description,
    Importance,
    Frequency,
}

impl EditField {
    pub fn next(self) -> Self {
        match self {
            EditField::Name => EditField::Description,
            EditField::Description => EditField::Importance,
            EditField::Importance => EditField::Frequency,
            EditField::Frequency => EditField::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            EditField::Name => EditField::Frequency,
            EditField::Description => EditField::Name,
            EditField::Importance => EditField::Description,
            EditField::Frequency => EditField::Importance,
        }
    }
}

/// Draft for the single row currently being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub activity_id: String,
    pub name: TextInput,
    pub description: TextInput,
    pub importance: Importance,
    pub target_frequency: u8,
    pub focused_field: EditField,
    pub saving: bool,
}

impl EditState {
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            activity_id: activity.id.clone(),
            name: TextInput::from_str(&activity.name),
            description: TextInput::from_str(activity.description.as_deref().unwrap_or("")),
            importance: activity.importance,
            target_frequency: activity.target_frequency,
            focused_field: EditField::Name,
            saving: false,
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut TextInput> {
        match self.focused_field {
            EditField::Name => Some(&mut self.name),
            EditField::Description => Some(&mut self.description),
            EditField::Importance | EditField::Frequency => None,
        }
    }
}

/// First half of the two-step delete gate.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirm {
    pub activity_id: String,
    pub armed_at: Instant,
}

impl DeleteConfirm {
    pub fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.armed_at) <= DELETE_CONFIRM_WINDOW
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForgeTab {
    Habits,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForgeField {
    Name,
    Importance,
    Frequency,
    Recurrence,
    Interval,
}

pub const DEFAULT_RECURRENCE_INTERVAL: u32 = 7;
pub const MAX_RECURRENCE_INTERVAL: u32 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct ForgeState {
    pub tab: ForgeTab,
    pub name: TextInput,
    pub importance: Importance,
    pub target_frequency: u8,
    pub recurrence: Recurrence,
    pub recurrence_interval: u32,
    pub focused_field: ForgeField,
    pub submitting: bool,
}

impl Default for ForgeState {
    fn default() -> Self {
        Self {
            tab: ForgeTab::Habits,
            name: TextInput::new(),
            importance: Importance::Medium,
            target_frequency: MAX_TARGET_FREQUENCY,
            recurrence: Recurrence::Weekly,
            recurrence_interval: DEFAULT_RECURRENCE_INTERVAL,
            focused_field: ForgeField::Name,
            submitting: false,
        }
    }
}

impl ForgeState {
    /// Fields shown on the current tab, in tab order.
    pub fn fields(&self) -> Vec<ForgeField> {
        match self.tab {
            ForgeTab::Habits => vec![ForgeField::Name, ForgeField::Importance, ForgeField::Frequency],
            ForgeTab::Maintenance if self.recurrence == Recurrence::CustomDays => {
                vec![ForgeField::Name, ForgeField::Recurrence, ForgeField::Interval]
            }
            ForgeTab::Maintenance => vec![ForgeField::Name, ForgeField::Recurrence],
        }
    }

    /// Back to defaults, keeping the selected tab.
    pub fn reset(&mut self) {
        *self = Self {
            tab: self.tab,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenanceState {
    pub tasks: Vec<MaintenanceTask>,
    pub selected: usize,
    pub is_loading: bool,
    pub completing: HashSet<String>,
}

/// A log that passed the local checks and is ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRequest {
    pub activity_id: String,
    pub activity_name: String,
    pub query: String,
    pub date: time::Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub activity_id: String,
    pub patch: ActivityPatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub activity_id: String,
    pub activity_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForgeRequest {
    Habit(NewActivity),
    Task(NewMaintenanceTask),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompleteRequest {
    pub task_id: String,
    pub task_name: String,
}
