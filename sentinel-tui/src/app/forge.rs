use super::state::MAX_RECURRENCE_INTERVAL;
use super::*;
use crate::api::dto::{NewActivity, NewMaintenanceTask};
use crate::time_utils::format_date;
use crate::types::{clamp_frequency, Recurrence, MAX_TARGET_FREQUENCY, MIN_TARGET_FREQUENCY};

pub const HABIT_CREATED: &str = "Habit created";
pub const TASK_CREATED: &str = "Task created";

impl App {
    pub fn forge_switch_tab(&mut self) {
        self.forge.tab = match self.forge.tab {
            ForgeTab::Habits => ForgeTab::Maintenance,
            ForgeTab::Maintenance => ForgeTab::Habits,
        };
        self.forge.focused_field = ForgeField::Name;
    }

    fn forge_move_field(&mut self, forward: bool) {
        let fields = self.forge.fields();
        let current = fields
            .iter()
            .position(|f| *f == self.forge.focused_field)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.forge.focused_field = fields[next];
    }

    pub fn forge_next_field(&mut self) {
        self.forge_move_field(true);
    }

    pub fn forge_previous_field(&mut self) {
        self.forge_move_field(false);
    }

    pub fn forge_input_char(&mut self, c: char) {
        let forge = &mut self.forge;
        match forge.focused_field {
            ForgeField::Name => forge.name.insert(c),
            ForgeField::Frequency => {
                if let Some(digit) = c.to_digit(10) {
                    let digit = digit as u8;
                    if (MIN_TARGET_FREQUENCY..=MAX_TARGET_FREQUENCY).contains(&digit) {
                        forge.target_frequency = digit;
                    }
                }
            }
            ForgeField::Interval => {
                if let Some(digit) = c.to_digit(10) {
                    forge.recurrence_interval =
                        (forge.recurrence_interval * 10 + digit).min(MAX_RECURRENCE_INTERVAL);
                }
            }
            ForgeField::Importance | ForgeField::Recurrence => {}
        }
    }

    pub fn forge_backspace(&mut self) {
        let forge = &mut self.forge;
        match forge.focused_field {
            ForgeField::Name => forge.name.backspace(),
            ForgeField::Interval => forge.recurrence_interval /= 10,
            _ => {}
        }
    }

    /// Left/Right: cursor in the name, step value elsewhere
    pub fn forge_step(&mut self, forward: bool) {
        let forge = &mut self.forge;
        match forge.focused_field {
            ForgeField::Name => {
                if forward {
                    forge.name.move_right();
                } else {
                    forge.name.move_left();
                }
            }
            ForgeField::Importance => {
                forge.importance = if forward {
                    forge.importance.raise()
                } else {
                    forge.importance.lower()
                };
            }
            ForgeField::Frequency => {
                let delta = if forward { 1 } else { -1 };
                forge.target_frequency = clamp_frequency(forge.target_frequency as i32 + delta);
            }
            ForgeField::Recurrence => {
                forge.recurrence = if forward {
                    forge.recurrence.next()
                } else {
                    forge.recurrence.previous()
                };
            }
            ForgeField::Interval => {
                forge.recurrence_interval = if forward {
                    (forge.recurrence_interval + 1).min(MAX_RECURRENCE_INTERVAL)
                } else {
                    forge.recurrence_interval.saturating_sub(1).max(1)
                };
            }
        }
    }

    pub fn begin_forge_submit(&mut self) -> Option<ForgeRequest> {
        if self.forge.submitting {
            return None;
        }
        let name = self.forge.name.value.trim().to_string();
        if name.is_empty() {
            self.show_error("Name cannot be empty");
            return None;
        }

        let request = match self.forge.tab {
            ForgeTab::Habits => ForgeRequest::Habit(NewActivity {
                user_id: self.user.id.clone(),
                name,
                importance: self.forge.importance,
                target_frequency: clamp_frequency(self.forge.target_frequency as i32),
            }),
            ForgeTab::Maintenance => {
                let custom = self.forge.recurrence == Recurrence::CustomDays;
                if custom && self.forge.recurrence_interval == 0 {
                    self.show_error("Interval must be at least 1 day");
                    return None;
                }
                ForgeRequest::Task(NewMaintenanceTask {
                    user_id: self.user.id.clone(),
                    name,
                    recurrence: self.forge.recurrence,
                    recurrence_interval: custom.then_some(self.forge.recurrence_interval),
                    next_due_date: format_date(self.snapshot.date),
                })
            }
        };
        self.forge.submitting = true;
        Some(request)
    }

    pub fn finish_forge_submit(&mut self, request: &ForgeRequest, result: Result<(), String>) {
        self.forge.submitting = false;
        match result {
            Ok(()) => {
                self.forge.reset();
                self.show_toast(match request {
                    ForgeRequest::Habit(_) => HABIT_CREATED,
                    ForgeRequest::Task(_) => TASK_CREATED,
                });
            }
            Err(e) => self.show_error(format!("Could not create: {}", e)),
        }
    }
}
