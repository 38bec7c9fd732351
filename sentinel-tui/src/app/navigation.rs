use super::*;

impl App {
    /// Move the list selection down (vim-style j or down), stopping at the last row
    pub fn select_next(&mut self) {
        let len = self.snapshot.activities.len();
        if len > 0 && self.selected_index + 1 < len {
            self.selected_index += 1;
        }
    }

    /// Move the list selection up (vim-style k or up), stopping at the first row
    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub(super) fn clamp_selection(&mut self) {
        let len = self.snapshot.activities.len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    pub fn focus_list(&mut self) {
        self.focus = Focus::List;
    }

    pub fn focus_command(&mut self) {
        self.focus = Focus::Command;
    }

    /// Esc in normal mode: clear the query and go back to the top of the list
    pub fn reset_command(&mut self) {
        self.command_input.clear();
        self.selected_index = 0;
    }

    pub fn navigate_to(&mut self, view: View) {
        if view == View::Forge && self.current_view != View::Forge {
            self.forge.focused_field = ForgeField::Name;
        }
        if view == View::Maintenance {
            self.maintenance.is_loading = true;
        }
        self.delete_confirm = None;
        self.current_view = view;
    }
}
