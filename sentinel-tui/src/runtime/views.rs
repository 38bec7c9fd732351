use crate::app::{self, App};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action_queue::{enqueue_action, Action, ActionTx};

mod command_center;
mod forge;
mod maintenance;

/// Ctrl and Super (Cmd) are interchangeable for shortcuts.
fn has_command_modifier(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

/// A character key that should land in a text field. Shift is fine.
fn is_text_key(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::ALT)
}

/// Switch view and load whatever the target view shows.
fn open_view(view: app::View, app: &mut App, action_tx: &ActionTx) {
    app.navigate_to(view);
    match view {
        app::View::CommandCenter => enqueue_action(action_tx, Action::ReloadSnapshot),
        app::View::Maintenance => enqueue_action(action_tx, Action::LoadMaintenance),
        app::View::Forge => {}
    }
}

/// Shortcuts that work in every view and mode. Returns true when the key was consumed.
fn handle_global_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) -> bool {
    if !has_command_modifier(&key) {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => app.quit(),
        KeyCode::Char('n') => open_view(app::View::Forge, app, action_tx),
        KeyCode::Char('z') => {
            if let Some(log_id) = app.begin_undo() {
                enqueue_action(action_tx, Action::UndoLog { log_id });
            }
        }
        KeyCode::Char('1') => open_view(app::View::CommandCenter, app, action_tx),
        KeyCode::Char('2') => open_view(app::View::Forge, app, action_tx),
        KeyCode::Char('3') => open_view(app::View::Maintenance, app, action_tx),
        _ => return false,
    }
    true
}

pub(super) fn handle_view_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if handle_global_key(key, app, action_tx) {
        return;
    }
    match &app.current_view {
        app::View::CommandCenter => {
            command_center::handle_command_center_key(key, app, action_tx)
        }
        app::View::Forge => forge::handle_forge_key(key, app, action_tx),
        app::View::Maintenance => maintenance::handle_maintenance_key(key, app, action_tx),
    }
}
