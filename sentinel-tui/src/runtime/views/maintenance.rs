use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{enqueue_action, Action, ActionTx};
use super::open_view;

pub(super) fn handle_maintenance_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.maintenance_select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.maintenance_select_previous(),
        KeyCode::Char('c') | KeyCode::Enter => {
            if let Some(request) = app.begin_complete_task() {
                enqueue_action(action_tx, Action::CompleteTask(request));
            }
        }
        KeyCode::Char('r') => {
            app.maintenance.is_loading = true;
            enqueue_action(action_tx, Action::LoadMaintenance);
        }
        KeyCode::Esc => open_view(View::CommandCenter, app, action_tx),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}
