use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{enqueue_action, Action, ActionTx};
use super::{has_command_modifier, is_text_key, open_view};

pub(super) fn handle_forge_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('t') if has_command_modifier(&key) => app.forge_switch_tab(),
        KeyCode::Esc => open_view(View::CommandCenter, app, action_tx),
        KeyCode::Enter => {
            if let Some(request) = app.begin_forge_submit() {
                enqueue_action(action_tx, Action::Create(request));
            }
        }
        KeyCode::Tab | KeyCode::Down => app.forge_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.forge_previous_field(),
        KeyCode::Left => app.forge_step(false),
        KeyCode::Right => app.forge_step(true),
        KeyCode::Home => app.forge.name.home(),
        KeyCode::End => app.forge.name.end(),
        KeyCode::Backspace => app.forge_backspace(),
        KeyCode::Char(c) if is_text_key(&key) => {
            app.forge_input_char(c);
        }
        _ => {}
    }
}
