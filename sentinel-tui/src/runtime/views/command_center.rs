use crate::app::{App, Focus, Mode};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;

use super::super::action_queue::{enqueue_action, Action, ActionTx};
use super::is_text_key;

pub(super) fn handle_command_center_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match (app.mode(), app.focus) {
        (Mode::Editing, _) => handle_editing_key(key, app, action_tx),
        (Mode::Normal, Focus::Command) => handle_command_input_key(key, app, action_tx),
        (Mode::Normal, Focus::List) => handle_list_key(key, app, action_tx),
    }
}

fn submit_query(app: &mut App, action_tx: &ActionTx) {
    if let Some(request) = app.begin_log() {
        enqueue_action(action_tx, Action::LogActivity(request));
    }
}

fn handle_command_input_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Esc => app.reset_command(),
        KeyCode::Enter => submit_query(app, action_tx),
        KeyCode::Tab | KeyCode::Down => app.focus_list(),
        KeyCode::Backspace => app.command_input.backspace(),
        KeyCode::Left => app.command_input.move_left(),
        KeyCode::Right => app.command_input.move_right(),
        KeyCode::Home => app.command_input.home(),
        KeyCode::End => app.command_input.end(),
        KeyCode::Char(c) if is_text_key(&key) => {
            app.command_input.insert(c);
        }
        _ => {}
    }
}

fn handle_list_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('e') => {
            app.start_edit();
        }
        // Shift+D arrives as an uppercase char, with or without the SHIFT flag
        KeyCode::Char('D') => {
            if let Some(request) = app.request_delete(Instant::now()) {
                enqueue_action(action_tx, Action::DeleteActivity(request));
            }
        }
        KeyCode::Esc => app.reset_command(),
        KeyCode::Enter => {
            if !app.command_input.value.trim().is_empty() {
                submit_query(app, action_tx);
            }
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus_command()
        }
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_editing_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => {
            if let Some(request) = app.begin_save_edit() {
                enqueue_action(action_tx, Action::SaveEdit(request));
            }
        }
        KeyCode::Tab | KeyCode::Down => app.edit_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.edit_previous_field(),
        KeyCode::Left => app.edit_step(false),
        KeyCode::Right => app.edit_step(true),
        KeyCode::Home => app.edit_cursor_home_end(true),
        KeyCode::End => app.edit_cursor_home_end(false),
        KeyCode::Backspace => app.edit_backspace(),
        KeyCode::Char(c) if is_text_key(&key) => {
            app.edit_input_char(c);
        }
        _ => {}
    }
}
