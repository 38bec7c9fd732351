use crate::app::App;
use crate::time_utils::today_local;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use super::action_queue::{channel, enqueue_action, outcome_channel, Action};
use super::actions::{apply_outcome, spawn_action, Services};
use super::views::handle_view_key;

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    services: &Services,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();
    let (outcome_tx, mut outcome_rx) = outcome_channel();

    enqueue_action(&action_tx, Action::ReloadSnapshot);
    enqueue_action(&action_tx, Action::LoadMaintenance);

    // Reload when the local date rolls over so "today" stays true.
    let mut current_day = today_local();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_view_key(key, app, &action_tx);
                }
            }
        }

        app.tick(Instant::now());

        let today = today_local();
        if today != current_day {
            tracing::info!(%today, "local date changed, reloading");
            current_day = today;
            enqueue_action(&action_tx, Action::ReloadSnapshot);
        }

        while let Ok(action) = action_rx.try_recv() {
            spawn_action(action, services, &outcome_tx);
        }

        while let Ok(outcome) = outcome_rx.try_recv() {
            apply_outcome(outcome, app, &action_tx);
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
