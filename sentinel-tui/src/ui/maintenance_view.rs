use crate::app::{App, DueGroup};
use crate::time_utils::due_label;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use super::widgets::controls_bar;

fn group_color(group: DueGroup) -> Color {
    match group {
        DueGroup::Overdue => Color::Red,
        DueGroup::DueToday => Color::Yellow,
        DueGroup::Upcoming => Color::DarkGray,
    }
}

pub fn render_maintenance(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(body);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" Maintenance ({}) ", app.maintenance.tasks.len()))
        .padding(Padding::horizontal(1));

    let rows = app.maintenance.rows(app.snapshot.date);
    if rows.is_empty() {
        let text = if app.maintenance.is_loading {
            "Loading..."
        } else {
            "Nothing to maintain. Add tasks from the Forge (Ctrl+N)."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))).block(block),
            chunks[0],
        );
    } else {
        // Group headings are rows too; track where the selected task lands.
        let mut items = Vec::new();
        let mut selected_row = 0;
        let mut last_group = None;
        for (index, (group, days, task)) in rows.iter().enumerate() {
            if last_group != Some(*group) {
                items.push(ListItem::new(Line::from(Span::styled(
                    group.title(),
                    Style::default()
                        .fg(group_color(*group))
                        .add_modifier(Modifier::BOLD),
                ))));
                last_group = Some(*group);
            }
            if index == app.maintenance.selected {
                selected_row = items.len();
            }

            let when = days.map(due_label).unwrap_or_else(|| "No due date".to_string());
            let mut spans = vec![
                Span::raw("  "),
                Span::styled(task.name.clone(), Style::default().fg(Color::White)),
                Span::styled(format!("  {}", when), Style::default().fg(group_color(*group))),
                Span::styled(
                    format!("  {}", task.recurrence.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if app.maintenance.completing.contains(&task.id) {
                spans.push(Span::styled(
                    "  completing...",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            items.push(ListItem::new(Line::from(spans)));
        }

        let mut state = ListState::default();
        state.select(Some(selected_row));
        let list = List::new(items)
            .block(block)
            .highlight_symbol("▶ ")
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, chunks[0], &mut state);
    }

    frame.render_widget(
        controls_bar(&[
            ("j/k", "Move"),
            ("c/Enter", "Complete"),
            ("r", "Reload"),
            ("Esc", "Back"),
        ]),
        chunks[1],
    );
}
