use crate::app::{App, ForgeField, ForgeTab};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::utils::input_with_cursor;
use super::widgets::{controls_bar, field_line, stepper};

pub fn render_forge(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Min(6),    // Form
            Constraint::Length(3), // Controls
        ])
        .split(body);

    let tab_style = |tab: ForgeTab| {
        if app.forge.tab == tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let tabs = Line::from(vec![
        Span::raw("  "),
        Span::styled("Habits", tab_style(ForgeTab::Habits)),
        Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Maintenance", tab_style(ForgeTab::Maintenance)),
    ]);
    frame.render_widget(Paragraph::new(tabs), chunks[0]);

    let forge = &app.forge;
    let focused = |field: ForgeField| forge.focused_field == field;
    let mut lines = vec![
        Line::from(""),
        field_line(
            "Name",
            input_with_cursor(&forge.name, focused(ForgeField::Name)),
            focused(ForgeField::Name),
        ),
    ];
    for field in forge.fields() {
        let line = match field {
            ForgeField::Name => continue,
            ForgeField::Importance => field_line(
                "Importance",
                stepper(forge.importance.label(), focused(field)),
                focused(field),
            ),
            ForgeField::Frequency => field_line(
                "Frequency",
                format!(
                    "{} per week",
                    stepper(forge.target_frequency, focused(field))
                ),
                focused(field),
            ),
            ForgeField::Recurrence => field_line(
                "Repeats",
                stepper(forge.recurrence.label(), focused(field)),
                focused(field),
            ),
            ForgeField::Interval => field_line(
                "Every",
                format!("{} days", stepper(forge.recurrence_interval, focused(field))),
                focused(field),
            ),
        };
        lines.push(line);
    }
    if forge.submitting {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Creating...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = match forge.tab {
        ForgeTab::Habits => " New habit ",
        ForgeTab::Maintenance => " New maintenance task ",
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title)
            .padding(Padding::horizontal(2)),
    );
    frame.render_widget(form, chunks[1]);

    frame.render_widget(
        controls_bar(&[
            ("Tab", "Next field"),
            ("←/→", "Change"),
            ("Ctrl+T", "Switch tab"),
            ("Enter", "Create"),
            ("Esc", "Back"),
        ]),
        chunks[2],
    );
}
