use crate::app::{App, EditField, EditState, Focus, Mode};
use crate::types::Activity;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use super::utils::{centered_rect, input_with_cursor};
use super::widgets::{controls_bar, field_line, stepper};

pub fn render_command_center(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Command input
            Constraint::Min(3),    // Activity list
            Constraint::Length(1), // Progress footer
            Constraint::Length(3), // Controls
        ])
        .split(body);

    render_command_input(frame, app, chunks[0]);
    render_activity_list(frame, app, chunks[1]);
    render_progress(frame, app, chunks[2]);

    let controls = match (app.mode(), app.focus) {
        (Mode::Editing, _) => controls_bar(&[
            ("Tab", "Next field"),
            ("←/→", "Change"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ]),
        (Mode::Normal, Focus::Command) => controls_bar(&[
            ("Type", "Find"),
            ("Enter", "Log"),
            ("Tab", "List"),
            ("Esc", "Clear"),
            ("Ctrl+Z", "Undo"),
            ("Ctrl+N", "New"),
        ]),
        (Mode::Normal, Focus::List) => controls_bar(&[
            ("j/k", "Move"),
            ("e", "Edit"),
            ("Shift+D", "Delete"),
            ("i", "Type"),
            ("Ctrl+Z", "Undo"),
            ("q", "Quit"),
        ]),
    };
    frame.render_widget(controls, chunks[3]);
}

fn render_command_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode() == Mode::Normal && app.focus == Focus::Command;
    let (text, style) = if app.command_input.value.is_empty() && !focused {
        (
            "Type an activity name...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            input_with_cursor(&app.command_input, focused),
            Style::default().fg(Color::White),
        )
    };
    let border = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Log ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(input, area);
}

fn render_activity_list(frame: &mut Frame, app: &App, area: Rect) {
    let list_focused = app.mode() == Mode::Normal && app.focus == Focus::List;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if list_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(format!(" Today ({}) ", app.snapshot.activities.len()))
        .padding(Padding::horizontal(1));

    if app.is_loading {
        let loading = Paragraph::new(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if app.snapshot.activities.is_empty() {
        frame.render_widget(block, area);
        let hint_area = centered_rect(44, 2, area);
        let hint = Paragraph::new(vec![
            Line::from(Span::styled(
                "No activities yet",
                Style::default().fg(Color::White),
            )),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("Ctrl+N", Style::default().fg(Color::Yellow)),
                Span::styled(
                    " to create your first one",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hint, hint_area);
        return;
    }

    let predicted = app.predicted_match().map(|a| a.id.clone());
    let items: Vec<ListItem> = app
        .snapshot
        .activities
        .iter()
        .map(|activity| match &app.edit_state {
            Some(edit) if edit.activity_id == activity.id => edit_item(edit),
            _ => activity_item(app, activity, predicted.as_deref() == Some(activity.id.as_str())),
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    let list = List::new(items)
        .block(block)
        .highlight_symbol(if list_focused { "▶ " } else { "  " })
        .highlight_style(if list_focused {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        });
    frame.render_stateful_widget(list, area, &mut state);
}

fn activity_item(app: &App, activity: &Activity, predicted: bool) -> ListItem<'static> {
    let muted = Style::default().fg(Color::DarkGray);
    let (marker, marker_style) = if app.snapshot.is_logged(&activity.id) {
        ("■ ", Style::default().fg(Color::Blue))
    } else if app.pending_logs.contains(&activity.id) {
        ("◌ ", Style::default().fg(Color::Yellow))
    } else {
        ("□ ", muted)
    };
    let name_style = if predicted {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(marker, marker_style),
        Span::styled(activity.name.clone(), name_style),
        Span::styled(
            format!("  {} · {}x/week", activity.importance.label(), activity.target_frequency),
            muted,
        ),
    ];

    let streak = app.snapshot.streak_for(&activity.id);
    if streak > 0 {
        spans.push(Span::styled(
            format!("  {}d", streak),
            Style::default().fg(Color::Magenta),
        ));
    }

    if matches!(&app.delete_confirm, Some(c) if c.activity_id == activity.id) {
        spans.push(Span::styled(
            "  Shift+D again to delete",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn edit_item(edit: &EditState) -> ListItem<'static> {
    let focused = |field: EditField| edit.focused_field == field;
    let mut lines = vec![
        field_line(
            "Name",
            input_with_cursor(&edit.name, focused(EditField::Name)),
            focused(EditField::Name),
        ),
        field_line(
            "Description",
            input_with_cursor(&edit.description, focused(EditField::Description)),
            focused(EditField::Description),
        ),
        field_line(
            "Importance",
            stepper(edit.importance.label(), focused(EditField::Importance)),
            focused(EditField::Importance),
        ),
        field_line(
            "Frequency",
            format!(
                "{} per week",
                stepper(edit.target_frequency, focused(EditField::Frequency))
            ),
            focused(EditField::Frequency),
        ),
    ];
    if edit.saving {
        lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines).style(Style::default().bg(Color::Black))
}

fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let progress = Line::from(vec![
        Span::styled(
            format!(
                "{}/{}",
                app.snapshot.logged_count(),
                app.snapshot.activities.len()
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(" · ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.0}%", app.snapshot.score),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
    ]);
    frame.render_widget(Paragraph::new(progress).alignment(Alignment::Right), area);
}
