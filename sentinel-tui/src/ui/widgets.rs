use crate::app::{App, ToastKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};

use super::utils::bottom_right_rect;

/// Bordered "Controls" bar of yellow keys and plain descriptions.
pub fn controls_bar(keys: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (i, (key, action)) in keys.iter().enumerate() {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        let sep = if i + 1 < keys.len() { "  " } else { "" };
        spans.push(Span::raw(format!(": {}{}", action, sep)));
    }

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " Controls ",
                    Style::default().fg(Color::DarkGray),
                ))
                .padding(Padding::horizontal(1)),
        )
}

/// One "Label: value" form row, yellow when focused.
pub fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value_style = if focused {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(format!("{:<13}", format!("{}:", label)), label_style),
        Span::styled(value, value_style),
    ])
}

/// Value shown with arrows when it can be stepped with Left/Right.
pub fn stepper(value: impl std::fmt::Display, focused: bool) -> String {
    if focused {
        format!("◀ {} ▶", value)
    } else {
        value.to_string()
    }
}

/// Current toast, bottom-right, over whatever view is showing.
pub fn render_toast(frame: &mut Frame, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };

    let color = match toast.kind {
        ToastKind::Info => Color::Green,
        ToastKind::Error => Color::Red,
    };
    let width = (toast.message.chars().count() as u16).saturating_add(6).min(60);
    let area: Rect = bottom_right_rect(width, 3, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(Span::styled(
        toast.message.clone(),
        Style::default().fg(Color::White),
    ))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(paragraph, area);
}
