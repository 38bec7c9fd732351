use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

mod command_center_view;
mod forge_view;
mod maintenance_view;
pub(super) mod utils;
pub(super) mod widgets;

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(frame.area());

    render_header(frame, root[0], app);

    let body = root[1];
    match app.current_view {
        View::CommandCenter => command_center_view::render_command_center(frame, app, body),
        View::Forge => forge_view::render_forge(frame, app, body),
        View::Maintenance => maintenance_view::render_maintenance(frame, app, body),
    }

    widgets::render_toast(frame, app);
}

/// Title with loading throbber, view tabs and the signed-in user.
fn render_header(frame: &mut Frame, area: Rect, app: &mut App) {
    // 1 blank row, 1 content row, 2-char horizontal padding
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    let row = Rect {
        x: rows[1].x + 2,
        width: rows[1].width.saturating_sub(4),
        ..rows[1]
    };

    const LABEL: &str = " Sentinel";
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1 + LABEL.len() as u16 + 2),
            Constraint::Min(10),
            Constraint::Length(32),
        ])
        .split(row);

    let throbber_area = Rect {
        width: 1,
        ..cols[0]
    };
    let label_area = Rect {
        x: cols[0].x + 1,
        width: cols[0].width.saturating_sub(1),
        ..cols[0]
    };
    let loading = app.is_loading || app.maintenance.is_loading;
    let throbber = throbber_widgets_tui::Throbber::default()
        .style(Style::default().fg(Color::Yellow))
        .throbber_style(Style::default().fg(Color::Yellow))
        .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
        .use_type(if loading {
            throbber_widgets_tui::WhichUse::Spin
        } else {
            throbber_widgets_tui::WhichUse::Full
        });
    frame.render_stateful_widget(throbber, throbber_area, &mut app.throbber_state);
    frame.render_widget(
        Paragraph::new(Span::styled(
            LABEL,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        label_area,
    );

    let tab = |key: &'static str, name: &'static str, view: View| {
        let style = if app.current_view == view {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        vec![
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::styled(format!(" {}   ", name), style),
        ]
    };
    let mut tabs = Vec::new();
    tabs.extend(tab("^1", "Command Center", View::CommandCenter));
    tabs.extend(tab("^2", "Forge", View::Forge));
    tabs.extend(tab("^3", "Maintenance", View::Maintenance));
    frame.render_widget(Paragraph::new(Line::from(tabs)), cols[1]);

    let who = app.user.email.clone().unwrap_or_else(|| app.user.id.clone());
    frame.render_widget(
        Paragraph::new(Span::styled(who, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right),
        cols[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{activity, app_with};
    use crate::app::ToastKind;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        terminal.draw(|f| render(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn command_center_shows_rows_progress_and_toast() {
        let mut app = app_with(vec![activity("a1", "Read"), activity("a2", "Run")]);
        app.snapshot.score = 72.0;

        let text = screen(&mut app);
        assert!(text.contains("Read"));
        assert!(text.contains("Run"));
        assert!(text.contains("0/2 · 72%"));

        // The toast sits bottom-right, over the footer.
        app.show_toast_at("Logged Read", ToastKind::Info, Instant::now());
        assert!(screen(&mut app).contains("Logged Read"));
    }

    #[test]
    fn empty_list_points_to_forge() {
        let mut app = app_with(Vec::new());
        assert!(screen(&mut app).contains("Ctrl+N"));
    }

    #[test]
    fn every_view_renders() {
        let mut app = app_with(vec![activity("a1", "Read")]);
        for view in [View::Forge, View::Maintenance, View::CommandCenter] {
            app.navigate_to(view);
            assert!(screen(&mut app).contains("Sentinel"));
        }
    }
}
