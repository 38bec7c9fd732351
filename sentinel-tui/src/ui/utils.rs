use crate::app::TextInput;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Helper function to create a centered rectangle
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height.saturating_sub(height)) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((r.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((r.width.saturating_sub(width)) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Rectangle anchored to the bottom-right corner, one cell in from the edges.
pub fn bottom_right_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width.saturating_sub(2));
    let height = height.min(r.height.saturating_sub(1));
    Rect {
        x: r.x + r.width.saturating_sub(width + 2),
        y: r.y + r.height.saturating_sub(height + 1),
        width,
        height,
    }
}

/// Input text with a block cursor when focused.
pub fn input_with_cursor(input: &TextInput, focused: bool) -> String {
    if focused {
        let (before, after) = input.split_at_cursor();
        format!("{}█{}", before, after)
    } else {
        input.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_right_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = bottom_right_rect(30, 3, area);
        assert_eq!(rect, Rect::new(48, 20, 30, 3));

        let tiny = bottom_right_rect(30, 3, Rect::new(0, 0, 10, 2));
        assert!(tiny.right() <= 10 && tiny.bottom() <= 2);
    }

    #[test]
    fn cursor_is_drawn_at_position() {
        let mut input = TextInput::from_str("run");
        input.move_left();
        assert_eq!(input_with_cursor(&input, true), "ru█n");
        assert_eq!(input_with_cursor(&input, false), "run");
    }
}
