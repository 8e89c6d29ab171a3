//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const KEYBINDS: [(&str, &str); 5] = [
    ("←/→", "step"),
    ("⎵", "play"),
    ("↵ / ⌫", "end/start"),
    ("⇥", "focus"),
    ("q", "quit"),
];

fn badge_style(bg: Color) -> Style {
    Style::default()
        .bg(bg)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

/// Everything the status bar shows
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    /// 0-based position; `total_steps` means past the last step
    pub position: usize,
    pub total_steps: usize,
    pub failed: bool,
    pub is_playing: bool,
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData<'_>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let at_end = data.position >= data.total_steps;
    let step_text = if at_end {
        format!(" Finished ({} steps) ", data.total_steps)
    } else {
        format!(" Step {}/{} ", data.position + 1, data.total_steps)
    };

    let left_spans = vec![
        Span::styled(
            step_text,
            badge_style(if at_end && data.failed {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.primary
            }),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ),
    ];
    let left = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut right_spans = Vec::with_capacity(KEYBINDS.len() * 3 + 2);
    for (i, (key, action)) in KEYBINDS.iter().enumerate() {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
        }
        right_spans.push(Span::styled(format!(" {key} "), key_style));
        right_spans.push(Span::styled(format!(" {action} "), desc_style));
    }

    let badge = if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if at_end && data.failed {
        Some((" ERROR ", DEFAULT_THEME.error))
    } else if at_end {
        Some((" END ", DEFAULT_THEME.success))
    } else if data.position == 0 {
        Some((" START ", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some((text, color)) = badge {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(text, badge_style(color)));
    }

    let right = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right, layout[1]);
}
