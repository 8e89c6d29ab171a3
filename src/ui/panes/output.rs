//! Program output pane rendering

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

/// Render what the program had printed by the current step, followed by the
/// failure summary once the run has ended with one
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    output: &str,
    error: Option<&str>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    let block = Block::default()
        .title(" Output ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut lines: Vec<Line> = output
        .lines()
        .map(|line| Line::styled(line.to_string(), Style::default().fg(DEFAULT_THEME.fg)))
        .collect();
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        lines.extend(
            error
                .lines()
                .map(|line| Line::styled(line.to_string(), Style::default().fg(DEFAULT_THEME.error))),
        );
    }

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    // usize::MAX pins the view to the bottom
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();
    let block = block.padding(Padding::new(1, 0, 0, 0));
    frame.render_widget(Paragraph::new(visible).block(block), area);
}
