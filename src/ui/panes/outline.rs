//! Outline pane: the static algorithm steps of the submission

use crate::analysis::AlgorithmStep;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the outline, marking the entry for the current line
pub fn render_outline_pane(
    frame: &mut Frame,
    area: Rect,
    steps: &[AlgorithmStep],
    current_line: usize,
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
        .title(" Outline ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(steps.len().saturating_sub(visible_height));

    let lines: Vec<Line> = steps
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|step| {
            let is_current = step.line == current_line;
            let marker = if is_current { "▶" } else { " " };
            let text_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            Line::from(vec![
                Span::styled(
                    format!("{} {:3} ", marker, step.line),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(step.description.clone(), text_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
