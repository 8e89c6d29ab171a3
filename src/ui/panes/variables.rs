//! Variables pane: the bindings captured at the current step

use crate::snapshot::TraceStep;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One display row per binding: `name: type = printable`
fn binding_lines(step: &TraceStep) -> Vec<Line<'static>> {
    step.locals
        .iter()
        .map(|(name, printable)| {
            let type_name = step
                .env
                .variables
                .get(name)
                .map(|value| value.type_name().to_string())
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(
                    name.clone(),
                    Style::default()
                        .fg(DEFAULT_THEME.primary)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(": ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(type_name, Style::default().fg(DEFAULT_THEME.type_name)),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(printable.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ])
        })
        .collect()
}

/// Render the variables pane
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&TraceStep>,
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
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = step.map(binding_lines).unwrap_or_default();
    if lines.is_empty() {
        let paragraph = Paragraph::new("(no variables)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize;
    use crate::memory::value::Value;
    use crate::snapshot::EnvDiagram;
    use indexmap::IndexMap;

    #[test]
    fn test_binding_line_shows_type_and_value() {
        let mut locals = IndexMap::new();
        locals.insert("xs".to_string(), "[1, 2]".to_string());
        let mut variables = IndexMap::new();
        variables.insert(
            "xs".to_string(),
            serialize(&Value::list(vec![Value::Int(1), Value::Int(2)])),
        );
        let step = TraceStep {
            line: 1,
            code: String::new(),
            locals,
            env: EnvDiagram { variables },
            hint: String::new(),
            output_offset: 0,
        };

        let lines = binding_lines(&step);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "xs: list = [1, 2]");
    }
}
