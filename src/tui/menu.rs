use crate::app::AppState;
use crate::tui::truncate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Draws every open container menu below its trigger.
pub fn render(f: &mut Frame, state: &AppState) {
    for menu in state.menu_layouts() {
        f.render_widget(Clear, menu.area);
        let inner_width = menu.area.width.saturating_sub(2) as usize;
        let lines: Vec<Line> = if menu.labels.is_empty() {
            vec![Line::from(Span::styled(
                "(no containers)",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            let loaded = state.dropdowns.get(&menu.project).is_some_and(|d| d.loaded);
            menu.labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    if loaded {
                        Line::from(vec![
                            Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Cyan)),
                            Span::raw(truncate(label, inner_width.saturating_sub(2))),
                        ])
                    } else {
                        Line::from(Span::styled(
                            truncate(label, inner_width),
                            Style::default().fg(Color::Red),
                        ))
                    }
                })
                .collect()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .style(Style::default().bg(Color::Black));
        f.render_widget(Paragraph::new(lines).block(block), menu.area);
    }
}
