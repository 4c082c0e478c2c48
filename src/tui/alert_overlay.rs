use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

/// Modal error box. Stays until acknowledged.
pub fn render(f: &mut Frame, message: &str, pending: usize) {
    let area = f.area();

    let width = (message.width() as u16 + 4).clamp(30, 70).min(area.width);
    let text_width = usize::from(width.saturating_sub(2)).max(1);
    let text_lines = message.width().div_ceil(text_width).max(1) as u16;
    let height = (text_lines + 4).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let alert_area = Rect::new(x, y, width, height);

    f.render_widget(Clear, alert_area);

    let title = if pending > 1 {
        format!(" Error (1 of {pending}) ")
    } else {
        " Error ".to_string()
    };
    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(" Enter/Esc dismiss ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(vec![Line::raw(""), Line::raw(message)])
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, alert_area);
}
