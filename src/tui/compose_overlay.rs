use crate::compose::{ComposeContent, ComposeView};
use crate::tui::spinner;
use crate::view;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub fn render(f: &mut Frame, compose: &ComposeView, spinner_frame: usize) {
    let overlay_area = view::overlay_area(f.area());
    f.render_widget(Clear, overlay_area);

    let inner_height = usize::from(overlay_area.height.saturating_sub(2));
    let title = format!(" compose: {} ", compose.project);
    let hints = " j/k scroll | E edit | y copy | q close ";

    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(hints).centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let paragraph = match &compose.content {
        ComposeContent::Loading => Paragraph::new(Line::from(Span::styled(
            format!("{} loading…", spinner::frame(spinner_frame)),
            Style::default().fg(Color::DarkGray),
        ))),
        ComposeContent::Failed(message) => Paragraph::new(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )))
        .wrap(Wrap { trim: true }),
        ComposeContent::Loaded(text) => Paragraph::new(
            text.lines()
                .skip(compose.scroll)
                .take(inner_height)
                .map(Line::raw)
                .collect::<Vec<_>>(),
        ),
    };

    f.render_widget(paragraph.block(block), overlay_area);
}
