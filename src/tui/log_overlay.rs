use crate::logs::{LogSession, STREAM_INTERRUPTED};
use crate::tui::spinner;
use crate::view;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, session: &LogSession, spinner_frame: usize) {
    let overlay_area = view::overlay_area(f.area());
    f.render_widget(Clear, overlay_area);

    let inner_height = usize::from(overlay_area.height.saturating_sub(2)).max(1);
    let top = session.top_line(inner_height);
    let total = session.line_count;

    let status = if session.error.is_some() {
        " [interrupted]".to_string()
    } else if session.finished {
        " [ended]".to_string()
    } else if session.follow {
        format!(" {} following", spinner::frame(spinner_frame))
    } else {
        String::new()
    };
    let scroll_info = if total > inner_height {
        format!(
            " [{}-{}/{}] ",
            top + 1,
            (top + inner_height).min(total),
            total,
        )
    } else {
        String::new()
    };

    let title = format!(" logs: {}{status}{scroll_info} ", session.project);
    let hints = " j/k scroll | G follow | y copy | q close ";

    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(hints).centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let visible_lines: Vec<Line> = if total == 0 && !session.finished {
        vec![Line::from(Span::styled(
            "(waiting for output…)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        session
            .lines()
            .skip(top)
            .take(inner_height)
            .map(|l| {
                if l == STREAM_INTERRUPTED {
                    Line::from(Span::styled(l, Style::default().fg(Color::Red)))
                } else {
                    Line::from(Span::raw(l))
                }
            })
            .collect()
    };

    f.render_widget(Paragraph::new(visible_lines).block(block), overlay_area);
}
