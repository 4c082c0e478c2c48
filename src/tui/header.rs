use crate::app::AppState;
use crate::sync::SnapshotSource;
use crate::tui::spinner;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled(
            format!(
                " dcw v{}+{} ",
                env!("CARGO_PKG_VERSION"),
                env!("BUILD_NUMBER")
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            &state.config.base_url,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("● {} running", state.grid.running_count),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("○ {} stopped", state.grid.stopped_count),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if state.snapshot_source == Some(SnapshotSource::Demo) {
        spans.push(Span::styled(
            " [demo]",
            Style::default().fg(Color::Magenta),
        ));
    }

    // Loading spinner or last sync time
    if state.is_loading() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{}", spinner::frame(state.spinner_frame)),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(at) = state.last_sync {
        spans.push(Span::styled(
            format!(" synced {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    // Error indicator
    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(header, area);
}
