use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{ActiveOverlay, AppState};

fn hints(state: &AppState, narrow: bool) -> &'static [(&'static str, &'static str)] {
    if !state.alerts.is_empty() {
        return &[("Enter/Esc", "dismiss")];
    }
    match state.overlay {
        ActiveOverlay::Log(_) => &[("j/k", "scroll"), ("G", "follow"), ("y", "copy"), ("q", "close")],
        ActiveOverlay::Compose(_) => &[("j/k", "scroll"), ("E", "edit"), ("y", "copy"), ("q", "close")],
        ActiveOverlay::None if state.dropdowns.visible().next().is_some() => {
            &[("1-9", "open console"), ("c/Esc", "close menu")]
        }
        ActiveOverlay::None if narrow => &[
            ("hjkl", "nav"),
            ("␣", "toggle"),
            ("e", "logs"),
            ("c", "console"),
            ("q", "quit"),
        ],
        ActiveOverlay::None => &[
            ("←↓↑→/hjkl", "navigate"),
            ("Space/Enter", "start/stop"),
            ("R", "restart"),
            ("e", "logs"),
            ("v", "compose"),
            ("c", "console"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
    }
}

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < crate::app::NARROW_WIDTH_THRESHOLD;

    let line = if let Some(msg) = state.error_message() {
        Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Color::Red)),
            Span::styled(msg, Style::default().fg(Color::Red)),
        ])
    } else if let Some(notif) = state.notifications.last() {
        Line::from(vec![
            Span::styled("★ ", Style::default().fg(Color::Yellow)),
            Span::styled(&notif.message, Style::default().fg(Color::Yellow)),
        ])
    } else {
        let mut spans: Vec<Span> = Vec::new();
        for (i, (key, desc)) in hints(state, narrow).iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
            spans.push(Span::styled(
                format!(" {desc}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;

    #[test]
    fn alert_hint_wins() {
        let mut state = AppState::new(AppConfig::default());
        state.open_compose_overlay("web");
        state.push_alert("boom".into());
        assert_eq!(hints(&state, false), &[("Enter/Esc", "dismiss")]);
    }

    #[test]
    fn compose_overlay_mentions_edit() {
        let mut state = AppState::new(AppConfig::default());
        state.open_compose_overlay("web");
        assert!(hints(&state, false).iter().any(|(k, _)| *k == "E"));
    }
}
