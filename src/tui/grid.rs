use crate::app::{AppState, PointerTarget};
use crate::store::ProjectStatus;
use crate::tui::{spinner, truncate};
use crate::view::{Card, ACTIONS_PREFIX, TRIGGER_LABEL};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    if state.grid.is_empty() {
        let msg = if state.is_loading() {
            format!("{} Loading projects…", spinner::frame(state.spinner_frame))
        } else {
            "No projects".to_string()
        };
        let para = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        f.render_widget(para, area);
        return;
    }

    for region in state.card_regions() {
        let Some(card) = state.grid.cards.get(region.index) else {
            continue;
        };
        let selected = region.index == state.cursor;
        let hovered = state
            .pointer
            .as_ref()
            .is_some_and(|p| matches!(p, PointerTarget::Trigger(_)) && p.project() == card.name);
        let dropdown = state.dropdowns.get(&card.name);
        let trigger_active = hovered || dropdown.is_some_and(|d| d.visible);
        let trigger_loading = dropdown.is_some_and(|d| d.loading);

        let inner_width = region.card.width.saturating_sub(2) as usize;
        let lines = vec![
            status_line(card.status),
            Line::from(Span::styled(
                truncate(&card.path, inner_width),
                Style::default().fg(Color::DarkGray),
            )),
            actions_line(trigger_active, trigger_loading, state.spinner_frame),
            toggle_line(card),
        ];

        let quick = if region.index < crate::app::QUICK_SELECT_MAX {
            format!("{} ", region.index + 1)
        } else {
            String::new()
        };
        let title_width = inner_width.saturating_sub(quick.chars().count() + 2);
        let title = format!(" {quick}{} ", truncate(&card.name, title_width));

        let (_, status_color) = status_icon(card.status);
        let border_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(status_color)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        f.render_widget(Paragraph::new(lines).block(block), region.card);
    }
}

fn status_icon(status: ProjectStatus) -> (&'static str, Color) {
    match status {
        ProjectStatus::Running => ("●", Color::Green),
        ProjectStatus::Stopped => ("○", Color::DarkGray),
    }
}

fn status_line(status: ProjectStatus) -> Line<'static> {
    let (icon, color) = status_icon(status);
    Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(color)),
        Span::styled(status.label(), Style::default().fg(color)),
    ])
}

fn actions_line(active: bool, loading: bool, spinner_frame: usize) -> Line<'static> {
    let trigger_style = if active {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let mut spans = vec![
        Span::styled(ACTIONS_PREFIX, Style::default().fg(Color::DarkGray)),
        Span::styled(TRIGGER_LABEL, trigger_style),
    ];
    if loading {
        spans.push(Span::styled(
            format!(" {}", spinner::frame(spinner_frame)),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn toggle_line(card: &Card) -> Line<'static> {
    let style = if !card.enabled {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    } else if card.status == ProjectStatus::Running {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(format!("[{}]", card.label), style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::BUSY_LABEL;

    fn card(status: ProjectStatus, enabled: bool, label: &str) -> Card {
        Card {
            name: "web".into(),
            status,
            path: "/srv/web".into(),
            label: label.into(),
            enabled,
        }
    }

    #[test]
    fn icon_running() {
        assert_eq!(status_icon(ProjectStatus::Running), ("●", Color::Green));
    }

    #[test]
    fn icon_stopped() {
        assert_eq!(status_icon(ProjectStatus::Stopped), ("○", Color::DarkGray));
    }

    #[test]
    fn busy_toggle_is_dimmed() {
        let line = toggle_line(&card(ProjectStatus::Running, false, BUSY_LABEL));
        assert_eq!(line.spans[0].content, format!("[{BUSY_LABEL}]"));
        assert_eq!(line.spans[0].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn stop_control_is_red() {
        let line = toggle_line(&card(ProjectStatus::Running, true, "■ Stop"));
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn loading_trigger_shows_spinner() {
        assert_eq!(actions_line(false, false, 0).spans.len(), 2);
        assert_eq!(actions_line(false, true, 0).spans.len(), 3);
    }
}
