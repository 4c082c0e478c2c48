use crate::app::{ActiveOverlay, AppState, ProjectsView};
use crate::tui::{alert_overlay, compose_overlay, footer, grid, header, log_overlay, menu};
use crate::view;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

pub fn render(f: &mut Frame, state: &AppState) {
    let [header_area, body, footer_area] = view::screen_layout(f.area());

    header::render(f, header_area, state);
    match &state.view {
        ProjectsView::Grid => {
            grid::render(f, body, state);
            menu::render(f, state);
        }
        ProjectsView::LoadError(message) => {
            let para = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(para, body);
        }
    }
    footer::render(f, footer_area, state);

    match &state.overlay {
        ActiveOverlay::Log(session) => log_overlay::render(f, session, state.spinner_frame),
        ActiveOverlay::Compose(view) => compose_overlay::render(f, view, state.spinner_frame),
        ActiveOverlay::None => {}
    }

    // Alerts sit above everything else
    if let Some(message) = state.current_alert() {
        alert_overlay::render(f, message, state.alerts.len());
    }
}
