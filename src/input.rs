use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    AcknowledgeAlert,
    DismissError,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Toggle,
    Restart,
    Refresh,
    OpenLogs,
    OpenCompose,
    OpenConsole,
    CloseMenu,
    OpenContainer(usize),
    QuickSelect(usize),
    EditCompose,
    CopyToClipboard,
    CloseOverlay,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
    None,
}

/// Which overlay (if any) is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    None,
    Log,
    Compose,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub has_alert: bool,
    pub has_error: bool,
    pub is_loading: bool,
    pub menu_open: bool,
    pub overlay: OverlayMode,
}

fn digit(c: char) -> Option<usize> {
    c.to_digit(10).filter(|&d| d != 0).map(|d| d as usize)
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // A pending alert blocks everything else until acknowledged
    if ctx.has_alert {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'q') => Action::AcknowledgeAlert,
            _ => Action::None,
        };
    }

    match ctx.overlay {
        OverlayMode::Log | OverlayMode::Compose => {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::PageDown => Action::PageDown,
                KeyCode::PageUp => Action::PageUp,
                KeyCode::Char('g') | KeyCode::Home => Action::ScrollToTop,
                KeyCode::Char('G') | KeyCode::End => Action::ScrollToBottom,
                KeyCode::Char('y') => Action::CopyToClipboard,
                KeyCode::Char('E') if ctx.overlay == OverlayMode::Compose => Action::EditCompose,
                KeyCode::Char('e') if ctx.overlay == OverlayMode::Log => Action::CloseOverlay,
                KeyCode::Char('v') if ctx.overlay == OverlayMode::Compose => Action::CloseOverlay,
                KeyCode::Char('q') | KeyCode::Esc => Action::CloseOverlay,
                _ => Action::None,
            };
        }
        OverlayMode::None => {}
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.menu_open {
                Action::CloseMenu
            } else if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Char(' ') | KeyCode::Enter => Action::Toggle,
        KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('r') if !ctx.is_loading => Action::Refresh,
        KeyCode::Char('e') => Action::OpenLogs,
        KeyCode::Char('v') => Action::OpenCompose,
        KeyCode::Char('c') => {
            if ctx.menu_open {
                Action::CloseMenu
            } else {
                Action::OpenConsole
            }
        }
        KeyCode::Char(c) => match digit(c) {
            Some(n) if ctx.menu_open => Action::OpenContainer(n),
            Some(n) => Action::QuickSelect(n),
            None => Action::None,
        },
        _ => Action::None,
    }
}
