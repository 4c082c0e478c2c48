use dcw::app::AppState;
use dcw::backend::http::HttpBackend;
use dcw::cli::Cli;
use dcw::compose;
use dcw::events::{AppEvent, EventHandler};
use dcw::handler::{self, Services};
use dcw::logging;
use dcw::sync::SyncEngine;
use dcw::tui;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let config = args.config();

    let state_dir = logging::state_dir();
    if args.verbose {
        let path = logging::setup_verbose_logging(&state_dir)?;
        eprintln!("Logging to {}", path.display());
    }

    let backend = HttpBackend::new(&config.base_url)
        .map_err(|e| eyre!("Invalid --url {:?}: {e}", config.base_url))?;
    tracing::info!(url = %config.base_url, "starting");

    let mouse = config.mouse;
    let interval = config.interval_secs;
    let mut state = AppState::new(config);
    state.pending_reopen = compose::take_reopen_marker(&state_dir);

    // Setup terminal with panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            DisableFocusChange,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    // Event handler
    let events = EventHandler::new(Duration::from_millis(100));
    let services = Services {
        backend: Arc::new(backend),
        tx: events.sender(),
        state_dir,
    };

    spawn_monitored(
        "sync engine",
        SyncEngine::new(services.tx.clone(), interval).run(),
        services.tx.clone(),
    );

    let result = run_app(&mut terminal, &mut state, events, &services).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    services: &Services,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        state.screen = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| tui::render::render(f, state))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(state, event, services);

        if state.should_quit {
            break;
        }
    }
    events.stop();
    tracing::info!("shutting down");
    Ok(())
}

/// Spawns a long-running task and reports it on the event channel if it dies.
fn spawn_monitored(
    name: &'static str,
    task: impl std::future::Future<Output = ()> + Send + 'static,
    tx: tokio::sync::mpsc::UnboundedSender<AppEvent>,
) {
    let handle = tokio::spawn(task);
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            tracing::error!("{name} stopped: {e}");
            let _ = tx.send(AppEvent::Error(format!("{name} stopped: {e}")));
        }
    });
}
