//! Terminal input thread and application event channel.
//!
//! [`EventHandler`] reads the terminal on an OS thread because
//! `crossterm::event::poll()` blocks. Every background task (refreshes, toggle
//! calls, timers, log readers) reports back through the same unbounded channel,
//! so the event loop sees results in the order they resolved.

use crate::backend::{ActionAck, Container};
use crate::error::ApiError;
use crate::store::Project;
use crate::sync::{RefreshTrigger, SnapshotSource};
use crate::toggle::ToggleRequest;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    FocusGained,
    FocusLost,
    Resize(u16, u16),
    Tick,
    RefreshRequested(RefreshTrigger),
    Refreshed {
        projects: Vec<Project>,
        source: SnapshotSource,
    },
    /// Sent by the refresh guard however the refresh ended.
    RefreshFinished,
    /// The refresh task itself died; the grid gives way to an error message.
    RefreshFailed(String),
    ActionResult {
        request: ToggleRequest,
        result: Result<ActionAck, ApiError>,
    },
    HoverElapsed {
        project: String,
        token: u64,
    },
    HideElapsed {
        project: String,
        token: u64,
    },
    ContainersResult {
        project: String,
        result: Result<Vec<Container>, ApiError>,
    },
    LogChunk {
        session: u64,
        text: String,
    },
    LogEnded {
        session: u64,
        error: Option<String>,
    },
    ComposeResult {
        project: String,
        result: Result<String, ApiError>,
    },
    ReopenCompose(String),
    ClipboardResult(Result<(), String>),
    /// Global toast, auto-dismisses after `ERROR_TTL_SECS`.
    Error(String),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let thread = std::thread::spawn(move || {
            while !shutdown_flag.load(Ordering::Relaxed) {
                match event::poll(tick_rate) {
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::Error(format!("Terminal poll error: {e}")));
                        break;
                    }
                    Ok(false) => {
                        if event_tx.send(AppEvent::Tick).is_err() {
                            break;
                        }
                        continue;
                    }
                    Ok(true) => {}
                }
                let forwarded = match event::read() {
                    Ok(CrosstermEvent::Key(key)) => Some(AppEvent::Key(key)),
                    Ok(CrosstermEvent::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
                    Ok(CrosstermEvent::FocusGained) => Some(AppEvent::FocusGained),
                    Ok(CrosstermEvent::FocusLost) => Some(AppEvent::FocusLost),
                    Ok(CrosstermEvent::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                    Ok(_) => None,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => None,
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::Error(format!("Terminal read error: {e}")));
                        break;
                    }
                };
                if let Some(ev) = forwarded {
                    if event_tx.send(ev).is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            rx,
            tx,
            shutdown,
            thread: Some(thread),
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("input thread panicked");
            }
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        // Signal only. Joining here could hang while `poll` blocks during unwinding.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
