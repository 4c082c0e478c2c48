//! Render pass: turns the ordered project sequence into the grid the terminal
//! draws, and the screen geometry used both for drawing and for mouse hit-tests.

use crate::backend::ProjectAction;
use crate::store::{Project, ProjectStatus, ProjectStore};
use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::UnicodeWidthStr;

pub const CARD_WIDTH: u16 = 32;
pub const CARD_HEIGHT: u16 = 6;
pub const CARD_GAP: u16 = 1;

/// Text left of the console trigger on a card's action row.
pub const ACTIONS_PREFIX: &str = "v compose  e logs  ";
pub const TRIGGER_LABEL: &str = "c console ▾";
pub const BUSY_LABEL: &str = "… working";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub status: ProjectStatus,
    pub path: String,
    /// Toggle control label; replaced by [`BUSY_LABEL`] while a request is in flight.
    pub label: String,
    pub enabled: bool,
}

impl Card {
    fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            status: project.status,
            path: project.path.clone(),
            label: toggle_label(project.status).to_string(),
            enabled: true,
        }
    }
}

pub fn toggle_label(status: ProjectStatus) -> &'static str {
    match ProjectAction::toggle_for(status) {
        ProjectAction::Start => "▶ Start",
        ProjectAction::Stop | ProjectAction::Restart => "■ Stop",
    }
}

/// What the last render pass produced: one card per project plus the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridView {
    pub cards: Vec<Card>,
    pub running_count: usize,
    pub stopped_count: usize,
}

impl GridView {
    pub fn card(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name == name)
    }

    /// Disables the toggle control and returns the label it had before.
    pub fn mark_busy(&mut self, name: &str) -> Option<String> {
        let card = self.cards.iter_mut().find(|c| c.name == name)?;
        card.enabled = false;
        Some(std::mem::replace(&mut card.label, BUSY_LABEL.to_string()))
    }

    pub fn restore(&mut self, name: &str, label: String) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.name == name) {
            card.enabled = true;
            card.label = label;
        }
    }

    /// Keys of the console triggers, which dropdown controllers bind to.
    pub fn trigger_keys(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Builds a fresh grid. `None` for an empty sequence: the caller keeps what it
/// showed before instead of blanking the screen on a transient empty answer.
pub fn render_pass(store: &ProjectStore) -> Option<GridView> {
    if store.is_empty() {
        return None;
    }
    let cards: Vec<Card> = store.projects().iter().map(Card::from_project).collect();
    let (running_count, stopped_count) = store.counts();
    Some(GridView {
        cards,
        running_count,
        stopped_count,
    })
}

// --- Geometry ---

/// `[header, body, footer]`.
pub fn screen_layout(screen: Rect) -> [Rect; 3] {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(2),
    ])
    .split(screen);
    [chunks[0], chunks[1], chunks[2]]
}

pub fn columns_for(width: u16) -> usize {
    (usize::from(width.saturating_add(CARD_GAP)) / usize::from(CARD_WIDTH + CARD_GAP)).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRegion {
    pub index: usize,
    pub card: Rect,
    /// The `c console ▾` span.
    pub trigger: Rect,
    /// The toggle control row.
    pub toggle: Rect,
}

/// First grid row to draw so the row holding `cursor` stays visible.
pub fn first_visible_row(cursor: usize, columns: usize, visible_rows: usize) -> usize {
    let row = cursor / columns.max(1);
    let visible_rows = visible_rows.max(1);
    if row >= visible_rows {
        row + 1 - visible_rows
    } else {
        0
    }
}

pub fn card_regions(body: Rect, count: usize, cursor: usize) -> Vec<CardRegion> {
    let columns = columns_for(body.width);
    let visible_rows = usize::from((body.height + CARD_GAP) / (CARD_HEIGHT + CARD_GAP)).max(1);
    let first_row = first_visible_row(cursor, columns, visible_rows);
    let card_width = CARD_WIDTH.min(body.width);
    let prefix_width = ACTIONS_PREFIX.width() as u16;
    let trigger_width = TRIGGER_LABEL.width() as u16;

    (first_row * columns..count)
        .take(visible_rows * columns)
        .filter_map(|index| {
            let row = (index / columns - first_row) as u16;
            let col = (index % columns) as u16;
            let x = body.x + col * (CARD_WIDTH + CARD_GAP);
            let y = body.y + row * (CARD_HEIGHT + CARD_GAP);
            if y + CARD_HEIGHT > body.y + body.height {
                return None;
            }
            let card = Rect::new(x, y, card_width, CARD_HEIGHT);
            let inner_x = x + 1;
            let inner_width = card_width.saturating_sub(2);
            let trigger_x = inner_x + prefix_width.min(inner_width);
            let trigger = Rect::new(
                trigger_x,
                y + 3,
                trigger_width.min((inner_x + inner_width).saturating_sub(trigger_x)),
                1,
            );
            let toggle = Rect::new(inner_x, y + 4, inner_width, 1);
            Some(CardRegion {
                index,
                card,
                trigger,
                toggle,
            })
        })
        .collect()
}

/// Where a dropdown opened from `trigger` is drawn, clipped to `screen`.
pub fn menu_region(trigger: Rect, entries: &[String], screen: Rect) -> Rect {
    let widest = entries.iter().map(|e| e.width()).max().unwrap_or(0) as u16;
    let width = (widest + 6).max(18).min(screen.width);
    let height = (entries.len().max(1) as u16 + 2).min(screen.height);
    let x = trigger.x.min(screen.right().saturating_sub(width));
    let y = (trigger.y + 1).min(screen.bottom().saturating_sub(height));
    Rect::new(x, y, width, height)
}

/// Log and compose overlays: ~90% width, ~80% height, centered.
pub fn overlay_area(screen: Rect) -> Rect {
    let width = (screen.width * 9 / 10).max(screen.width.min(20)).min(screen.width);
    let height = (screen.height * 8 / 10).max(6).min(screen.height);
    let x = screen.x + (screen.width.saturating_sub(width)) / 2;
    let y = screen.y + (screen.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Text lines an overlay shows at once (inside its border).
pub fn overlay_viewport(screen: Rect) -> usize {
    usize::from(overlay_area(screen).height.saturating_sub(2)).max(1)
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}
