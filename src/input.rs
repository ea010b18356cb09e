//! Input plumbing: normalized events, click targets, and pixel-to-cell conversion.

use ratzilla::ratatui::layout::Rect;

/// Keyboard and pointer input, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// A click/tap on a registered target, carrying its action ID
    /// (see `hobbits::actions`).
    Click(u16),
}

/// A clickable region in terminal cell coordinates.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Click targets registered during the last draw, plus the terminal size
/// the mouse handler needs for coordinate conversion.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width row of `area`. Rows outside `area` are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Action under a cell. Later registrations sit on top.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            let inside = col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then_some(t.action_id)
        })
    }
}

/// Below this width the log panel is dropped.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// Map a pixel offset inside the grid container to a cell index along one
/// axis. `None` outside the grid or for degenerate sizes.
pub fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}
