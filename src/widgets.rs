//! Clickable UI building blocks.
//!
//! Rendering and click registration live together so a visible `[X]` label
//! can never drift away from its target.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::{Line, Span};

use crate::input::ClickState;

/// Lines paired with optional click actions.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Upgrades"));
/// cl.push_clickable(Line::from("[1] Hobbit Hole"), BUY_UPGRADE_BASE);
/// cl.register_targets(area, &mut cs, 1, 1);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a line that triggers `action_id` when tapped.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register one row target per clickable line. Lines are assumed not to
    /// wrap; rows past the bottom of `area` are skipped.
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState, top_offset: u16, bottom_offset: u16) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);
        for &(line_idx, action_id) in &self.actions {
            let row = content_y + line_idx;
            if row < content_end {
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}

/// A single row of hint spans, each its own click target.
///
/// Used for the help bar: `[C] Click  [M] Sound  [R] Reset`.
pub struct HintBar<'a> {
    hints: Vec<(Span<'a>, u16)>,
    separator: &'a str,
}

impl<'a> HintBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            hints: Vec::new(),
            separator,
        }
    }

    pub fn hint(mut self, span: Span<'a>, action_id: u16) -> Self {
        self.hints.push((span, action_id));
        self
    }

    /// Build the line and register a target over each hint's columns,
    /// starting at column `x` of row `y`.
    pub fn into_line(self, x: u16, y: u16, cs: &mut ClickState) -> Line<'a> {
        let sep_width = Span::raw(self.separator).width() as u16;
        let mut spans = Vec::with_capacity(self.hints.len() * 2);
        let mut cursor = x;
        for (i, (span, action_id)) in self.hints.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(self.separator));
                cursor += sep_width;
            }
            let w = span.width() as u16;
            cs.add_click_target(Rect::new(cursor, y, w, 1), action_id);
            cursor += w;
            spans.push(span);
        }
        Line::from(spans)
    }
}
