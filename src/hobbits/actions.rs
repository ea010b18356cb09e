//! Semantic action IDs for Hobbit Clicker click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

pub const CLICK_HOBBIT: u16 = 0;
pub const TOGGLE_SOUND: u16 = 1;
pub const RESET: u16 = 2;

// ── Upgrade purchase (base + catalog index) ─────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;
