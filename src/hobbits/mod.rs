/// Hobbit Clicker — click for hobbits, buy upgrades for hobbits per second.

pub mod actions;
pub mod logic;
pub mod render;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::audio::{Jukebox, PlayRequest};
use crate::catalog::{self, UpgradeDefinition};
use crate::config::GameConfig;
use crate::error::{CatalogLoadError, PurchaseError};
use crate::input::{ClickState, InputEvent};
use crate::storage::KeyValueStore;

use logic::{format_number, Cue};
use state::Progression;

/// Where the current upgrade list came from.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogStatus {
    Loading,
    Remote,
    /// Remote load failed; the bundled catalog is in use.
    Fallback(String),
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

const MAX_LOG: usize = 50;

pub struct HobbitGame<S> {
    pub progress: Progression<S>,
    pub jukebox: Jukebox,
    pub catalog: CatalogStatus,
    pub log: Vec<LogEntry>,
    /// First reset press arms this; the second one wipes the save.
    pub confirm_reset: bool,
    /// Ticks left on the button flash after a click.
    pub click_flash: u32,
    config: GameConfig,
    pending_sounds: Vec<PlayRequest>,
    storage_warned: bool,
}

impl<S: KeyValueStore> HobbitGame<S> {
    pub fn new(store: S, config: GameConfig) -> Self {
        let progress = Progression::load(store);
        let mut game = Self {
            jukebox: Jukebox::new(config.sound_enabled),
            catalog: CatalogStatus::Loading,
            log: Vec::new(),
            confirm_reset: false,
            click_flash: 0,
            config,
            pending_sounds: Vec::new(),
            storage_warned: false,
            progress,
        };
        if game.progress.total() > 0 || game.progress.rate() > 0 {
            game.add_log(
                &format!(
                    "Welcome back! {} hobbits are waiting for you.",
                    format_number(game.progress.total())
                ),
                true,
            );
        } else {
            game.add_log("Welcome to the Shire. Click to gather hobbits!", true);
        }
        game
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Install the result of the catalog load. Failures fall back to the
    /// bundled catalog and are shown to the player.
    pub fn catalog_loaded(&mut self, result: Result<Vec<UpgradeDefinition>, CatalogLoadError>) {
        let defs = match result {
            Ok(defs) => {
                self.catalog = CatalogStatus::Remote;
                defs
            }
            Err(err) => {
                log::error!("upgrade catalog unavailable: {err}");
                self.add_log(&format!("Could not fetch upgrades ({err}). Using the bundled list."), true);
                self.catalog = CatalogStatus::Fallback(err.to_string());
                catalog::builtin_catalog()
            }
        };
        let revealed = logic::install_catalog(&mut self.progress, defs);
        self.announce_unlocks(&revealed);
        self.check_storage();
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        };
        self.check_storage();
        consumed
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            'r' | 'R' => {
                self.request_reset();
                return true;
            }
            _ => self.confirm_reset = false,
        }
        match key {
            'c' | 'C' | ' ' => {
                self.click();
                true
            }
            'm' | 'M' => {
                self.toggle_sound();
                true
            }
            '1'..='9' | '0' => {
                // Number keys address the visible rows, not catalog slots.
                let slot = if key == '0' { 9 } else { key as usize - '1' as usize };
                if let Some(&index) = self.progress.unlocked_indices().get(slot) {
                    self.buy(index);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, id: u16) -> bool {
        if id != actions::RESET {
            self.confirm_reset = false;
        }
        match id {
            actions::CLICK_HOBBIT => self.click(),
            actions::TOGGLE_SOUND => self.toggle_sound(),
            actions::RESET => self.request_reset(),
            id if id >= actions::BUY_UPGRADE_BASE => {
                self.buy((id - actions::BUY_UPGRADE_BASE) as usize)
            }
            _ => return false,
        }
        true
    }

    /// Apply `delta_ticks` seconds of passive generation.
    pub fn tick(&mut self, delta_ticks: u32) {
        for _ in 0..delta_ticks {
            let revealed = logic::tick(&mut self.progress);
            self.announce_unlocks(&revealed);
        }
        self.click_flash = self.click_flash.saturating_sub(delta_ticks);
        if delta_ticks > 0 {
            self.check_storage();
        }
    }

    /// Sounds cleared for playback since the last call.
    pub fn take_sounds(&mut self) -> Vec<PlayRequest> {
        std::mem::take(&mut self.pending_sounds)
    }

    /// The gated purchase sound has ended (or failed to start).
    pub fn sound_finished(&mut self) {
        self.jukebox.finished();
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }

    fn click(&mut self) {
        let (cue, revealed) = logic::click(&mut self.progress);
        self.click_flash = 1;
        if let Some(cue) = cue {
            self.cue(cue);
        }
        self.announce_unlocks(&revealed);
    }

    fn buy(&mut self, index: usize) {
        match logic::purchase(&mut self.progress, index) {
            Ok(bought) => {
                let name = self.progress.upgrades[index].def.name.clone();
                self.add_log(
                    &format!(
                        "{} #{} acquired for {} hobbits.",
                        name,
                        bought.owned,
                        format_number(bought.spent)
                    ),
                    false,
                );
                if let Some(cue) = bought.cue {
                    self.cue(cue);
                }
                self.announce_unlocks(&bought.unlocked);
            }
            Err(PurchaseError::InsufficientResource { needed, .. }) => {
                self.add_log(
                    &format!("Insufficient hobbits! You need {}.", format_number(needed)),
                    false,
                );
            }
            Err(err) => log::debug!("purchase ignored: {err}"),
        }
    }

    fn request_reset(&mut self) {
        if self.confirm_reset {
            logic::reset(&mut self.progress);
            self.confirm_reset = false;
            self.add_log("The Shire is empty again. All progress reset.", true);
        } else {
            self.confirm_reset = true;
            self.add_log("Press R again to erase all progress.", true);
        }
    }

    fn toggle_sound(&mut self) {
        let on = self.jukebox.toggle();
        self.add_log(if on { "Sound on." } else { "Sound off." }, false);
    }

    fn cue(&mut self, cue: Cue) {
        let path = match &cue {
            Cue::Theme => self.config.theme_path(),
            Cue::Purchase(i) => match self.progress.upgrades.get(*i) {
                Some(u) => self.config.sound_path(&u.def.name),
                None => return,
            },
        };
        if let Some(request) = self.jukebox.admit(&cue, path) {
            self.pending_sounds.push(request);
        }
    }

    fn announce_unlocks(&mut self, revealed: &[usize]) {
        for &i in revealed {
            if let Some(u) = self.progress.upgrades.get(i) {
                let text = format!("New upgrade available: {}!", u.def.name);
                self.add_log(&text, true);
            }
        }
    }

    fn check_storage(&mut self) {
        if let Some(err) = self.progress.game.take_storage_fault() {
            if !self.storage_warned {
                self.storage_warned = true;
                self.add_log(&format!("Saving failed: {err}. Progress may be lost."), true);
            }
        }
    }
}
