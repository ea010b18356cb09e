mod audio;
mod catalog;
mod config;
mod error;
mod fetch;
mod hobbits;
mod input;
mod logging;
mod storage;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use config::{GameConfig, OVERRIDE_KEYS};
use hobbits::HobbitGame;
use input::{pixel_to_cell, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use storage::BrowserStore;
use time::TickClock;

type SharedGame = Rc<RefCell<HobbitGame<BrowserStore>>>;

/// Bundled config with `?catalog=…&sound=off&log=debug&timeout=…` applied.
fn load_config() -> GameConfig {
    let params = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok());
    let overrides: Vec<(&str, String)> = match &params {
        Some(params) => OVERRIDE_KEYS
            .iter()
            .filter_map(|&key| params.get(key).map(|value| (key, value)))
            .collect(),
        None => Vec::new(),
    };
    GameConfig::builtin().with_overrides(overrides.iter().map(|(k, v)| (*k, v.as_str())))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_to_cell(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_to_cell(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    log::trace!("click: pixel=({mouse_x},{mouse_y}) cell=({col},{row}) targets={}", cs.targets.len());
    Some((col, row))
}

/// Hand queued sounds to the browser. Must run outside any game borrow: a
/// failed start releases the gate synchronously.
fn play_pending(game: &SharedGame) {
    let sounds = game.borrow_mut().take_sounds();
    for request in sounds {
        let release: Option<Rc<dyn Fn()>> = if request.holds_gate {
            let game = game.clone();
            Some(Rc::new(move || game.borrow_mut().sound_finished()))
        } else {
            None
        };
        audio::play(&request.path, release);
    }
}

fn dispatch(game: &SharedGame, event: InputEvent) {
    game.borrow_mut().handle_input(&event);
    play_pending(game);
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let config = load_config();
    log::set_max_level(config.level_filter());
    log::info!("starting hobbit clicker, catalog at {}", config.catalog_url);

    let catalog_url = config.catalog_url.clone();
    let fetch_timeout_ms = config.fetch_timeout_ms;
    let mut clock = TickClock::new(config.tick_interval_ms);

    let game: SharedGame = Rc::new(RefCell::new(HobbitGame::new(BrowserStore::open(), config)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    wasm_bindgen_futures::spawn_local({
        let game = game.clone();
        async move {
            let result = catalog::load_remote(&catalog_url, fetch_timeout_ms).await;
            game.borrow_mut().catalog_loaded(result);
        }
    });

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(action_id) = action {
                dispatch(&game, InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                dispatch(&game, InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let ticks = clock.update(now_ms());
            if ticks > 0 {
                game.borrow_mut().tick(ticks);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
