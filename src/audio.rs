//! Sound cues: the single-sound gate and browser playback.

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::hobbits::logic::Cue;

/// A sound cleared for playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub path: String,
    /// The request owns the "one purchase sound at a time" slot; release it
    /// via [`Jukebox::finished`] when playback ends.
    pub holds_gate: bool,
}

/// Decides which cues are heard.
///
/// Purchase sounds never overlap: while one is playing the next is dropped,
/// not queued. The opening theme ignores the gate.
#[derive(Debug)]
pub struct Jukebox {
    enabled: bool,
    playing: bool,
}

impl Jukebox {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            playing: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip sound on/off. Returns the new setting.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn admit(&mut self, cue: &Cue, path: String) -> Option<PlayRequest> {
        if !self.enabled {
            return None;
        }
        match cue {
            Cue::Theme => Some(PlayRequest {
                path,
                holds_gate: false,
            }),
            Cue::Purchase(_) if self.playing => None,
            Cue::Purchase(_) => {
                self.playing = true;
                Some(PlayRequest {
                    path,
                    holds_gate: true,
                })
            }
        }
    }

    pub fn finished(&mut self) {
        self.playing = false;
    }
}

/// Start playing `path`. `release` runs once when playback ends or fails.
pub fn play(path: &str, release: Option<Rc<dyn Fn()>>) {
    let audio = match web_sys::HtmlAudioElement::new_with_src(path) {
        Ok(audio) => audio,
        Err(err) => {
            log::warn!("cannot create audio for {path:?}: {err:?}");
            if let Some(release) = release {
                release();
            }
            return;
        }
    };

    if let Some(release) = release.clone() {
        let on_ended = Closure::once_into_js(move || release());
        audio.set_onended(Some(on_ended.unchecked_ref()));
    }

    let started = match audio.play() {
        Ok(promise) => promise,
        Err(err) => {
            fail(path, err, release);
            return;
        }
    };
    let path = path.to_string();
    wasm_bindgen_futures::spawn_local(async move {
        // Autoplay policies reject play() before the first user gesture.
        if let Err(err) = JsFuture::from(started).await {
            fail(&path, err, release);
        }
    });
}

fn fail(path: &str, err: JsValue, release: Option<Rc<dyn Fn()>>) {
    log::warn!("could not play {path:?}: {err:?}");
    if let Some(release) = release {
        release();
    }
}
