use std::cell::RefCell;
use std::rc::Rc;

use jigsaw_core::{Artwork, Session};
use web_sys::AudioContext;

/// Per-game state shared between the exported handle and its timer callbacks.
pub struct State {
    pub session: Session,
    pub artwork: &'static Artwork,
    pub audio: Option<AudioContext>,
    pub muted: bool,
    /// Called with `"mismatch-cleared"` or `"won"` when a timer changes the game.
    pub on_change: Option<js_sys::Function>,
}

pub type SharedState = Rc<RefCell<State>>;

impl State {
    pub fn new(session: Session, artwork: &'static Artwork) -> Self {
        Self {
            session,
            artwork,
            audio: None,
            muted: false,
            on_change: None,
        }
    }

    /// Audio context, created on first use so it starts after a user gesture.
    pub fn audio(&mut self) -> Option<&AudioContext> {
        if self.audio.is_none() {
            self.audio = AudioContext::new().ok();
        }
        self.audio.as_ref()
    }
}
