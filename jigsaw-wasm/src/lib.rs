//! Browser front end: one [`JigsawGame`] per puzzle on the page.

use std::cell::RefCell;
use std::rc::Rc;

use jigsaw_core::{
    DEFAULT_GRID, Feedback, Grid, Point, Session, Transition, artwork_by_id, default_artwork,
};
use jigsaw_svg::{BoardMarks, build_board_svg, clip_path_defs, manifest_json};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

mod audio;
mod constants;
mod state;
mod trivia;
mod utils;
mod view;

use constants::{BOARD_HEIGHT_PX, BOARD_WIDTH_PX, MISMATCH_CLEAR_MS, WIN_REVEAL_MS};
use state::{SharedState, State};
use utils::{get_query_param, log, random_seed};
use view::TransitionView;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn play_cues(state: &mut State, cues: &[Feedback]) {
    if state.muted {
        return;
    }
    let Some(ctx) = state.audio() else {
        return;
    };
    for &cue in cues {
        if let Err(err) = audio::play(ctx, cue) {
            log(&format!("cue {:?} failed: {:?}", cue, err));
        }
    }
}

fn notify(state: &SharedState, event: &str) {
    let callback = state.borrow().on_change.clone();
    if let Some(f) = callback
        && let Err(err) = f.call1(&JsValue::NULL, &JsValue::from_str(event))
    {
        log(&format!("on_change handler threw: {:?}", err));
    }
}

fn set_timeout(ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    if let Err(err) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
    {
        log(&format!("setTimeout failed: {:?}", err));
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    log("jigsaw ready");
}

#[wasm_bindgen]
pub struct JigsawGame {
    state: SharedState,
}

#[wasm_bindgen]
impl JigsawGame {
    /// New session. `seed` is drawn from `Math.random` when omitted; an
    /// unknown `artwork` falls back to the default one.
    #[wasm_bindgen(constructor)]
    pub fn new(
        rows: u32,
        cols: u32,
        seed: Option<f64>,
        artwork: Option<String>,
    ) -> Result<JigsawGame, JsValue> {
        let grid = Grid::new(rows, cols).map_err(to_js)?;
        let seed = seed.map(|s| s as u64).unwrap_or_else(random_seed);
        let artwork = artwork
            .as_deref()
            .and_then(artwork_by_id)
            .unwrap_or_else(default_artwork);
        let session = Session::new(grid, &mut StdRng::seed_from_u64(seed));
        log(&format!(
            "new game: {} pieces of {} (seed {})",
            session.pieces().len(),
            artwork.title,
            seed
        ));
        Ok(JigsawGame {
            state: Rc::new(RefCell::new(State::new(session, artwork))),
        })
    }

    /// Build from `?rows=&cols=&seed=&art=` in the page URL.
    #[wasm_bindgen(js_name = fromLocation)]
    pub fn from_location() -> Result<JigsawGame, JsValue> {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let num = |key: &str| get_query_param(&search, key).and_then(|v| v.parse::<u32>().ok());
        let rows = num("rows").unwrap_or(DEFAULT_GRID.rows() as u32);
        let cols = num("cols").unwrap_or(DEFAULT_GRID.cols() as u32);
        let seed = get_query_param(&search, "seed").and_then(|v| v.parse::<f64>().ok());
        JigsawGame::new(rows, cols, seed, get_query_param(&search, "art"))
    }

    #[wasm_bindgen(js_name = selectPiece)]
    pub fn select_piece(&self, id: usize) -> String {
        let transition = self.state.borrow_mut().session.select_piece(id);
        self.after(transition)
    }

    #[wasm_bindgen(js_name = attemptPlace)]
    pub fn attempt_place(&self, slot: usize) -> String {
        let transition = self.state.borrow_mut().session.attempt_place(slot);
        self.after(transition)
    }

    /// Place the selected piece into whichever slot contains the board point
    /// `(x, y)`, both in `[0, 1]`.
    #[wasm_bindgen(js_name = placeAt)]
    pub fn place_at(&self, x: f64, y: f64) -> String {
        let slot = self.state.borrow().session.tiling().slot_at(Point::new(x, y));
        match slot {
            Some(slot) => self.attempt_place(slot),
            None => self.after(Transition::Ignored),
        }
    }

    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&self, callback: Option<js_sys::Function>) {
        self.state.borrow_mut().on_change = callback;
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    #[wasm_bindgen(js_name = trayIds)]
    pub fn tray_ids(&self) -> Vec<u32> {
        self.state
            .borrow()
            .session
            .tray_ids()
            .map(|id| id as u32)
            .collect()
    }

    /// Tray rotation of a piece in degrees.
    #[wasm_bindgen(js_name = trayTilt)]
    pub fn tray_tilt(&self, id: usize) -> f64 {
        self.state.borrow().session.tray_tilt(id).unwrap_or(0.0)
    }

    /// Piece occupying `slot`, if any.
    pub fn occupant(&self, slot: usize) -> Option<u32> {
        self.state.borrow().session.occupant(slot).map(|id| id as u32)
    }

    pub fn selected(&self) -> Option<u32> {
        self.state.borrow().session.selected().map(|id| id as u32)
    }

    #[wasm_bindgen(js_name = mismatchSlot)]
    pub fn mismatch_slot(&self) -> Option<u32> {
        self.state.borrow().session.mismatch().map(|m| m.slot as u32)
    }

    /// `"placed / total"`.
    pub fn progress(&self) -> String {
        self.state.borrow().session.progress().to_string()
    }

    pub fn moves(&self) -> u32 {
        self.state.borrow().session.moves()
    }

    #[wasm_bindgen(js_name = isWon)]
    pub fn is_won(&self) -> bool {
        self.state.borrow().session.is_won()
    }

    /// Piece sprites as JSON: outline, image window and image URL per piece.
    pub fn manifest(&self) -> Result<String, JsValue> {
        let s = self.state.borrow();
        manifest_json(s.session.pieces(), &s.artwork.image_url()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clipPathDefs)]
    pub fn clip_path_defs(&self) -> String {
        clip_path_defs(self.state.borrow().session.pieces())
    }

    #[wasm_bindgen(js_name = boardSvg)]
    pub fn board_svg(&self, width: Option<u32>, height: Option<u32>) -> String {
        let s = self.state.borrow();
        build_board_svg(
            s.session.pieces(),
            width.unwrap_or(BOARD_WIDTH_PX),
            height.unwrap_or(BOARD_HEIGHT_PX),
            &BoardMarks::from_session(&s.session),
            Some(s.artwork.title),
        )
    }

    /// Artwork metadata as JSON.
    pub fn artwork(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.borrow().artwork).map_err(to_js)
    }

    /// Resolves to a one-sentence fact about the artwork. Never rejects.
    #[wasm_bindgen(js_name = fetchFact)]
    pub fn fetch_fact(&self, api_key: Option<String>, model: Option<String>) -> js_sys::Promise {
        let title = self.state.borrow().artwork.title.to_string();
        wasm_bindgen_futures::future_to_promise(async move {
            Ok(JsValue::from_str(
                &trivia::fetch_fact(api_key, model, title).await,
            ))
        })
    }
}

impl JigsawGame {
    fn after(&self, transition: Transition) -> String {
        let view = {
            let mut s = self.state.borrow_mut();
            // The win cue waits for the reveal.
            let cues: Vec<Feedback> = transition
                .feedback()
                .iter()
                .copied()
                .filter(|f| *f != Feedback::Win)
                .collect();
            play_cues(&mut s, &cues);
            TransitionView::new(&transition, s.session.progress())
        };

        match transition {
            Transition::Mismatch { mismatch, .. } => {
                let st = self.state.clone();
                set_timeout(MISMATCH_CLEAR_MS, move || {
                    let cleared = st.borrow_mut().session.clear_mismatch(mismatch.token);
                    if cleared {
                        notify(&st, "mismatch-cleared");
                    }
                });
            }
            Transition::Won { .. } => {
                let st = self.state.clone();
                set_timeout(WIN_REVEAL_MS, move || {
                    play_cues(&mut st.borrow_mut(), &[Feedback::Win]);
                    notify(&st, "won");
                });
            }
            _ => {}
        }
        view.to_json()
    }
}
