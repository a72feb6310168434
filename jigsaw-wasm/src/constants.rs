use jigsaw_core::{MISMATCH_CLEAR_DELAY, WIN_REVEAL_DELAY};

/// Timer delays in the unit `setTimeout` takes.
pub const MISMATCH_CLEAR_MS: i32 = MISMATCH_CLEAR_DELAY.as_millis() as i32;
pub const WIN_REVEAL_MS: i32 = WIN_REVEAL_DELAY.as_millis() as i32;

/// Default size of the board preview SVG (px).
pub const BOARD_WIDTH_PX: u32 = 600;
pub const BOARD_HEIGHT_PX: u32 = 800;
