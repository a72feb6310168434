//! Irregular jigsaw cutting and the placement state machine behind the
//! restoration game.
//!
//! [`geometry`] cuts the unit square into interlocking pieces once per
//! session; [`session`] tracks where each piece is and reports what every
//! action did. Neither performs I/O.

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod session;
pub mod trivia;

pub use catalog::{ARTWORKS, Artwork, artwork_by_id, default_artwork, proxied_image_url};
pub use error::{GridError, SessionError};
pub use geometry::{Lattice, PieceShape, Point, Rect, Tiling, generate};
pub use grid::{DEFAULT_GRID, Grid};
pub use session::{
    Feedback, Location, MISMATCH_CLEAR_DELAY, Mismatch, Progress, Session, Transition,
    WIN_REVEAL_DELAY,
};
