//! Placement state machine of one puzzle session.
//!
//! A piece is either in the tray or placed in its own slot; placement into any
//! other slot is refused with a transient mismatch marker. Every operation
//! returns a [`Transition`] describing what changed, and the presentation
//! layer turns that into cues via [`Transition::feedback`].

use std::fmt;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::geometry::{PieceShape, Tiling};
use crate::grid::Grid;

/// How long a mismatch marker stays up before the presentation clears it.
pub const MISMATCH_CLEAR_DELAY: Duration = Duration::from_millis(500);
/// Pause between the final placement and revealing the win.
pub const WIN_REVEAL_DELAY: Duration = Duration::from_millis(100);
/// Tray pieces are tilted by up to this many degrees either way.
pub const TRAY_TILT_MAX_DEG: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Tray,
    Placed(usize),
}

/// Presentation cue raised by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Pick,
    Success,
    Error,
    Win,
}

/// A refused placement. `token` grows with every mismatch so a delayed clear
/// can tell whether the marker it was scheduled for is still the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub slot: usize,
    pub token: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Ignored,
    Selected { id: usize },
    Deselected { id: usize },
    /// A placed piece went back to the tray and is now selected.
    Retrieved { id: usize, slot: usize },
    Mismatch { id: usize, mismatch: Mismatch },
    Placed { id: usize, slot: usize },
    /// The last piece was placed.
    Won { id: usize, slot: usize },
}

impl Transition {
    pub fn feedback(&self) -> &'static [Feedback] {
        match self {
            Transition::Ignored | Transition::Deselected { .. } => &[],
            Transition::Selected { .. } | Transition::Retrieved { .. } => &[Feedback::Pick],
            Transition::Mismatch { .. } => &[Feedback::Error],
            Transition::Placed { .. } => &[Feedback::Success],
            Transition::Won { .. } => &[Feedback::Success, Feedback::Win],
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub placed: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.placed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.placed, self.total)
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    tiling: Tiling,
    locations: Vec<Location>,
    // occupant of each slot
    slots: Vec<Option<usize>>,
    tray_order: Vec<usize>,
    tray_tilt: Vec<f64>,
    selected: Option<usize>,
    mismatch: Option<Mismatch>,
    next_token: u64,
    placed: usize,
    moves: u32,
    won: bool,
}

impl Session {
    /// Cut a fresh tiling for `grid` and shuffle the tray once.
    pub fn new<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        let tiling = Tiling::generate(grid, rng);
        let mut order: Vec<usize> = (0..tiling.len()).collect();
        order.shuffle(rng);
        let tilt = (0..tiling.len())
            .map(|_| rng.random_range(-TRAY_TILT_MAX_DEG..=TRAY_TILT_MAX_DEG))
            .collect();
        Self::build(tiling, order, tilt)
    }

    /// Session over existing geometry with an explicit tray order and no tilt.
    pub fn with_tray_order(tiling: Tiling, order: Vec<usize>) -> Result<Self, SessionError> {
        let total = tiling.len();
        if total == 0 {
            return Err(SessionError::NoPieces);
        }
        if let Some((index, piece)) = tiling
            .pieces()
            .iter()
            .enumerate()
            .find(|(i, p)| p.id != *i || p.correct_slot != *i)
        {
            return Err(SessionError::PieceOutOfOrder {
                index,
                id: piece.id,
            });
        }
        if order.len() != total {
            return Err(SessionError::TrayLength {
                expected: total,
                got: order.len(),
            });
        }
        let mut seen = vec![false; total];
        for &id in &order {
            if id >= total || seen[id] {
                return Err(SessionError::TrayNotPermutation(id));
            }
            seen[id] = true;
        }
        Ok(Self::build(tiling, order, vec![0.0; total]))
    }

    fn build(tiling: Tiling, tray_order: Vec<usize>, tray_tilt: Vec<f64>) -> Self {
        let total = tiling.len();
        debug!(pieces = total, "session started");
        Self {
            tiling,
            locations: vec![Location::Tray; total],
            slots: vec![None; total],
            tray_order,
            tray_tilt,
            selected: None,
            mismatch: None,
            next_token: 1,
            placed: 0,
            moves: 0,
            won: false,
        }
    }

    /// Select a tray piece, toggle the current selection off, or take a placed
    /// piece back into the tray and select it.
    pub fn select_piece(&mut self, id: usize) -> Transition {
        if self.won || id >= self.locations.len() {
            return Transition::Ignored;
        }
        let transition = match self.locations[id] {
            Location::Placed(slot) => {
                self.locations[id] = Location::Tray;
                self.slots[slot] = None;
                self.placed -= 1;
                self.selected = Some(id);
                Transition::Retrieved { id, slot }
            }
            Location::Tray if self.selected == Some(id) => {
                self.selected = None;
                Transition::Deselected { id }
            }
            Location::Tray => {
                self.selected = Some(id);
                Transition::Selected { id }
            }
        };
        debug!(?transition, "select");
        transition
    }

    /// Try to drop the selected piece into `slot`.
    pub fn attempt_place(&mut self, slot: usize) -> Transition {
        let Some(id) = self.selected else {
            return Transition::Ignored;
        };
        if self.won || slot >= self.slots.len() || self.slots[slot].is_some() {
            return Transition::Ignored;
        }
        self.moves += 1;
        let transition = if self.tiling.pieces()[id].correct_slot != slot {
            let mismatch = Mismatch {
                slot,
                token: self.next_token,
            };
            self.next_token += 1;
            self.mismatch = Some(mismatch);
            Transition::Mismatch { id, mismatch }
        } else {
            self.locations[id] = Location::Placed(slot);
            self.slots[slot] = Some(id);
            self.placed += 1;
            self.selected = None;
            self.mismatch = None;
            if self.placed == self.slots.len() {
                self.won = true;
                Transition::Won { id, slot }
            } else {
                Transition::Placed { id, slot }
            }
        };
        debug!(?transition, moves = self.moves, "place");
        transition
    }

    /// Clear the mismatch marker if it is still the one `token` was issued for.
    pub fn clear_mismatch(&mut self, token: u64) -> bool {
        match self.mismatch {
            Some(m) if m.token == token => {
                self.mismatch = None;
                true
            }
            _ => false,
        }
    }

    /// Tray pieces in the session's fixed shuffled order.
    pub fn tray(&self) -> impl Iterator<Item = &PieceShape> + '_ {
        self.tray_ids().map(|id| &self.tiling.pieces()[id])
    }

    pub fn tray_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.tray_order
            .iter()
            .copied()
            .filter(|&id| self.locations[id] == Location::Tray)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            placed: self.placed,
            total: self.slots.len(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.tiling.grid()
    }

    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }

    pub fn pieces(&self) -> &[PieceShape] {
        self.tiling.pieces()
    }

    pub fn piece(&self, id: usize) -> Option<&PieceShape> {
        self.tiling.get(id)
    }

    pub fn location(&self, id: usize) -> Option<Location> {
        self.locations.get(id).copied()
    }

    /// Piece sitting in `slot`, if any.
    pub fn occupant(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn mismatch(&self) -> Option<Mismatch> {
        self.mismatch
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn tray_tilt(&self, id: usize) -> Option<f64> {
        self.tray_tilt.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_follow_transitions() {
        assert!(Transition::Ignored.feedback().is_empty());
        assert!(Transition::Deselected { id: 1 }.feedback().is_empty());
        assert_eq!(Transition::Selected { id: 1 }.feedback(), &[Feedback::Pick]);
        assert_eq!(
            Transition::Retrieved { id: 1, slot: 1 }.feedback(),
            &[Feedback::Pick]
        );
        let mismatch = Mismatch { slot: 3, token: 1 };
        assert_eq!(
            Transition::Mismatch { id: 1, mismatch }.feedback(),
            &[Feedback::Error]
        );
        assert_eq!(
            Transition::Won { id: 0, slot: 0 }.feedback(),
            &[Feedback::Success, Feedback::Win]
        );
    }

    #[test]
    fn progress_formats_as_fraction() {
        let p = Progress { placed: 5, total: 12 };
        assert_eq!(p.to_string(), "5 / 12");
        assert!(!p.is_complete());
    }
}
