use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Largest row or column count accepted by [`Grid::new`].
pub const MAX_GRID_DIM: u32 = 64;

/// Fixed rows x columns layout of a session. Piece ids run row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    rows: u32,
    cols: u32,
}

/// The board used by the restoration game: 4 rows of 3 columns.
pub const DEFAULT_GRID: Grid = Grid { rows: 4, cols: 3 };

impl Grid {
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty { rows, cols });
        }
        if rows > MAX_GRID_DIM || cols > MAX_GRID_DIM {
            return Err(GridError::TooLarge {
                rows,
                cols,
                max: MAX_GRID_DIM,
            });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    pub fn piece_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn id_of(&self, row: usize, col: usize) -> usize {
        row * self.cols() + col
    }

    /// Row and column of a piece id, or `None` when the id is off the board.
    pub fn cell_of(&self, id: usize) -> Option<(usize, usize)> {
        if id >= self.piece_count() {
            return None;
        }
        Some((id / self.cols(), id % self.cols()))
    }

    pub fn contains(&self, id: usize) -> bool {
        id < self.piece_count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        DEFAULT_GRID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_twelve_pieces() {
        assert_eq!(DEFAULT_GRID.piece_count(), 12);
        assert_eq!(Grid::default(), Grid::new(4, 3).unwrap());
    }

    #[test]
    fn ids_are_row_major() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.id_of(1, 2), 5);
        assert_eq!(grid.cell_of(5), Some((1, 2)));
        assert_eq!(grid.cell_of(11), Some((3, 2)));
        assert_eq!(grid.cell_of(12), None);
        assert!(!grid.contains(12));
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(matches!(Grid::new(0, 3), Err(GridError::Empty { .. })));
        assert!(matches!(Grid::new(3, 0), Err(GridError::Empty { .. })));
        assert!(matches!(
            Grid::new(MAX_GRID_DIM + 1, 2),
            Err(GridError::TooLarge { .. })
        ));
        assert!(Grid::new(1, 1).is_ok());
    }
}
