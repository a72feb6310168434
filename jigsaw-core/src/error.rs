use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    Empty { rows: u32, cols: u32 },

    #[error("grid {rows}x{cols} exceeds the {max} cell limit per axis")]
    TooLarge { rows: u32, cols: u32, max: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session needs at least one piece")]
    NoPieces,

    #[error("piece at index {index} has id {id}; pieces must be stored in id order")]
    PieceOutOfOrder { index: usize, id: usize },

    #[error("tray order has {got} entries, expected {expected}")]
    TrayLength { expected: usize, got: usize },

    #[error("tray order is not a permutation: id {0} is missing or repeated")]
    TrayNotPermutation(usize),
}
