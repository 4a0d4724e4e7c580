//! Caret coordinates within a document

/// A caret position: block index plus character offset within the block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// Order two positions as (start, end)
    pub fn ordered(a: Position, b: Position) -> (Position, Position) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}
