//! Block-level change gutter between two document versions

use similar::{Algorithm, DiffOp};
use std::ops::Range;

use crate::model::Document;
use crate::serialize::serialize_block;

/// Change mark for a single block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMark {
    None,
    Added,
    Modified,
    /// This many blocks were removed right after this one
    DeletedAfter(usize),
}

/// Marks aligned to the blocks of the newer document
#[derive(Clone, Debug)]
pub struct BlockGutter {
    pub marks: Vec<BlockMark>,
}

impl BlockGutter {
    pub fn empty(block_count: usize) -> Self {
        Self {
            marks: vec![BlockMark::None; block_count],
        }
    }

    /// Get the mark for a given block (0-indexed)
    pub fn get(&self, block: usize) -> BlockMark {
        self.marks.get(block).copied().unwrap_or(BlockMark::None)
    }

    pub fn is_unchanged(&self) -> bool {
        self.marks.iter().all(|m| *m == BlockMark::None)
    }
}

/// Compare two documents block by block. Blocks are equal when their
/// serialized HTML is equal, so formatting and alignment changes count.
///
/// A run of removed blocks replaced in place by new ones is a rewrite: the
/// overlapping blocks are `Modified`, any surplus new blocks `Added`, and any
/// surplus removals are reported on the last rewritten block.
pub fn block_gutter(before: &Document, after: &Document) -> BlockGutter {
    let old: Vec<String> = before.blocks().iter().map(serialize_block).collect();
    let new: Vec<String> = after.blocks().iter().map(serialize_block).collect();

    let mut gutter = BlockGutter::empty(new.len());
    let mut ops = similar::capture_diff_slices(Algorithm::Myers, old.as_slice(), new.as_slice())
        .into_iter()
        .peekable();

    while let Some(op) = ops.next() {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Replace {
                new_index,
                old_len,
                new_len,
                ..
            } => gutter.rewrite(new_index, old_len, new_len),
            DiffOp::Delete {
                new_index, old_len, ..
            } => match ops.peek() {
                Some(&DiffOp::Insert {
                    new_index: at,
                    new_len,
                    ..
                }) if at == new_index => {
                    ops.next();
                    gutter.rewrite(new_index, old_len, new_len);
                }
                _ => gutter.deleted_before(new_index, old_len),
            },
            DiffOp::Insert {
                new_index, new_len, ..
            } => match ops.peek() {
                Some(&DiffOp::Delete {
                    new_index: at,
                    old_len,
                    ..
                }) if at == new_index + new_len => {
                    ops.next();
                    gutter.rewrite(new_index, old_len, new_len);
                }
                _ => gutter.set(new_index..new_index + new_len, BlockMark::Added),
            },
        }
    }

    gutter
}

impl BlockGutter {
    fn set(&mut self, range: Range<usize>, mark: BlockMark) {
        let end = range.end.min(self.marks.len());
        let start = range.start.min(end);
        for slot in &mut self.marks[start..end] {
            *slot = mark;
        }
    }

    fn rewrite(&mut self, at: usize, old_len: usize, new_len: usize) {
        let common = old_len.min(new_len);
        self.set(at..at + common, BlockMark::Modified);
        self.set(at + common..at + new_len, BlockMark::Added);
        if old_len > new_len {
            self.deleted_before(at + new_len, old_len - new_len);
        }
    }

    /// Record `count` removed blocks sitting before new block `index`. They
    /// attach to the preceding block, or to the first one at the start.
    fn deleted_before(&mut self, index: usize, count: usize) {
        if let Some(slot) = self.marks.get_mut(index.saturating_sub(1)) {
            *slot = match *slot {
                BlockMark::None => BlockMark::DeletedAfter(count),
                BlockMark::DeletedAfter(n) => BlockMark::DeletedAfter(n + count),
                changed => changed,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_str;

    fn gutter(before: &str, after: &str) -> BlockGutter {
        block_gutter(&parse_str(before), &parse_str(after))
    }

    #[test]
    fn test_identical_documents() {
        let g = gutter("<p>a</p><p>b</p>", "<p>a</p><p>b</p>");
        assert_eq!(g.marks.len(), 2);
        assert!(g.is_unchanged());
    }

    #[test]
    fn test_added_block() {
        let g = gutter("<p>a</p><p>b</p>", "<p>a</p><p>b</p><p>c</p>");
        assert_eq!(g.marks, vec![BlockMark::None, BlockMark::None, BlockMark::Added]);
    }

    #[test]
    fn test_deleted_blocks() {
        let g = gutter("<p>a</p><p>b</p><p>c</p><p>d</p>", "<p>a</p><p>d</p>");
        assert_eq!(g.marks, vec![BlockMark::DeletedAfter(2), BlockMark::None]);
    }

    #[test]
    fn test_formatting_change_is_modified() {
        let g = gutter("<p>a</p><p>b</p><p>c</p>", "<p>a</p><p><b>b</b></p><p>c</p>");
        assert_eq!(g.get(0), BlockMark::None);
        assert_eq!(g.get(1), BlockMark::Modified);
        assert_eq!(g.get(2), BlockMark::None);
    }

    #[test]
    fn test_kind_change_is_modified() {
        let g = gutter("<p>x</p><p>title</p>", "<p>x</p><h1>title</h1>");
        assert_eq!(g.get(1), BlockMark::Modified);
    }

    #[test]
    fn test_uneven_rewrite() {
        let g = gutter("<p>a</p><p>b</p><p>z</p>", "<p>a</p><p>x</p><p>y</p><p>z</p>");
        assert_eq!(
            g.marks,
            vec![BlockMark::None, BlockMark::Modified, BlockMark::Added, BlockMark::None]
        );

        let g = gutter("<p>a</p><p>b</p><p>c</p><p>z</p>", "<p>a</p><p>x</p><p>z</p>");
        assert_eq!(g.marks, vec![BlockMark::None, BlockMark::Modified, BlockMark::None]);
    }

    #[test]
    fn test_deleted_at_start() {
        let g = gutter("<p>a</p><p>b</p>", "<p>b</p>");
        assert_eq!(g.marks, vec![BlockMark::DeletedAfter(1)]);
    }

    #[test]
    fn test_empty_gutter() {
        let g = BlockGutter::empty(3);
        assert_eq!(g.marks.len(), 3);
        assert_eq!(g.get(7), BlockMark::None);
    }
}
