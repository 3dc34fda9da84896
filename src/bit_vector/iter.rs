use std::{iter::FusedIterator, ops::Range};

use crate::block::{BLOCK_BITS, Block, BlockExt, BlockPositions};

use super::BitVector;

/// Iterator over the populated span of a [`BitVector`]'s blocks, yielding
/// `(block index, block)` pairs.
#[must_use]
#[derive(Clone)]
pub struct Blocks<'a> {
    blocks: &'a [Block],
    range: Range<usize>,
}

impl<'a> Blocks<'a> {
    pub(super) fn new(bv: &'a BitVector) -> Self {
        Self {
            blocks: bv.as_raw_slice(),
            range: bv.populated_range(),
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = (usize, Block);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some((index, self.blocks[index]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Blocks<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some((index, self.blocks[index]))
    }
}

impl ExactSizeIterator for Blocks<'_> {}
impl FusedIterator for Blocks<'_> {}

/// Ascending iterator over the indices of the set bits in a [`BitVector`].
#[must_use]
#[derive(Clone)]
pub struct Ones<'a> {
    blocks: Blocks<'a>,
    current: Option<BlockPositions<Block>>,
}

impl<'a> Ones<'a> {
    pub(super) fn new(blocks: Blocks<'a>) -> Self {
        Self { blocks, current: None }
    }
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(position) = self.current.as_mut().and_then(|positions| positions.next()) {
                return Some(position);
            }
            let (index, block) = self.blocks.next()?;
            self.current = Some(block.positions(index * BLOCK_BITS));
        }
    }
}

impl FusedIterator for Ones<'_> {}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;

    use crate::BitVector;

    #[test]
    fn test_blocks_reverse() {
        let bv = BitVector::from_iter([1, 130, 300]);
        let indices: Vec<_> = bv.blocks().rev().map(|(i, _)| i).collect();
        assert_eq!(indices, [4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_ones_across_blocks() {
        let values = [0, 1, 63, 64, 127, 128, 500, 511];
        let bv = BitVector::from_iter(values);
        assert_equal(bv.ones(), values);
        assert_eq!(BitVector::new(512).ones().next(), None);
    }
}
