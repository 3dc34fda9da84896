use std::iter::FusedIterator;

use num::{PrimInt, Unsigned};

/// The storage word used by [`crate::BitVector`].
pub type Block = u64;

/// Number of bits held by one [`Block`].
pub const BLOCK_BITS: usize = Block::BITS as usize;

static_assertions::const_assert_eq!(BLOCK_BITS, 64);

/// Split a bit index into its block index and the bit position inside that block.
#[inline]
pub(crate) fn block_and_bit(index: usize) -> (usize, usize) {
    (index / BLOCK_BITS, index % BLOCK_BITS)
}

/// Bit-level helpers over a single fixed-width unsigned word.
///
/// Positions are counted from the least significant bit.
pub trait BlockExt: Copy {
    /// Width of the block in bits.
    const WIDTH: usize;

    /// A block with every bit set.
    fn full() -> Self;

    fn contains(self, position: usize) -> bool;

    /// Set the bit at `position`, returning true if it was previously unset.
    fn insert(&mut self, position: usize) -> bool;

    /// Clear the bit at `position`, returning true if it was previously set.
    fn remove(&mut self, position: usize) -> bool;

    fn has_bits_set(self) -> bool;

    fn cardinality(self) -> usize;

    /// Position of the least significant set bit.
    fn lowest(self) -> Option<usize>;

    /// Position of the most significant set bit.
    fn highest(self) -> Option<usize>;

    /// Returns true if `self` and `other` share at least one set bit.
    fn intersects(self, other: Self) -> bool;

    /// Iterate the positions of all set bits in ascending order, each offset by `base`.
    fn positions(self, base: usize) -> BlockPositions<Self>;
}

impl<T: PrimInt + Unsigned> BlockExt for T {
    const WIDTH: usize = size_of::<T>() * 8;

    #[inline]
    fn full() -> Self {
        T::max_value()
    }

    #[inline]
    fn contains(self, position: usize) -> bool {
        debug_assert!(position < Self::WIDTH);
        self & (T::one() << position) != T::zero()
    }

    #[inline]
    fn insert(&mut self, position: usize) -> bool {
        let was_missing = !self.contains(position);
        *self = *self | (T::one() << position);
        was_missing
    }

    #[inline]
    fn remove(&mut self, position: usize) -> bool {
        let was_present = self.contains(position);
        *self = *self & !(T::one() << position);
        was_present
    }

    #[inline]
    fn has_bits_set(self) -> bool {
        self != T::zero()
    }

    #[inline]
    fn cardinality(self) -> usize {
        self.count_ones() as usize
    }

    #[inline]
    fn lowest(self) -> Option<usize> {
        self.has_bits_set().then(|| self.trailing_zeros() as usize)
    }

    #[inline]
    fn highest(self) -> Option<usize> {
        self.has_bits_set().then(|| Self::WIDTH - 1 - self.leading_zeros() as usize)
    }

    #[inline]
    fn intersects(self, other: Self) -> bool {
        (self & other).has_bits_set()
    }

    #[inline]
    fn positions(self, base: usize) -> BlockPositions<Self> {
        BlockPositions { current: self, base }
    }
}

/// Ascending iterator over the set bits of one block.
#[must_use]
#[derive(Clone)]
pub struct BlockPositions<T> {
    current: T,
    base: usize,
}

impl<T: PrimInt + Unsigned> Iterator for BlockPositions<T> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.current.lowest()?;
        // clear the lowest set bit
        self.current = self.current & (self.current - T::one());
        Some(self.base + position)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.current.cardinality();
        (n, Some(n))
    }
}

impl<T: PrimInt + Unsigned> ExactSizeIterator for BlockPositions<T> {}
impl<T: PrimInt + Unsigned> FusedIterator for BlockPositions<T> {}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;

    use super::*;

    #[test]
    fn test_block_insert_remove() {
        let mut block: Block = 0;
        assert!(block.insert(0));
        assert!(!block.insert(0));
        assert!(block.insert(63));
        assert!(block.contains(0));
        assert!(block.contains(63));
        assert!(!block.contains(1));

        assert!(block.remove(0));
        assert!(!block.remove(0));
        assert_eq!(block, 1 << 63);
    }

    #[test]
    fn test_block_lowest_highest() {
        assert_eq!(0u64.lowest(), None);
        assert_eq!(0u64.highest(), None);

        assert_eq!(1u64.lowest(), Some(0));
        assert_eq!(1u64.highest(), Some(0));

        let block: Block = (1 << 5) | (1 << 40);
        assert_eq!(block.lowest(), Some(5));
        assert_eq!(block.highest(), Some(40));

        assert_eq!(Block::full().lowest(), Some(0));
        assert_eq!(Block::full().highest(), Some(63));

        // narrower blocks use their own width
        assert_eq!(u32::full().highest(), Some(31));
        assert_eq!(0x8000u16.highest(), Some(15));
    }

    #[test]
    fn test_block_intersects() {
        let a: Block = 0b1010;
        assert!(a.intersects(0b0010));
        assert!(!a.intersects(0b0101));
        assert!(!a.intersects(0));
        assert!(Block::full().intersects(1 << 63));
    }

    #[test]
    fn test_block_positions() {
        assert!(0u64.positions(0).next().is_none());
        assert_equal(1u64.positions(0), [0]);
        assert_equal(0b1011u64.positions(128), [128, 129, 131]);
        assert_equal(Block::full().positions(64), 64..128);
        assert_equal(u32::full().positions(0), 0..32);

        let positions = ((1u64 << 63) | 1).positions(0);
        assert_eq!(positions.len(), 2);
        assert_equal(positions, [0, 63]);
    }

    #[test]
    fn test_block_and_bit() {
        assert_eq!(block_and_bit(0), (0, 0));
        assert_eq!(block_and_bit(63), (0, 63));
        assert_eq!(block_and_bit(64), (1, 0));
        assert_eq!(block_and_bit(200), (3, 8));
    }
}
