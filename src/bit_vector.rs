use std::{fmt::Debug, ops::RangeInclusive};

use thiserror::Error;

use crate::block::{BLOCK_BITS, Block, BlockExt, block_and_bit};

mod cmp;
mod intersection;
mod iter;
mod union;

pub use iter::{Blocks, Ones};

/// Returned when a bit index is not below the capacity of a [`BitVector`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("bit index {index} out of range for capacity {capacity}")]
pub struct OutOfRange {
    pub index: usize,
    pub capacity: usize,
}

/// A fixed-capacity, block-addressable bit vector which tracks the positions
/// of its lowest and highest set bits.
///
/// Capacity is always a whole number of 64-bit blocks and never changes after
/// construction. Setting a bit updates the tracked bounds in O(1); clearing
/// the bit at either bound rescans the blocks to find the new bound.
///
/// ```
/// use trajpack::BitVector;
///
/// let mut bv = BitVector::new(100);
/// assert_eq!(bv.capacity(), 128);
///
/// bv.set_bit(7).unwrap();
/// bv.set_bit(90).unwrap();
/// assert_eq!(bv.lowest(), Some(7));
/// assert_eq!(bv.highest(), Some(90));
///
/// bv.clear_bit(90).unwrap();
/// assert_eq!(bv.highest(), Some(7));
/// assert!(bv.set_bit(128).is_err());
/// ```
#[derive(Clone, Default)]
pub struct BitVector {
    blocks: Box<[Block]>,
    lowest: usize,
    highest: usize,
    any_set: bool,
}

impl BitVector {
    /// Create a zeroed bit vector able to hold at least `size` bits.
    pub fn new(size: usize) -> Self {
        let blocks = vec![0; size.div_ceil(BLOCK_BITS)];
        Self {
            blocks: blocks.into_boxed_slice(),
            lowest: 0,
            highest: 0,
            any_set: false,
        }
    }

    /// Create a bit vector able to hold at least `size` bits, with every bit
    /// (including the padding up to the block boundary) set.
    pub fn filled(size: usize) -> Self {
        let num_blocks = size.div_ceil(BLOCK_BITS);
        let blocks = vec![Block::full(); num_blocks];
        Self {
            blocks: blocks.into_boxed_slice(),
            lowest: 0,
            highest: (num_blocks * BLOCK_BITS).saturating_sub(1),
            any_set: num_blocks > 0,
        }
    }

    /// Adopt raw blocks, recomputing the tracked bounds by scanning them.
    pub fn from_blocks(blocks: impl Into<Box<[Block]>>) -> Self {
        let mut bv = Self {
            blocks: blocks.into(),
            lowest: 0,
            highest: 0,
            any_set: false,
        };
        bv.rescan();
        bv
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.len() * BLOCK_BITS
    }

    /// Returns true if at least one bit is set.
    #[inline]
    pub fn any_set(&self) -> bool {
        self.any_set
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.any_set
    }

    /// Index of the lowest set bit.
    #[inline]
    pub fn lowest(&self) -> Option<usize> {
        self.any_set.then_some(self.lowest)
    }

    /// Index of the highest set bit.
    #[inline]
    pub fn highest(&self) -> Option<usize> {
        self.any_set.then_some(self.highest)
    }

    /// The inclusive range spanning the lowest and highest set bits.
    #[inline]
    pub fn bounds(&self) -> Option<RangeInclusive<usize>> {
        self.any_set.then(|| self.lowest..=self.highest)
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.blocks().map(|(_, block)| block.cardinality()).sum()
    }

    /// The raw block storage, including blocks outside the tracked bounds.
    #[inline]
    pub fn as_raw_slice(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    fn check_range(&self, index: usize) -> Result<(), OutOfRange> {
        let capacity = self.capacity();
        if index >= capacity {
            Err(OutOfRange { index, capacity })
        } else {
            Ok(())
        }
    }

    pub fn set_bit(&mut self, index: usize) -> Result<(), OutOfRange> {
        self.check_range(index)?;

        if !self.any_set {
            self.lowest = index;
            self.highest = index;
            self.any_set = true;
        } else if index < self.lowest {
            self.lowest = index;
        } else if index > self.highest {
            self.highest = index;
        }

        let (block, bit) = block_and_bit(index);
        self.blocks[block].insert(bit);
        Ok(())
    }

    pub fn get_bit(&self, index: usize) -> Result<bool, OutOfRange> {
        self.check_range(index)?;
        let (block, bit) = block_and_bit(index);
        Ok(self.blocks[block].contains(bit))
    }

    pub fn clear_bit(&mut self, index: usize) -> Result<(), OutOfRange> {
        self.check_range(index)?;
        if !self.any_set {
            return Ok(());
        }

        let (block, bit) = block_and_bit(index);
        self.blocks[block].remove(bit);

        if index == self.lowest && index == self.highest {
            // the only set bit was removed
            self.any_set = false;
            self.lowest = 0;
            self.highest = 0;
        } else if index == self.lowest {
            self.rescan_lowest();
        } else if index == self.highest {
            self.rescan_highest();
        }
        Ok(())
    }

    /// Zero every block. Capacity is unchanged.
    pub fn reset(&mut self) {
        self.blocks.fill(0);
        self.lowest = 0;
        self.highest = 0;
        self.any_set = false;
    }

    /// Flip every bit, including the padding up to the block boundary.
    pub fn complement(&mut self) {
        for block in self.blocks.iter_mut() {
            *block = !*block;
        }
        self.rescan();
    }

    /// Returns true if `other` fits within this vector's capacity and shares
    /// at least one set bit with it. A longer `other` never intersects.
    pub fn intersects(&self, other: &BitVector) -> bool {
        if other.capacity() > self.capacity() {
            return false;
        }
        other
            .blocks()
            .any(|(i, block)| self.blocks[i].intersects(block))
    }

    /// Iterate `(block index, block)` pairs from the block holding the lowest
    /// set bit through the block holding the highest set bit.
    #[inline]
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(self)
    }

    /// Iterate the indices of all set bits in ascending order.
    #[inline]
    pub fn ones(&self) -> Ones<'_> {
        Ones::new(self.blocks())
    }

    /// Collect the indices of all set bits in ascending order.
    pub fn to_nums(&self) -> Vec<usize> {
        self.ones().collect()
    }

    fn rescan(&mut self) {
        self.rescan_lowest();
        if self.any_set {
            self.rescan_highest();
        }
    }

    fn rescan_lowest(&mut self) {
        let found = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(i, block)| block.lowest().map(|bit| i * BLOCK_BITS + bit));
        self.apply_scan(found, |bv, index| bv.lowest = index);
    }

    fn rescan_highest(&mut self) {
        let found = self
            .blocks
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, block)| block.highest().map(|bit| i * BLOCK_BITS + bit));
        self.apply_scan(found, |bv, index| bv.highest = index);
    }

    #[inline]
    fn apply_scan(&mut self, found: Option<usize>, update: impl FnOnce(&mut Self, usize)) {
        match found {
            Some(index) => {
                self.any_set = true;
                update(self, index);
            }
            None => {
                self.any_set = false;
                self.lowest = 0;
                self.highest = 0;
            }
        }
    }

    /// Block index range covered by [`Self::blocks`].
    #[inline]
    pub(crate) fn populated_range(&self) -> std::ops::Range<usize> {
        if self.any_set {
            (self.lowest / BLOCK_BITS)..(self.highest / BLOCK_BITS + 1)
        } else {
            0..0
        }
    }

    #[inline]
    pub(crate) fn raw_block(&self, index: usize) -> Block {
        self.blocks[index]
    }
}

impl Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("capacity", &self.capacity())
            .field("bounds", &self.bounds())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

impl FromIterator<usize> for BitVector {
    /// Build the smallest bit vector holding every index produced by `iter`.
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let indices: Vec<usize> = iter.into_iter().collect();
        let size = indices.iter().max().map_or(0, |&max| max + 1);
        let mut bv = BitVector::new(size);
        for index in indices {
            let (block, bit) = block_and_bit(index);
            bv.blocks[block].insert(bit);
        }
        bv.rescan();
        bv
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bitvec::{order::Lsb0, vec::BitVec};
    use itertools::assert_equal;
    use proptest::{collection::vec, prelude::*, proptest};

    use super::*;
    use crate::testutil::{BitOp, check_bounds};

    #[test]
    fn test_sanity() {
        let mut bv = BitVector::new(130);
        assert_eq!(bv.capacity(), 192);
        assert!(bv.is_empty());
        assert_eq!(bv.bounds(), None);

        bv.set_bit(64).unwrap();
        assert_eq!(bv.bounds(), Some(64..=64));
        bv.set_bit(3).unwrap();
        bv.set_bit(191).unwrap();
        assert_eq!(bv.bounds(), Some(3..=191));
        assert!(bv.get_bit(64).unwrap());
        assert!(!bv.get_bit(65).unwrap());
        assert_eq!(bv.cardinality(), 3);
        assert_eq!(bv.to_nums(), [3, 64, 191]);

        bv.clear_bit(3).unwrap();
        assert_eq!(bv.bounds(), Some(64..=191));
        bv.clear_bit(191).unwrap();
        assert_eq!(bv.bounds(), Some(64..=64));
        bv.clear_bit(64).unwrap();
        assert_eq!(bv.bounds(), None);
        check_bounds(&bv);
    }

    #[test]
    fn test_capacity_rounding() {
        assert_eq!(BitVector::new(0).capacity(), 0);
        assert_eq!(BitVector::new(1).capacity(), 64);
        assert_eq!(BitVector::new(64).capacity(), 64);
        assert_eq!(BitVector::new(65).capacity(), 128);
        assert_eq!(BitVector::default().capacity(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let mut bv = BitVector::new(10);
        assert_matches!(
            bv.set_bit(64),
            Err(OutOfRange { index: 64, capacity: 64 })
        );
        assert_matches!(bv.get_bit(100), Err(OutOfRange { index: 100, .. }));
        assert_matches!(bv.clear_bit(64), Err(OutOfRange { .. }));
        // indices between the requested size and the capacity are valid
        assert_matches!(bv.set_bit(63), Ok(()));

        let mut empty = BitVector::default();
        assert_matches!(empty.set_bit(0), Err(OutOfRange { index: 0, capacity: 0 }));
        assert_matches!(empty.get_bit(0), Err(_));
    }

    #[test]
    fn test_filled() {
        let bv = BitVector::filled(70);
        assert_eq!(bv.capacity(), 128);
        assert_eq!(bv.bounds(), Some(0..=127));
        assert_eq!(bv.cardinality(), 128);
        assert!(bv.get_bit(127).unwrap());
        check_bounds(&bv);

        let empty = BitVector::filled(0);
        assert!(empty.is_empty());
        assert_eq!(empty, BitVector::default());
    }

    #[test]
    fn test_clear_unset_bit_keeps_bounds() {
        let mut bv = BitVector::from_iter([10, 20]);
        bv.clear_bit(15).unwrap();
        assert_eq!(bv.bounds(), Some(10..=20));

        let mut empty = BitVector::new(64);
        empty.clear_bit(5).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut bv = BitVector::filled(200);
        bv.reset();
        assert!(bv.is_empty());
        assert_eq!(bv.capacity(), 256);
        assert_eq!(bv, BitVector::new(256));
        bv.reset();
        assert_eq!(bv, BitVector::new(256));
        assert_eq!(bv.as_raw_slice(), &[0; 4]);
    }

    #[test]
    fn test_complement() {
        let mut bv = BitVector::from_iter([0, 5, 63]);
        bv.complement();
        assert_eq!(bv.cardinality(), 61);
        assert_eq!(bv.bounds(), Some(1..=62));
        check_bounds(&bv);

        let mut full = BitVector::filled(64);
        full.complement();
        assert!(full.is_empty());
    }

    #[test]
    fn test_blocks_skip_empty_edges() {
        let mut bv = BitVector::new(64 * 8);
        assert!(bv.blocks().next().is_none());

        bv.set_bit(64 * 2 + 1).unwrap();
        bv.set_bit(64 * 5).unwrap();
        let blocks: Vec<_> = bv.blocks().collect();
        assert_eq!(blocks, [(2, 0b10), (3, 0), (4, 0), (5, 1)]);

        // every call starts over
        assert_eq!(bv.blocks().count(), 4);
        assert_eq!(bv.blocks().len(), 4);
    }

    #[test]
    fn test_intersects() {
        let big = BitVector::from_iter([3, 70, 200]);
        let small = BitVector::from_iter([70]);
        assert!(big.intersects(&small));

        // a longer vector never intersects, even when bits overlap
        assert!(!small.intersects(&big));

        let disjoint = BitVector::from_iter([4, 71]);
        assert!(!big.intersects(&disjoint));
        assert!(!big.intersects(&BitVector::default()));
    }

    #[test]
    fn test_from_blocks() {
        let bv = BitVector::from_blocks(vec![0, 0b100, 0, 1 << 63]);
        assert_eq!(bv.capacity(), 256);
        assert_eq!(bv.bounds(), Some(66..=255));
        assert_equal(bv.ones(), [66, 255]);

        let empty = BitVector::from_blocks(vec![0, 0]);
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 128);
    }

    proptest! {
        #[test]
        fn test_bit_accessors_proptest(size in 1usize..1024, index in 0usize..2048) {
            let mut bv = BitVector::new(size);
            if index < bv.capacity() {
                bv.set_bit(index).unwrap();
                prop_assert!(bv.get_bit(index).unwrap());
                bv.clear_bit(index).unwrap();
                prop_assert!(!bv.get_bit(index).unwrap());
            } else {
                prop_assert!(bv.set_bit(index).is_err());
                prop_assert!(bv.get_bit(index).is_err());
                prop_assert!(bv.clear_bit(index).is_err());
            }
        }

        #[test]
        fn test_bounds_track_model_proptest(
            ops in vec(any::<BitOp>(), 0..256)
        ) {
            let size = 300;
            let mut bv = BitVector::new(size);
            let mut model: BitVec<u64, Lsb0> = BitVec::repeat(false, bv.capacity());

            for op in ops {
                match op {
                    BitOp::Set(i) => {
                        let i = i % size;
                        bv.set_bit(i).unwrap();
                        model.set(i, true);
                    }
                    BitOp::Clear(i) => {
                        let i = i % size;
                        bv.clear_bit(i).unwrap();
                        model.set(i, false);
                    }
                    BitOp::Reset => {
                        bv.reset();
                        model.fill(false);
                    }
                }
                check_bounds(&bv);
                prop_assert_eq!(bv.lowest(), model.first_one());
                prop_assert_eq!(bv.highest(), model.last_one());
            }

            assert_equal(bv.ones(), model.iter_ones());
            prop_assert_eq!(bv.as_raw_slice(), model.as_raw_slice());
        }

        #[test]
        fn test_from_iter_proptest(indices in vec(0usize..4096, 0..256)) {
            let bv = BitVector::from_iter(indices.iter().copied());
            check_bounds(&bv);
            let mut expected = indices.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(bv.to_nums(), expected);
        }
    }
}
