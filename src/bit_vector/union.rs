use std::ops::{BitOr, BitOrAssign};

use super::BitVector;

impl BitVector {
    /// Bits set in either vector. The result spans the larger of the two
    /// capacities.
    pub fn union(&self, rhs: &Self) -> BitVector {
        // merge into the longer vector
        let (long, short) = if self.capacity() >= rhs.capacity() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut blocks = long.as_raw_slice().to_vec();
        for (i, block) in short.blocks() {
            blocks[i] |= block;
        }
        BitVector::from_blocks(blocks)
    }
}

impl BitOr<&BitVector> for &BitVector {
    type Output = BitVector;

    #[inline]
    fn bitor(self, rhs: &BitVector) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign<&BitVector> for BitVector {
    fn bitor_assign(&mut self, rhs: &BitVector) {
        *self = self.union(rhs);
    }
}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;

    use crate::BitVector;

    #[test]
    fn test_union() {
        let a = BitVector::from_iter([1, 70]);
        let b = BitVector::from_iter([2, 70, 300]);

        let out = a.union(&b);
        assert_eq!(out.capacity(), b.capacity());
        assert_equal(out.ones(), [1, 2, 70, 300]);
        assert_eq!(out, &b | &a);

        let empty = BitVector::new(1024);
        let out = &a | &empty;
        assert_eq!(out.capacity(), 1024);
        assert_eq!(out, a);
    }

    #[test]
    fn test_union_assign_grows() {
        let mut a = BitVector::from_iter([3]);
        a |= &BitVector::from_iter([500]);
        assert_equal(a.ones(), [3, 500]);
        assert_eq!(a.bounds(), Some(3..=500));
    }
}
