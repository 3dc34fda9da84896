use std::ops::{BitAnd, BitAndAssign};

use super::BitVector;

impl BitVector {
    /// Bits set in both vectors. The result spans the smaller of the two
    /// capacities.
    pub fn intersection(&self, rhs: &Self) -> BitVector {
        let blocks: Vec<_> = self
            .as_raw_slice()
            .iter()
            .zip(rhs.as_raw_slice())
            .map(|(l, r)| l & r)
            .collect();
        BitVector::from_blocks(blocks)
    }
}

impl BitAnd<&BitVector> for &BitVector {
    type Output = BitVector;

    #[inline]
    fn bitand(self, rhs: &BitVector) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign<&BitVector> for BitVector {
    fn bitand_assign(&mut self, rhs: &BitVector) {
        *self = self.intersection(rhs);
    }
}
