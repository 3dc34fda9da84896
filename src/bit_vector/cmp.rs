use itertools::Itertools;

use super::BitVector;

// Two bit vectors are equal when they have exactly the same set bits,
// regardless of capacity.
impl PartialEq for BitVector {
    fn eq(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (None, None) => true,
            (Some(a), Some(b)) if a == b => {
                self.blocks().zip_eq(other.blocks()).all(|(l, r)| l == r)
            }
            _ => false,
        }
    }
}

impl Eq for BitVector {}
