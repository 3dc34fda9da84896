use std::fmt::Debug;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    BitVector,
    bit_vector::OutOfRange,
    block::{BLOCK_BITS, Block, BlockExt, block_and_bit},
    codec::{FrameErr, FrameWriter, ToFrame, Trailer},
};

/// Read access to a run of meaningful bits stored in 64-bit blocks.
///
/// Implemented by the owned [`LengthTaggedBitVector`] and by the zero-copy
/// [`crate::LengthTaggedRef`], so the Elias decoder works over either.
pub trait BitSource {
    /// Number of meaningful bits.
    fn bit_len(&self) -> usize;

    /// The raw block at `index`. `index` must address a block which holds at
    /// least one meaningful bit.
    fn block(&self, index: usize) -> Block;

    /// Returns the bit at `index`, or `None` if `index` is not below
    /// [`Self::bit_len`].
    #[inline]
    fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len() {
            return None;
        }
        let (block, bit) = block_and_bit(index);
        Some(self.block(block).contains(bit))
    }
}

/// A [`BitVector`] paired with the exact number of meaningful bits written to it.
///
/// Capacity is rounded up to whole blocks and may hold trailing padding; the
/// tagged length is always `<= capacity` and is the only authority on where
/// the payload ends.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedBits", into = "PersistedBits")]
pub struct LengthTaggedBitVector {
    length: usize,
    bits: BitVector,
}

impl LengthTaggedBitVector {
    /// A zeroed vector tagged with `length` meaningful bits.
    pub fn new(length: usize) -> Self {
        Self { length, bits: BitVector::new(length) }
    }

    /// Tag an existing bit vector, failing if `length` exceeds its capacity.
    pub fn from_parts(bits: BitVector, length: usize) -> Result<Self, FrameErr> {
        if length > bits.capacity() {
            return Err(FrameErr::LengthOverflow {
                length: length as u64,
                capacity: bits.capacity(),
            });
        }
        Ok(Self { length, bits })
    }

    /// Adopt raw blocks written by a bit stream.
    #[inline]
    pub(crate) fn from_raw(blocks: Vec<Block>, length: usize) -> Self {
        debug_assert!(length <= blocks.len() * BLOCK_BITS);
        Self { length, bits: BitVector::from_blocks(blocks) }
    }

    /// Number of meaningful bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    #[inline]
    pub fn bit_vector(&self) -> &BitVector {
        &self.bits
    }

    #[inline]
    pub fn into_bit_vector(self) -> BitVector {
        self.bits
    }

    /// Set a bit inside the tagged length.
    pub fn set_bit(&mut self, index: usize) -> Result<(), OutOfRange> {
        if index >= self.length {
            return Err(OutOfRange { index, capacity: self.length });
        }
        self.bits.set_bit(index)
    }

    /// Iterate the meaningful bits in stream order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(|i| {
            let (block, bit) = block_and_bit(i);
            self.bits.raw_block(block).contains(bit)
        })
    }
}

impl BitSource for LengthTaggedBitVector {
    #[inline]
    fn bit_len(&self) -> usize {
        self.length
    }

    #[inline]
    fn block(&self, index: usize) -> Block {
        self.bits.raw_block(index)
    }
}

impl ToFrame for LengthTaggedBitVector {
    fn frame_len(&self) -> usize {
        size_of_val(self.bits.as_raw_slice()) + Trailer::SIZE
    }

    fn write_frame<B: BufMut>(&self, out: &mut B) {
        let mut writer = FrameWriter::new(out);
        writer.put_blocks(self.bits.as_raw_slice());
        let written = writer.seal(self.length);
        debug_assert_eq!(written, self.frame_len());
    }
}

impl FromIterator<bool> for LengthTaggedBitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut blocks = Vec::new();
        let mut length = 0;
        for bit in iter {
            let (block, position) = block_and_bit(length);
            if block == blocks.len() {
                blocks.push(0);
            }
            if bit {
                blocks[block].insert(position);
            }
            length += 1;
        }
        Self::from_raw(blocks, length)
    }
}

impl Debug for LengthTaggedBitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LengthTaggedBitVector")
            .field("length", &self.length)
            .field("bits", &self.bits)
            .finish()
    }
}

/// Document form of a [`LengthTaggedBitVector`].
///
/// Only `blocks_array` and `length` are authoritative. The bounds hints are
/// recomputed from the blocks on load and may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBits {
    #[serde(rename = "Length")]
    pub length: u64,
    #[serde(rename = "BlocksArray")]
    pub blocks_array: Vec<u64>,
    #[serde(rename = "Lowest", default)]
    pub lowest: u64,
    #[serde(rename = "Highest", default)]
    pub highest: u64,
    #[serde(rename = "Anyset", default)]
    pub any_set: bool,
}

impl From<LengthTaggedBitVector> for PersistedBits {
    fn from(tagged: LengthTaggedBitVector) -> Self {
        let bits = &tagged.bits;
        Self {
            length: tagged.length as u64,
            blocks_array: bits.as_raw_slice().to_vec(),
            lowest: bits.lowest().unwrap_or(0) as u64,
            highest: bits.highest().unwrap_or(0) as u64,
            any_set: bits.any_set(),
        }
    }
}

impl TryFrom<PersistedBits> for LengthTaggedBitVector {
    type Error = FrameErr;

    fn try_from(doc: PersistedBits) -> Result<Self, Self::Error> {
        let bits = BitVector::from_blocks(doc.blocks_array);
        let length = usize::try_from(doc.length).map_err(|_| FrameErr::LengthOverflow {
            length: doc.length,
            capacity: bits.capacity(),
        })?;

        let hints = doc.any_set.then(|| (doc.lowest as usize, doc.highest as usize));
        let actual = bits.bounds().map(|b| (*b.start(), *b.end()));
        if hints != actual {
            tracing::debug!(
                ?hints,
                ?actual,
                "ignoring persisted bounds which disagree with block contents"
            );
        }

        Self::from_parts(bits, length)
    }
}
