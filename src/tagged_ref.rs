use std::{fmt::Debug, ops::Deref};

use bytes::{BufMut, Bytes};
use itertools::{EitherOrBoth, Itertools};
use zerocopy::{FromBytes, LittleEndian, U64};

use crate::{
    LengthTaggedBitVector,
    block::{BLOCK_BITS, Block},
    codec::{FrameErr, ToFrame, Trailer},
    tagged::BitSource,
};

/// A validated, zero-copy view over the frame of a [`LengthTaggedBitVector`].
///
/// `from_bytes` opens the trailer once; all reads after that index straight
/// into the wrapped buffer.
#[derive(Clone)]
pub struct LengthTaggedRef<B> {
    data: B,
    length: usize,
}

impl<B: Deref<Target = [u8]>> Debug for LengthTaggedRef<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LengthTaggedRef")
            .field("length", &self.length)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<B> LengthTaggedRef<B> {
    #[inline]
    pub fn inner(&self) -> &B {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> B {
        self.data
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
}

impl LengthTaggedRef<Bytes> {
    /// The wrapped frame, without copying.
    #[inline]
    pub fn to_frame(&self) -> Bytes {
        self.data.clone()
    }
}

// An opened frame is already sealed, so it is written back verbatim.
impl<B: Deref<Target = [u8]>> ToFrame for LengthTaggedRef<B> {
    #[inline]
    fn frame_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn write_frame<T: BufMut>(&self, out: &mut T) {
        out.put_slice(&self.data);
    }
}

impl<B: Deref<Target = [u8]>> LengthTaggedRef<B> {
    pub fn from_bytes(data: B) -> Result<Self, FrameErr> {
        let (_, length) = Trailer::open(&data)?;
        Ok(Self { data, length })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw_blocks().len() * BLOCK_BITS
    }

    /// Copy the view into an owned [`LengthTaggedBitVector`].
    pub fn decode_to_owned(&self) -> LengthTaggedBitVector {
        let blocks = self.raw_blocks().iter().map(|b| b.get()).collect();
        LengthTaggedBitVector::from_raw(blocks, self.length)
    }

    fn raw_blocks(&self) -> &[U64<LittleEndian>] {
        let end = self.data.len() - Trailer::SIZE;
        <[U64<LittleEndian>]>::ref_from_bytes(&self.data[..end])
            .expect("block region validated by from_bytes")
    }
}

impl<B: Deref<Target = [u8]>> BitSource for LengthTaggedRef<B> {
    #[inline]
    fn bit_len(&self) -> usize {
        self.length
    }

    #[inline]
    fn block(&self, index: usize) -> Block {
        self.raw_blocks()[index].get()
    }
}

impl<B: Deref<Target = [u8]>> PartialEq<LengthTaggedBitVector> for LengthTaggedRef<B> {
    fn eq(&self, other: &LengthTaggedBitVector) -> bool {
        self.length == other.len()
            && self
                .raw_blocks()
                .iter()
                .zip_longest(other.bit_vector().as_raw_slice())
                .all(|pair| match pair {
                    EitherOrBoth::Both(a, &b) => a.get() == b,
                    EitherOrBoth::Left(a) => a.get() == 0,
                    EitherOrBoth::Right(&b) => b == 0,
                })
    }
}

impl<B: Deref<Target = [u8]>> PartialEq<LengthTaggedRef<B>> for LengthTaggedBitVector {
    #[inline]
    fn eq(&self, other: &LengthTaggedRef<B>) -> bool {
        other == self
    }
}
