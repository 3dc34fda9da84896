//! The frame: a self-validating little-endian byte form for tagged bit
//! vectors.
//!
//! ```text
//! [block 0: u64 LE] .. [block n-1: u64 LE] [length: u64 LE] [checksum: u64 LE] [magic: 4 bytes]
//! ```
//!
//! The last twenty bytes are the trailer. A frame opens only if the magic
//! matches, the block region is whole blocks, the checksum holds and the
//! length fits the blocks.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

mod trailer;
mod writer;

pub use trailer::FRAME_MAGIC;
pub(crate) use trailer::Trailer;
pub(crate) use writer::FrameWriter;

/// Types with a frame form.
pub trait ToFrame {
    /// Exact size of the frame in bytes.
    fn frame_len(&self) -> usize;

    fn write_frame<B: BufMut>(&self, out: &mut B);

    fn to_frame(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.frame_len());
        self.write_frame(&mut out);
        out.freeze()
    }
}

/// A frame or persisted document whose layout does not hold together.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameErr {
    #[error("frame of {actual} bytes is shorter than its {needed} byte trailer")]
    Short { needed: usize, actual: usize },

    #[error("block region of {0} bytes is not a whole number of blocks")]
    RaggedBlocks(usize),

    #[error("tagged length {length} exceeds block capacity {capacity}")]
    LengthOverflow { length: u64, capacity: usize },

    #[error("unknown magic value")]
    Magic,

    #[error("checksum mismatch")]
    Checksum,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::{collection::vec, proptest};

    use super::{FRAME_MAGIC, FrameErr, ToFrame, Trailer};
    use crate::{BitVector, LengthTaggedBitVector, LengthTaggedRef, testutil::mktagged_buf};

    /// Rewrite the checksum after tampering with the covered bytes.
    fn reseal(frame: &mut [u8]) {
        let checksum_at = frame.len() - 12;
        let mut digest = crc64fast_nvme::Digest::new();
        digest.write(&frame[..checksum_at]);
        frame[checksum_at..checksum_at + 8].copy_from_slice(&digest.sum64().to_le_bytes());
    }

    #[test]
    fn test_frame_layout() {
        let mut bits = BitVector::new(70);
        bits.set_bit(0).unwrap();
        bits.set_bit(65).unwrap();
        let tagged = LengthTaggedBitVector::from_parts(bits, 66).unwrap();

        let frame = tagged.to_frame();
        assert_eq!(frame.len(), tagged.frame_len());
        assert_eq!(frame.len(), 2 * 8 + Trailer::SIZE);

        #[rustfmt::skip]
        let head: [u8; 24] = [
            0x01, 0, 0, 0, 0, 0, 0, 0, // block 0
            0x02, 0, 0, 0, 0, 0, 0, 0, // block 1
            66, 0, 0, 0, 0, 0, 0, 0,   // length
        ];
        assert_eq!(&frame[..24], &head);
        assert_eq!(&frame[frame.len() - 4..], &FRAME_MAGIC);
    }

    #[test]
    fn test_empty_frame() {
        let frame = LengthTaggedBitVector::default().to_frame();
        assert_eq!(frame.len(), Trailer::SIZE);
        let tagged = LengthTaggedRef::from_bytes(frame).unwrap();
        assert!(tagged.is_empty());
        assert_eq!(tagged.decode_to_owned(), LengthTaggedBitVector::default());
    }

    #[test]
    fn test_short_frame() {
        for i in 0..Trailer::SIZE {
            assert_matches!(
                LengthTaggedRef::from_bytes(vec![0; i]),
                Err(FrameErr::Short { needed, actual }) if needed == Trailer::SIZE && actual == i,
                "Failed for truncated buffer of size {i}"
            );
        }
    }

    #[test]
    fn test_corrupted_magic() {
        let mut frame = mktagged_buf(&[true, false, true]);
        let magic_at = frame.len() - FRAME_MAGIC.len();
        frame[magic_at..].copy_from_slice(&[0; 4]);
        assert_matches!(LengthTaggedRef::from_bytes(frame), Err(FrameErr::Magic));
    }

    #[test]
    fn test_corrupted_block() {
        let mut frame = mktagged_buf(&[true, false, true]);
        frame[0] = 123;
        assert_matches!(LengthTaggedRef::from_bytes(frame), Err(FrameErr::Checksum));
    }

    #[test]
    fn test_corrupted_length_is_checksummed() {
        let mut frame = mktagged_buf(&[true, false, true]);
        frame[8] = 2;
        assert_matches!(LengthTaggedRef::from_bytes(frame), Err(FrameErr::Checksum));
    }

    #[test]
    fn test_length_exceeds_capacity() {
        // a single block can't carry 65 meaningful bits
        let tagged = LengthTaggedBitVector::from_parts(BitVector::new(64), 64).unwrap();
        let mut frame = tagged.to_frame().to_vec();
        frame[8] = 65;
        reseal(&mut frame);
        assert_matches!(
            LengthTaggedRef::from_bytes(frame),
            Err(FrameErr::LengthOverflow { length: 65, capacity: 64 })
        );
    }

    #[test]
    fn test_ragged_blocks() {
        let mut frame = vec![0u8; 3];
        frame.extend_from_slice(&[0; 8]);
        frame.extend_from_slice(&[0; 8]);
        frame.extend_from_slice(&FRAME_MAGIC);
        reseal(&mut frame);
        assert_matches!(
            LengthTaggedRef::from_bytes(frame),
            Err(FrameErr::RaggedBlocks(3))
        );
    }

    proptest! {
        #[test]
        fn test_frame_roundtrip_proptest(bits in vec(proptest::bool::ANY, 0..500)) {
            let tagged: LengthTaggedBitVector = bits.iter().copied().collect();
            let frame = tagged.to_frame();
            assert_eq!(frame.len(), tagged.frame_len());

            let tagged_ref = LengthTaggedRef::from_bytes(frame).unwrap();
            assert_eq!(tagged_ref.len(), bits.len());
            assert_eq!(tagged_ref, tagged);
            assert_eq!(tagged_ref.decode_to_owned(), tagged);
        }
    }
}
