use crc64fast_nvme::Digest;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U64, Unaligned};

use crate::{
    block::{BLOCK_BITS, Block},
    codec::FrameErr,
};

/// The last four bytes of every frame.
pub const FRAME_MAGIC: [u8; 4] = [0xE1, 0x1A, 0x5D, 0x7A];

/// Fixed record closing a frame.
///
/// The checksum is CRC-64/NVME over the block bytes followed by the
/// little-endian `length` word, so a flipped length is caught like a flipped
/// block.
#[derive(FromBytes, IntoBytes, Immutable, Unaligned, KnownLayout)]
#[repr(C)]
pub(crate) struct Trailer {
    length: U64<LittleEndian>,
    checksum: U64<LittleEndian>,
    magic: [u8; 4],
}

static_assertions::const_assert_eq!(Trailer::SIZE, 20);

impl Trailer {
    pub(crate) const SIZE: usize = size_of::<Self>();

    /// Finish `digest`, which has already seen the block bytes.
    pub(crate) fn seal(mut digest: Digest, length: usize) -> Self {
        let length = U64::new(length as u64);
        digest.write(length.as_bytes());
        Self {
            length,
            checksum: U64::new(digest.sum64()),
            magic: FRAME_MAGIC,
        }
    }

    /// Split a frame into its block region and tagged bit length.
    pub(crate) fn open(frame: &[u8]) -> Result<(&[u8], usize), FrameErr> {
        let (blocks, trailer) = Self::ref_from_suffix(frame).map_err(|_| FrameErr::Short {
            needed: Self::SIZE,
            actual: frame.len(),
        })?;

        if trailer.magic != FRAME_MAGIC {
            return Err(FrameErr::Magic);
        }
        if blocks.len() % size_of::<Block>() != 0 {
            return Err(FrameErr::RaggedBlocks(blocks.len()));
        }

        let mut digest = Digest::new();
        digest.write(blocks);
        digest.write(trailer.length.as_bytes());
        if digest.sum64() != trailer.checksum.get() {
            return Err(FrameErr::Checksum);
        }

        let length = trailer.length.get();
        let capacity = blocks.len() / size_of::<Block>() * BLOCK_BITS;
        match usize::try_from(length) {
            Ok(bits) if bits <= capacity => Ok((blocks, bits)),
            _ => Err(FrameErr::LengthOverflow { length, capacity }),
        }
    }
}
