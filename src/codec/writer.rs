use bytes::BufMut;
use crc64fast_nvme::Digest;
use zerocopy::{IntoBytes, LittleEndian, U64, transmute_ref};

use crate::{block::Block, codec::Trailer};

/// Streams blocks into a buffer while digesting them. Consumed by
/// [`FrameWriter::seal`], so a frame gets exactly one trailer.
pub(crate) struct FrameWriter<'a, B: BufMut> {
    out: &'a mut B,
    digest: Digest,
    written: usize,
}

impl<'a, B: BufMut> FrameWriter<'a, B> {
    pub(crate) fn new(out: &'a mut B) -> Self {
        Self { out, digest: Digest::new(), written: 0 }
    }

    pub(crate) fn put_blocks(&mut self, blocks: &[Block]) {
        static_assertions::assert_cfg!(target_endian = "little");
        let raw: &[U64<LittleEndian>] = transmute_ref!(blocks);
        let bytes = raw.as_bytes();
        self.digest.write(bytes);
        self.out.put_slice(bytes);
        self.written += bytes.len();
    }

    /// Append the trailer tagging `length` meaningful bits. Returns the total
    /// frame size.
    pub(crate) fn seal(self, length: usize) -> usize {
        let trailer = Trailer::seal(self.digest, length);
        self.out.put_slice(trailer.as_bytes());
        self.written + Trailer::SIZE
    }
}
