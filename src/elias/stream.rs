use crate::{
    LengthTaggedBitVector,
    block::{BLOCK_BITS, Block, BlockExt, block_and_bit},
    elias::CodeErr,
    tagged::BitSource,
};

/// Append-only bit stream which fills blocks least significant bit first.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    blocks: Vec<Block>,
    len: usize,
}

impl BitWriter {
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            blocks: Vec::with_capacity(bits.div_ceil(BLOCK_BITS)),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let (block, position) = block_and_bit(self.len);
        if block == self.blocks.len() {
            self.blocks.push(0);
        }
        if bit {
            self.blocks[block].insert(position);
        }
        self.len += 1;
    }

    pub fn put_zeros(&mut self, count: usize) {
        self.len += count;
        self.blocks.resize(self.len.div_ceil(BLOCK_BITS), 0);
    }

    /// Write the low `width` bits of `value`, most significant first.
    pub fn put_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= u64::BITS as usize);
        for shift in (0..width).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    pub fn finish(self) -> LengthTaggedBitVector {
        LengthTaggedBitVector::from_raw(self.blocks, self.len)
    }
}

/// Cursor over the meaningful bits of a [`BitSource`].
///
/// Errors report the offset of the code being read, set by [`Self::begin_code`].
pub(crate) struct BitReader<'a, S: ?Sized> {
    source: &'a S,
    cursor: usize,
    code_start: usize,
}

impl<'a, S: BitSource + ?Sized> BitReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, cursor: 0, code_start: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.source.bit_len() - self.cursor
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn begin_code(&mut self) {
        self.code_start = self.cursor;
    }

    #[inline]
    pub fn truncated(&self) -> CodeErr {
        CodeErr::Truncated { offset: self.code_start }
    }

    #[inline]
    pub fn overflow(&self) -> CodeErr {
        CodeErr::Overflow { offset: self.code_start }
    }

    pub fn read_bit(&mut self) -> Result<bool, CodeErr> {
        let bit = self.source.bit(self.cursor).ok_or_else(|| self.truncated())?;
        self.cursor += 1;
        Ok(bit)
    }

    /// Read a `width` bit field written most significant bit first.
    pub fn read_bits(&mut self, width: usize) -> Result<u64, CodeErr> {
        debug_assert!(width <= u64::BITS as usize);
        if width > self.remaining() {
            return Err(self.truncated());
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Count zero bits up to and including the terminating one bit.
    ///
    /// Fails with an overflow once more than `max_zeros` zeros are seen.
    pub fn read_unary(&mut self, max_zeros: usize) -> Result<usize, CodeErr> {
        let mut zeros = 0;
        while !self.read_bit()? {
            zeros += 1;
            if zeros > max_zeros {
                return Err(self.overflow());
            }
        }
        Ok(zeros)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use itertools::assert_equal;

    use super::*;

    #[test]
    fn test_writer_bit_order() {
        let mut writer = BitWriter::default();
        writer.put_bits(0b110, 3);
        writer.put_zeros(2);
        writer.push(true);
        assert_eq!(writer.len(), 6);

        let tagged = writer.finish();
        assert_equal(tagged.iter(), [true, true, false, false, false, true]);
        // stream bit i is bit i of the first block
        assert_eq!(tagged.bit_vector().as_raw_slice(), &[0b100011]);
    }

    #[test]
    fn test_writer_crosses_blocks() {
        let mut writer = BitWriter::with_capacity(10);
        writer.put_zeros(63);
        writer.put_bits(0b11, 2);
        let tagged = writer.finish();
        assert_eq!(tagged.len(), 65);
        assert_eq!(tagged.capacity(), 128);
        assert_eq!(tagged.bit_vector().to_nums(), [63, 64]);
    }

    #[test]
    fn test_writer_trailing_zeros() {
        let mut writer = BitWriter::default();
        writer.put_zeros(70);
        let tagged = writer.finish();
        assert_eq!(tagged.len(), 70);
        assert_eq!(tagged.capacity(), 128);
        assert!(tagged.bit_vector().is_empty());
    }

    #[test]
    fn test_reader() {
        let tagged: LengthTaggedBitVector = [false, false, true, true, false, true]
            .into_iter()
            .collect();
        let mut reader = BitReader::new(&tagged);
        assert_eq!(reader.read_unary(63).unwrap(), 2);
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert!(reader.is_at_end());

        reader.begin_code();
        assert_matches!(reader.read_bit(), Err(CodeErr::Truncated { offset: 6 }));
    }

    #[test]
    fn test_reader_truncated_field() {
        let tagged: LengthTaggedBitVector = [true, false].into_iter().collect();
        let mut reader = BitReader::new(&tagged);
        assert_matches!(reader.read_bits(3), Err(CodeErr::Truncated { offset: 0 }));
        // a failed field read does not move the cursor
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
    }

    #[test]
    fn test_reader_unary_overflow() {
        let mut writer = BitWriter::default();
        writer.put_zeros(10);
        writer.push(true);
        let tagged = writer.finish();

        assert_matches!(
            BitReader::new(&tagged).read_unary(9),
            Err(CodeErr::Overflow { offset: 0 })
        );
        assert_eq!(BitReader::new(&tagged).read_unary(10).unwrap(), 10);
    }

    #[test]
    fn test_full_width_field() {
        let mut writer = BitWriter::default();
        writer.put_bits(u64::MAX - 1, 64);
        let tagged = writer.finish();
        assert_eq!(BitReader::new(&tagged).read_bits(64).unwrap(), u64::MAX - 1);
    }
}
