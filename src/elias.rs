//! Elias gamma and delta codes over sequences of 64-bit integers.
//!
//! Every value is first mapped to a positive integer (see [`ValueMapping`]),
//! then written as one self-delimiting code. Codes are concatenated into a
//! [`LengthTaggedBitVector`] whose length is the exact number of bits written.


use thiserror::Error;

use crate::{
    LengthTaggedBitVector,
    config::CodecConfig,
    tagged::BitSource,
};

mod code;
mod mapping;
mod stream;

pub use code::EliasFamily;
pub use mapping::{Signed, Unsigned, ValueMapping};

use mapping::NonNegative;
use stream::{BitReader, BitWriter};

/// Malformed coded input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodeErr {
    #[error("code starting at bit {offset} runs past the end of the stream")]
    Truncated { offset: usize },

    #[error("code starting at bit {offset} describes a value wider than 64 bits")]
    Overflow { offset: usize },
}

/// A value which can't be represented under the chosen mapping.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErr {
    #[error("negative value {0} requires a signed mapping")]
    Negative(i64),

    #[error("value does not fit in a 64-bit code")]
    Overflow,
}

/// Encode `values` with `family` under `mapping`.
pub fn encode_with<M: ValueMapping>(
    family: EliasFamily,
    mapping: &M,
    values: &[M::Value],
) -> Result<LengthTaggedBitVector, EncodeErr> {
    let codes = values
        .iter()
        .map(|&v| mapping.lift(v))
        .collect::<Result<Vec<_>, _>>()?;
    let total = codes.iter().map(|&a| family.code_len(a)).sum();

    let mut writer = BitWriter::with_capacity(total);
    for a in codes {
        family.write(&mut writer, a);
    }
    debug_assert_eq!(writer.len(), total);
    Ok(writer.finish())
}

/// Lazily decode `source` with `family` under `mapping`.
pub fn decode_iter_with<'a, S, M>(
    family: EliasFamily,
    mapping: M,
    source: &'a S,
) -> DecodeIter<'a, S, M>
where
    S: BitSource + ?Sized,
    M: ValueMapping,
{
    DecodeIter {
        reader: BitReader::new(source),
        family,
        mapping,
        failed: false,
    }
}

pub fn encode_unsigned(
    family: EliasFamily,
    values: &[u64],
) -> Result<LengthTaggedBitVector, EncodeErr> {
    encode_with(family, &Unsigned, values)
}

pub fn decode_unsigned<S: BitSource + ?Sized>(
    family: EliasFamily,
    source: &S,
) -> Result<Vec<u64>, CodeErr> {
    decode_iter_with(family, Unsigned, source).collect()
}

pub fn encode_signed(
    family: EliasFamily,
    values: &[i64],
) -> Result<LengthTaggedBitVector, EncodeErr> {
    encode_with(family, &Signed, values)
}

pub fn decode_signed<S: BitSource + ?Sized>(
    family: EliasFamily,
    source: &S,
) -> Result<Vec<i64>, CodeErr> {
    decode_iter_with(family, Signed, source).collect()
}

/// Iterator over the values of a coded stream.
///
/// Yields one error and then stops if the stream is malformed.
pub struct DecodeIter<'a, S: ?Sized, M> {
    reader: BitReader<'a, S>,
    family: EliasFamily,
    mapping: M,
    failed: bool,
}

impl<S: BitSource + ?Sized, M: ValueMapping> Iterator for DecodeIter<'_, S, M> {
    type Item = Result<M::Value, CodeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_at_end() {
            return None;
        }
        let offset = self.reader.position();
        let value = self
            .family
            .read(&mut self.reader)
            .and_then(|code| self.mapping.lower(code, offset));
        self.failed = value.is_err();
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            // every code is at least one bit
            (usize::from(!self.reader.is_at_end()), Some(self.reader.remaining()))
        }
    }
}

impl<S: BitSource + ?Sized, M: ValueMapping> std::iter::FusedIterator for DecodeIter<'_, S, M> {}

/// An Elias code family paired with a signedness mode, over `i64` values.
///
/// ```
/// use trajpack::{EliasCodec, EliasFamily};
///
/// let codec = EliasCodec::new(EliasFamily::Gamma, true);
/// let bits = codec.encode(&[3, -15, 123, -31, 0, 42]).unwrap();
/// assert_eq!(codec.decode(&bits).unwrap(), [3, -15, 123, -31, 0, 42]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliasCodec {
    family: EliasFamily,
    negative_allowed: bool,
}

impl Default for EliasCodec {
    fn default() -> Self {
        CodecConfig::default().into()
    }
}

impl From<CodecConfig> for EliasCodec {
    fn from(config: CodecConfig) -> Self {
        Self::new(config.family, config.negative_allowed)
    }
}

impl EliasCodec {
    pub const fn new(family: EliasFamily, negative_allowed: bool) -> Self {
        Self { family, negative_allowed }
    }

    #[inline]
    pub fn family(&self) -> EliasFamily {
        self.family
    }

    #[inline]
    pub fn negative_allowed(&self) -> bool {
        self.negative_allowed
    }

    pub fn encode(&self, values: &[i64]) -> Result<LengthTaggedBitVector, EncodeErr> {
        encode_with(self.family, self, values)
    }

    pub fn decode<S: BitSource + ?Sized>(&self, source: &S) -> Result<Vec<i64>, CodeErr> {
        self.decode_iter(source).collect()
    }

    pub fn decode_iter<'a, S: BitSource + ?Sized>(
        &self,
        source: &'a S,
    ) -> DecodeIter<'a, S, EliasCodec> {
        decode_iter_with(self.family, *self, source)
    }

    /// Number of bits `encode` would produce for `values`.
    pub fn encoded_len(&self, values: &[i64]) -> Result<usize, EncodeErr> {
        let mut total = 0;
        for &value in values {
            total += self.family.code_len(self.lift(value)?);
        }
        Ok(total)
    }
}

impl ValueMapping for EliasCodec {
    type Value = i64;

    #[inline]
    fn lift(&self, value: i64) -> Result<std::num::NonZeroU64, EncodeErr> {
        if self.negative_allowed {
            Signed.lift(value)
        } else {
            NonNegative.lift(value)
        }
    }

    #[inline]
    fn lower(&self, code: std::num::NonZeroU64, offset: usize) -> Result<i64, CodeErr> {
        if self.negative_allowed {
            Signed.lower(code, offset)
        } else {
            NonNegative.lower(code, offset)
        }
    }
}
