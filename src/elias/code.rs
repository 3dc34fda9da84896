use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::{
    elias::{
        CodeErr,
        stream::{BitReader, BitWriter},
    },
    tagged::BitSource,
};

/// Longest unary prefix a gamma code may carry before its value would need
/// more than 64 bits.
const MAX_GAMMA_ZEROS: usize = u64::BITS as usize - 1;

/// Largest bit width a delta code's gamma coded length may describe.
const MAX_DELTA_WIDTH: u64 = u64::BITS as u64;

/// The two Elias code families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliasFamily {
    /// Unary length prefix. Best for small magnitudes.
    #[default]
    Gamma,
    /// Gamma coded length prefix. Shorter than gamma once values pass 31.
    Delta,
}

/// `floor(log2(a))`
#[inline]
fn width(a: NonZeroU64) -> usize {
    a.ilog2() as usize
}

impl EliasFamily {
    /// Exact number of bits the code for `a` occupies.
    ///
    /// ```
    /// use std::num::NonZeroU64;
    /// use trajpack::EliasFamily;
    ///
    /// let a = NonZeroU64::new(5).unwrap();
    /// assert_eq!(EliasFamily::Gamma.code_len(a), 5);
    /// assert_eq!(EliasFamily::Delta.code_len(a), 5);
    /// ```
    pub fn code_len(self, a: NonZeroU64) -> usize {
        let n = width(a);
        match self {
            EliasFamily::Gamma => 2 * n + 1,
            EliasFamily::Delta => {
                let len = NonZeroU64::MIN.saturating_add(n as u64);
                EliasFamily::Gamma.code_len(len) + n
            }
        }
    }

    pub(crate) fn write(self, writer: &mut BitWriter, a: NonZeroU64) {
        let n = width(a);
        match self {
            EliasFamily::Gamma => {
                writer.put_zeros(n);
                writer.push(true);
            }
            EliasFamily::Delta => {
                let len = NonZeroU64::MIN.saturating_add(n as u64);
                EliasFamily::Gamma.write(writer, len);
            }
        }
        writer.put_bits(a.get(), n);
    }

    pub(crate) fn read<S: BitSource + ?Sized>(
        self,
        reader: &mut BitReader<'_, S>,
    ) -> Result<NonZeroU64, CodeErr> {
        reader.begin_code();
        let n = match self {
            EliasFamily::Gamma => reader.read_unary(MAX_GAMMA_ZEROS)?,
            EliasFamily::Delta => {
                let len = read_gamma(reader)?.get();
                if len > MAX_DELTA_WIDTH {
                    return Err(reader.overflow());
                }
                (len - 1) as usize
            }
        };
        let low = reader.read_bits(n)?;
        NonZeroU64::new((1u64 << n) | low).ok_or_else(|| reader.overflow())
    }
}

/// Gamma decode without resetting the reader's code offset.
fn read_gamma<S: BitSource + ?Sized>(reader: &mut BitReader<'_, S>) -> Result<NonZeroU64, CodeErr> {
    let n = reader.read_unary(MAX_GAMMA_ZEROS)?;
    let low = reader.read_bits(n)?;
    NonZeroU64::new((1u64 << n) | low).ok_or_else(|| reader.overflow())
}
