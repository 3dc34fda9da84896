//! trajpack stores slowly varying integer sequences, such as the positions and
//! view angles of players and projectiles, far more densely than fixed-width
//! integers.
//!
//! ## Key Features:
//!
//! - **Elias Codes**: sequences are delta transformed and written as Elias
//!   gamma or delta codes, with zigzag mapping for signed values. Codes are
//!   self-delimiting, so small differences cost only a few bits each.
//!
//! - **Min/Max Tracking Bit Vector**: [`BitVector`] is a fixed-capacity,
//!   block-addressable bit store which tracks its lowest and highest set bits,
//!   letting scans skip empty leading and trailing blocks.
//!
//! - **Length Tagged Output**: encoding yields a [`LengthTaggedBitVector`]
//!   which records the exact number of meaningful bits. It persists through
//!   `serde`, or as a checksummed frame (see [`ToFrame`]) readable in place
//!   with [`LengthTaggedRef`].
//!
//! ```
//! use trajpack::{EliasCodec, prefix_sum, to_deltas};
//!
//! let xs: [i64; 5] = [100, 102, 101, 101, 150];
//! let codec = EliasCodec::default();
//! let bits = codec.encode(&to_deltas(&xs)).unwrap();
//! assert_eq!(prefix_sum(&codec.decode(&bits).unwrap()), xs);
//! ```

mod bit_vector;
mod block;
mod codec;
mod config;
mod delta;
pub mod elias;
mod recorder;
mod tagged;
mod tagged_ref;
mod trajectory;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use bit_vector::{BitVector, Blocks, Ones, OutOfRange};
pub use block::{BLOCK_BITS, Block, BlockExt, BlockPositions};
pub use codec::{FRAME_MAGIC, FrameErr, ToFrame};
pub use config::CodecConfig;
pub use delta::{prefix_sum, to_deltas};
pub use elias::{
    CodeErr, EliasCodec, EliasFamily, EncodeErr, decode_signed, decode_unsigned, encode_signed,
    encode_unsigned,
};
pub use recorder::{MovementRecorder, RoundMovement};
pub use tagged::{BitSource, LengthTaggedBitVector, PersistedBits};
pub use tagged_ref::LengthTaggedRef;
pub use trajectory::{
    Axis, EncodedTrajectory, Entity, EntityKind, Sample, Trajectory, TrajectoryErr,
};
