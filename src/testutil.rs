use bytes::{Bytes, BytesMut};
use proptest::{
    prelude::{Arbitrary, BoxedStrategy, Just, Strategy},
    prop_oneof,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    BitVector, LengthTaggedBitVector, LengthTaggedRef, ToFrame,
    trajectory::{Entity, Sample, Trajectory},
};

pub fn mktagged(bits: &[bool]) -> LengthTaggedBitVector {
    bits.iter().copied().collect()
}

/// Frame `bits` into a mutable buffer, for corrupting in tests.
pub fn mktagged_buf(bits: &[bool]) -> BytesMut {
    let tagged = mktagged(bits);
    let mut buf = BytesMut::with_capacity(tagged.frame_len());
    tagged.write_frame(&mut buf);
    assert_eq!(buf.len(), tagged.frame_len());
    buf
}

pub fn mktagged_ref(bits: &[bool]) -> LengthTaggedRef<Bytes> {
    LengthTaggedRef::from_bytes(mktagged(bits).to_frame()).unwrap()
}

/// Assert the tracked bounds of `bv` agree with its blocks.
#[track_caller]
pub fn check_bounds(bv: &BitVector) {
    let ones = bv.to_nums();
    assert_eq!(bv.any_set(), !ones.is_empty(), "any_set disagrees with blocks");
    assert_eq!(bv.lowest(), ones.first().copied(), "stale lowest");
    assert_eq!(bv.highest(), ones.last().copied(), "stale highest");
    if let Some(bounds) = bv.bounds() {
        assert!(bv.get_bit(*bounds.start()).unwrap());
        assert!(bv.get_bit(*bounds.end()).unwrap());
    }
}

/// A single bit vector mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    Set(usize),
    Clear(usize),
    Reset,
}

impl Arbitrary for BitOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            6 => (0usize..512).prop_map(BitOp::Set),
            5 => (0usize..512).prop_map(BitOp::Clear),
            1 => Just(BitOp::Reset),
        ]
        .boxed()
    }
}

/// Seeded generator of plausible, slowly varying movement.
pub struct TrajectoryGen {
    rng: StdRng,
}

impl TrajectoryGen {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// A random walk through world space with a drifting view direction.
    pub fn samples(&mut self, len: usize) -> Vec<Sample> {
        let mut sample = Sample::at(
            self.rng.random_range(-3000..3000),
            self.rng.random_range(-3000..3000),
            self.rng.random_range(-200..200),
        )
        .with_view(self.rng.random_range(0..360), self.rng.random_range(-89..=89));

        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(sample);
            for p in &mut sample.position {
                *p += self.rng.random_range(-8..=8);
            }
            sample.view[0] = (sample.view[0] + self.rng.random_range(-5..=5)).rem_euclid(360);
            sample.view[1] = (sample.view[1] + self.rng.random_range(-2..=2)).clamp(-89, 89);
        }
        out
    }

    pub fn player(&mut self, id: u64, start_frame: u64, len: usize) -> Trajectory {
        self.trajectory(Entity::player(id), start_frame, len)
    }

    pub fn projectile(&mut self, id: u64, start_frame: u64, len: usize) -> Trajectory {
        self.trajectory(Entity::projectile(id), start_frame, len)
    }

    fn trajectory(&mut self, entity: Entity, start_frame: u64, len: usize) -> Trajectory {
        let mut trajectory = Trajectory::new(entity, start_frame);
        for (frame, sample) in (start_frame..).zip(self.samples(len)) {
            trajectory.push(frame, &sample);
        }
        trajectory
    }

    /// `len` values drawn uniformly from `-magnitude..=magnitude`.
    pub fn values(&mut self, len: usize, magnitude: i64) -> Vec<i64> {
        (0..len)
            .map(|_| self.rng.random_range(-magnitude..=magnitude))
            .collect()
    }
}
