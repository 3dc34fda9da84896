//! Per-entity movement columns and their coded form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    LengthTaggedBitVector,
    delta::{prefix_sum, to_deltas},
    elias::{CodeErr, EliasCodec, EliasFamily, EncodeErr},
};

/// One tracked dimension of an entity's movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    Yaw,
    Pitch,
}

impl Axis {
    pub const POSITION: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::Yaw, Axis::Pitch];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Tracks position and view angles.
    Player,
    /// Tracks position only.
    Projectile,
}

impl EntityKind {
    /// The axes recorded for this kind of entity, in column order.
    pub fn axes(self) -> &'static [Axis] {
        match self {
            EntityKind::Player => &Axis::ALL,
            EntityKind::Projectile => &Axis::POSITION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: u64,
}

impl Entity {
    pub const fn player(id: u64) -> Self {
        Self { kind: EntityKind::Player, id }
    }

    pub const fn projectile(id: u64) -> Self {
        Self { kind: EntityKind::Projectile, id }
    }
}

/// A single observation of an entity, in whole world units and degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Sample {
    pub position: [i64; 3],
    pub view: [i64; 2],
}

impl Sample {
    pub const fn at(x: i64, y: i64, z: i64) -> Self {
        Self { position: [x, y, z], view: [0, 0] }
    }

    pub const fn with_view(mut self, yaw: i64, pitch: i64) -> Self {
        self.view = [yaw, pitch];
        self
    }

    /// Truncate floating point coordinates and angles toward zero.
    pub fn quantize(position: [f32; 3], view: [f32; 2]) -> Self {
        Self {
            position: position.map(|v| v as i64),
            view: view.map(|v| v as i64),
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.position[0],
            Axis::Y => self.position[1],
            Axis::Z => self.position[2],
            Axis::Yaw => self.view[0],
            Axis::Pitch => self.view[1],
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrajectoryErr {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {axis:?} holds {found} samples, expected {expected}")]
    ColumnLength {
        axis: Axis,
        expected: usize,
        found: usize,
    },

    #[error("encoded trajectory is missing axis {0:?}")]
    MissingAxis(Axis),

    #[error("axis {0:?} is not tracked for this entity")]
    UnexpectedAxis(Axis),

    #[error("failed to encode axis {axis:?}")]
    Encode {
        axis: Axis,
        #[source]
        source: EncodeErr,
    },

    #[error("failed to decode axis {axis:?}")]
    Code {
        axis: Axis,
        #[source]
        source: CodeErr,
    },
}

/// The raw samples of one entity between two frames, stored column-wise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    entity: Entity,
    start_frame: u64,
    end_frame: u64,
    columns: Vec<Vec<i64>>,
}

impl Trajectory {
    pub fn new(entity: Entity, start_frame: u64) -> Self {
        Self {
            entity,
            start_frame,
            end_frame: start_frame,
            columns: vec![Vec::new(); entity.kind.axes().len()],
        }
    }

    /// Build a trajectory from one column per tracked axis.
    pub fn from_columns(
        entity: Entity,
        start_frame: u64,
        end_frame: u64,
        columns: Vec<Vec<i64>>,
    ) -> Result<Self, TrajectoryErr> {
        let axes = entity.kind.axes();
        if columns.len() != axes.len() {
            return Err(TrajectoryErr::ColumnCount {
                expected: axes.len(),
                found: columns.len(),
            });
        }
        let expected = columns[0].len();
        for (&axis, column) in axes.iter().zip(&columns) {
            if column.len() != expected {
                return Err(TrajectoryErr::ColumnLength {
                    axis,
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(Self { entity, start_frame, end_frame, columns })
    }

    /// Append a sample observed at `frame`. Axes the entity doesn't track are ignored.
    pub fn push(&mut self, frame: u64, sample: &Sample) {
        for (&axis, column) in self.entity.kind.axes().iter().zip(&mut self.columns) {
            column.push(sample.get(axis));
        }
        self.end_frame = self.end_frame.max(frame);
    }

    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[inline]
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    #[inline]
    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    pub fn set_end_frame(&mut self, frame: u64) {
        self.end_frame = frame;
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn axis(&self, axis: Axis) -> Option<&[i64]> {
        let idx = self.entity.kind.axes().iter().position(|&a| a == axis)?;
        Some(&self.columns[idx])
    }

    pub fn columns(&self) -> impl Iterator<Item = (Axis, &[i64])> {
        self.entity
            .kind
            .axes()
            .iter()
            .copied()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Delta transform every column, then code it with signed `family` codes.
    pub fn encode(&self, family: EliasFamily) -> Result<EncodedTrajectory, TrajectoryErr> {
        let codec = EliasCodec::new(family, true);
        let axes = self
            .columns()
            .map(|(axis, column)| {
                codec
                    .encode(&to_deltas(column))
                    .map(|bits| (axis, bits))
                    .map_err(|source| TrajectoryErr::Encode { axis, source })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(EncodedTrajectory {
            entity: self.entity,
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            family,
            axes,
        })
    }
}

/// A [`Trajectory`] with every column delta transformed and Elias coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedTrajectory {
    pub entity: Entity,
    pub start_frame: u64,
    pub end_frame: u64,
    #[serde(default)]
    pub family: EliasFamily,
    pub axes: BTreeMap<Axis, LengthTaggedBitVector>,
}

impl EncodedTrajectory {
    /// Total coded size of all axes, in bits.
    pub fn coded_bits(&self) -> usize {
        self.axes.values().map(LengthTaggedBitVector::len).sum()
    }

    /// Decode every column and undo the delta transform.
    pub fn decode(&self) -> Result<Trajectory, TrajectoryErr> {
        let tracked = self.entity.kind.axes();
        if let Some(&axis) = self.axes.keys().find(|&axis| !tracked.contains(axis)) {
            return Err(TrajectoryErr::UnexpectedAxis(axis));
        }

        let codec = EliasCodec::new(self.family, true);
        let columns = tracked
            .iter()
            .map(|&axis| {
                let bits = self.axes.get(&axis).ok_or(TrajectoryErr::MissingAxis(axis))?;
                let deltas = codec
                    .decode(bits)
                    .map_err(|source| TrajectoryErr::Code { axis, source })?;
                Ok(prefix_sum(&deltas))
            })
            .collect::<Result<Vec<_>, TrajectoryErr>>()?;

        Trajectory::from_columns(self.entity, self.start_frame, self.end_frame, columns)
    }
}
