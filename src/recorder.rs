use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    elias::EliasFamily,
    trajectory::{EncodedTrajectory, Entity, Sample, Trajectory},
};

/// Every trajectory flushed during one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMovement {
    pub round: u32,
    pub trajectories: Vec<EncodedTrajectory>,
}

/// Accumulates samples per entity and emits coded trajectories when tracks close.
///
/// A track opens on the first sample recorded for an entity and closes when
/// the entity dies, disconnects or is destroyed ([`Self::close`]), or when
/// the round ends ([`Self::finish_round`]). Closed tracks are held until the
/// round is finished.
///
/// A track which fails to encode is dropped with a warning so that a single
/// bad record never interrupts recording.
#[derive(Debug)]
pub struct MovementRecorder {
    family: EliasFamily,
    open: BTreeMap<Entity, Trajectory>,
    closed: Vec<EncodedTrajectory>,
}

impl Default for MovementRecorder {
    fn default() -> Self {
        Self::new(EliasFamily::default())
    }
}

impl MovementRecorder {
    pub fn new(family: EliasFamily) -> Self {
        Self {
            family,
            open: BTreeMap::new(),
            closed: Vec::new(),
        }
    }

    /// Append a sample, opening a track at `frame` if none is open.
    pub fn record(&mut self, entity: Entity, frame: u64, sample: &Sample) {
        self.open
            .entry(entity)
            .or_insert_with(|| {
                tracing::trace!(?entity, frame, "opening track");
                Trajectory::new(entity, frame)
            })
            .push(frame, sample);
    }

    /// Record a complete, already collected trajectory.
    pub fn record_complete(&mut self, trajectory: Trajectory) {
        if let Some(encoded) = self.encode(trajectory) {
            self.closed.push(encoded);
        }
    }

    /// Close and encode the open track for `entity`.
    ///
    /// Returns `None` if there was no open track or it failed to encode.
    pub fn close(&mut self, entity: Entity, end_frame: u64) -> Option<&EncodedTrajectory> {
        let mut trajectory = self.open.remove(&entity)?;
        trajectory.set_end_frame(end_frame);
        let encoded = self.encode(trajectory)?;
        self.closed.push(encoded);
        self.closed.last()
    }

    /// Close every open track and drain the round's trajectories.
    pub fn finish_round(&mut self, round: u32, end_frame: u64) -> RoundMovement {
        let open = std::mem::take(&mut self.open);
        for (_, mut trajectory) in open {
            trajectory.set_end_frame(end_frame);
            if let Some(encoded) = self.encode(trajectory) {
                self.closed.push(encoded);
            }
        }

        let trajectories = std::mem::take(&mut self.closed);
        tracing::debug!(round, trajectories = trajectories.len(), "finished round");
        RoundMovement { round, trajectories }
    }

    /// Entities with an open track.
    pub fn open_tracks(&self) -> impl Iterator<Item = Entity> + '_ {
        self.open.keys().copied()
    }

    fn encode(&self, trajectory: Trajectory) -> Option<EncodedTrajectory> {
        if trajectory.is_empty() {
            return None;
        }
        match trajectory.encode(self.family) {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                tracing::warn!(
                    entity = ?trajectory.entity(),
                    start_frame = trajectory.start_frame(),
                    error = %err,
                    "dropping trajectory which failed to encode"
                );
                None
            }
        }
    }
}
