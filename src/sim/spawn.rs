//! Spawn planning
//!
//! Obstacles are proposed above the visible grid inside a lane, then checked
//! against a buffer around every obstacle still near the spawn rows so two
//! pieces can never fuse into a wall without a gap.

use std::fmt;

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::piece::{Obstacle, ShapeTemplate};
use crate::error::SpawnError;

/// Named column range used to localize spawns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub name: String,
    pub start: i32,
    pub width: i32,
}

impl Lane {
    pub fn new(name: impl Into<String>, start: i32, width: i32) -> Self {
        Self {
            name: name.into(),
            start,
            width,
        }
    }

    pub fn end(&self) -> i32 {
        self.start + self.width
    }
}

/// Default left/middle/right layout of a 10-column grid
pub fn default_lanes() -> Vec<Lane> {
    vec![
        Lane::new("left", 0, 3),
        Lane::new("middle", 3, 4),
        Lane::new("right", 7, 3),
    ]
}

/// Chooses which lanes a spawn wave targets
pub trait SpawnPolicy: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Lane indices to try this wave, in order
    fn lanes_for_wave(&mut self, lane_count: usize, rng: &mut Pcg32) -> Vec<usize>;
}

/// One random lane per wave
#[derive(Debug, Default)]
pub struct RandomLane;

impl SpawnPolicy for RandomLane {
    fn name(&self) -> &'static str {
        "random-lane"
    }

    fn lanes_for_wave(&mut self, lane_count: usize, rng: &mut Pcg32) -> Vec<usize> {
        if lane_count == 0 {
            return Vec::new();
        }
        vec![rng.random_range(0..lane_count)]
    }
}

/// Always the same lane
#[derive(Debug)]
pub struct FixedLane {
    pub lane: usize,
}

impl SpawnPolicy for FixedLane {
    fn name(&self) -> &'static str {
        "fixed-lane"
    }

    fn lanes_for_wave(&mut self, lane_count: usize, _rng: &mut Pcg32) -> Vec<usize> {
        if self.lane < lane_count {
            vec![self.lane]
        } else {
            Vec::new()
        }
    }
}

/// Several distinct random lanes per wave
#[derive(Debug)]
pub struct MultiLane {
    pub count: usize,
}

impl SpawnPolicy for MultiLane {
    fn name(&self) -> &'static str {
        "multi-lane"
    }

    fn lanes_for_wave(&mut self, lane_count: usize, rng: &mut Pcg32) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..lane_count).collect();
        let take = self.count.min(lane_count);
        let mut chosen = Vec::with_capacity(take);
        for _ in 0..take {
            let i = rng.random_range(0..pool.len());
            chosen.push(pool.swap_remove(i));
        }
        chosen
    }
}

/// Cycles through the lanes left to right
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: usize,
}

impl SpawnPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn lanes_for_wave(&mut self, lane_count: usize, _rng: &mut Pcg32) -> Vec<usize> {
        if lane_count == 0 {
            return Vec::new();
        }
        let lane = self.next % lane_count;
        self.next = (lane + 1) % lane_count;
        vec![lane]
    }
}

/// Serializable policy selector used by the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPolicyKind {
    #[default]
    RandomLane,
    FixedLane {
        lane: usize,
    },
    MultiLane {
        count: usize,
    },
    RoundRobin,
}

impl SpawnPolicyKind {
    pub fn build(&self) -> Box<dyn SpawnPolicy> {
        match self {
            SpawnPolicyKind::RandomLane => Box::new(RandomLane),
            SpawnPolicyKind::FixedLane { lane } => Box::new(FixedLane { lane: *lane }),
            SpawnPolicyKind::MultiLane { count } => Box::new(MultiLane { count: *count }),
            SpawnPolicyKind::RoundRobin => Box::new(RoundRobin::default()),
        }
    }
}

/// Buffer check: `candidate` is rejected when any obstacle whose top row is
/// above `near_rows` has a cell within `radius` (Chebyshev) of a candidate cell.
pub fn can_place(candidate: &Obstacle, existing: &[Obstacle], radius: i32, near_rows: i32) -> bool {
    let cells = candidate.cells();
    let radius = i64::from(radius);
    let within = |a: IVec2, b: IVec2| {
        (i64::from(a.x) - i64::from(b.x)).abs() <= radius
            && (i64::from(a.y) - i64::from(b.y)).abs() <= radius
    };

    existing
        .iter()
        .filter(|other| other.origin.y < near_rows)
        .all(|other| {
            other
                .cells()
                .iter()
                .all(|&cell| cells.iter().all(|&own| !within(own, cell)))
        })
}

/// Proposes and validates new obstacles
#[derive(Debug, Clone)]
pub struct SpawnPlanner {
    pub shapes: Vec<ShapeTemplate>,
    pub buffer_radius: i32,
    pub near_spawn_rows: i32,
    /// Placement attempts per lane before giving up
    pub attempts: u32,
}

impl SpawnPlanner {
    /// Pick a shape that fits the lane and a random offset inside it. The
    /// piece sits entirely above row 0.
    pub fn propose_spawn(
        &self,
        lane_index: usize,
        lane: &Lane,
        rng: &mut Pcg32,
    ) -> Result<Obstacle, SpawnError> {
        let allowed: Vec<&ShapeTemplate> = self
            .shapes
            .iter()
            .filter(|t| t.shape.width() <= lane.width)
            .collect();
        if allowed.is_empty() {
            return Err(SpawnError::NoShapeFits {
                lane: lane.name.clone(),
            });
        }

        let template = allowed[rng.random_range(0..allowed.len())];
        let slack = lane.width - template.shape.width();
        let offset = rng.random_range(0..=slack);
        let origin = IVec2::new(lane.start + offset, -template.shape.height());
        Ok(Obstacle::new(template, origin, lane_index))
    }

    pub fn can_place(&self, candidate: &Obstacle, existing: &[Obstacle]) -> bool {
        can_place(candidate, existing, self.buffer_radius, self.near_spawn_rows)
    }

    /// Propose up to `attempts` candidates in one lane and return the first
    /// that clears the buffer.
    pub fn spawn_in_lane(
        &self,
        lane_index: usize,
        lane: &Lane,
        existing: &[Obstacle],
        rng: &mut Pcg32,
    ) -> Result<Obstacle, SpawnError> {
        for _ in 0..self.attempts {
            let candidate = self.propose_spawn(lane_index, lane, rng)?;
            if self.can_place(&candidate, existing) {
                return Ok(candidate);
            }
        }
        Err(SpawnError::NoValidSpawnFound {
            lane: lane.name.clone(),
            attempts: self.attempts,
        })
    }

    /// Run one wave. Lanes that cannot place anything are skipped, so a wave
    /// may return fewer pieces than the policy asked for.
    pub fn plan_wave(
        &self,
        policy: &mut dyn SpawnPolicy,
        lanes: &[Lane],
        existing: &[Obstacle],
        rng: &mut Pcg32,
    ) -> Vec<Obstacle> {
        let mut placed: Vec<Obstacle> = Vec::new();
        for lane_index in policy.lanes_for_wave(lanes.len(), rng) {
            let Some(lane) = lanes.get(lane_index) else {
                continue;
            };
            let mut occupied = existing.to_vec();
            occupied.extend(placed.iter().cloned());
            match self.spawn_in_lane(lane_index, lane, &occupied, rng) {
                Ok(obstacle) => placed.push(obstacle),
                Err(e) => log::debug!("Spawn skipped ({}): {}", policy.name(), e),
            }
        }
        placed
    }
}
