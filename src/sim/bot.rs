//! Autopilot strategies
//!
//! Each strategy reads the token's cell and a freshly built [`DangerField`]
//! and returns a target column plus the path it intends to walk. A cell is
//! "safe" when the field is zero on the token's row and on the row above it.
//!
//! Strategies that find nowhere safe report [`BotError::NoSafeColumnFound`]
//! and [`think`] swaps in the strategy's fallback, which bottoms out at
//! standing still.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::danger::DangerField;
use crate::consts::{CENTER_HUGGER_CENTER_WEIGHT, CENTER_HUGGER_DANGER_WEIGHT};
use crate::error::{BotError, CommandError};

/// What a strategy sees when it thinks
#[derive(Debug, Clone, Copy)]
pub struct BotView<'a> {
    pub column: i32,
    pub row: i32,
    pub field: &'a DangerField,
}

impl BotView<'_> {
    fn columns(&self) -> i32 {
        self.field.columns()
    }

    fn is_safe(&self, column: i32) -> bool {
        self.field.is_safe(column, self.row)
    }

    fn exposure(&self, column: i32) -> u32 {
        self.field.exposure(column, self.row)
    }

    fn path_through(&self, columns: &[i32]) -> Vec<IVec2> {
        columns.iter().map(|&c| IVec2::new(c, self.row)).collect()
    }
}

/// Destination column and the cells on the way (start included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPlan {
    pub target_column: i32,
    pub path: Vec<IVec2>,
}

impl BotPlan {
    pub fn stay(view: &BotView<'_>) -> Self {
        Self {
            target_column: view.column,
            path: vec![IVec2::new(view.column, view.row)],
        }
    }
}

/// Common contract for every autopilot
pub trait BotStrategy: Sync {
    fn name(&self) -> &'static str;

    fn plan(&self, view: &BotView<'_>) -> Result<BotPlan, BotError>;

    /// Plan used when [`BotStrategy::plan`] finds nothing safe
    fn fallback(&self, view: &BotView<'_>) -> BotPlan {
        Greedy.plan_local(view)
    }
}

/// Run a strategy, degrading to its fallback on failure
pub fn think(strategy: &dyn BotStrategy, view: &BotView<'_>) -> BotPlan {
    strategy.plan(view).unwrap_or_else(|e| {
        log::debug!("{} falling back: {}", strategy.name(), e);
        strategy.fallback(view)
    })
}

/// Breadth-first walk over adjacent columns from `start`, left neighbour
/// enqueued before right. Returns the column path to the first goal reached.
pub fn breadth_first(start: i32, columns: i32, is_goal: impl Fn(i32) -> bool) -> Option<Vec<i32>> {
    if start < 0 || start >= columns {
        return None;
    }
    let mut parent: Vec<Option<i32>> = vec![None; columns as usize];
    let mut visited = vec![false; columns as usize];
    let mut queue = VecDeque::from([start]);
    visited[start as usize] = true;

    while let Some(current) = queue.pop_front() {
        if is_goal(current) {
            let mut path = vec![current];
            let mut at = current;
            while let Some(prev) = parent[at as usize] {
                path.push(prev);
                at = prev;
            }
            path.reverse();
            return Some(path);
        }
        for next in [current - 1, current + 1] {
            if next >= 0 && next < columns && !visited[next as usize] {
                visited[next as usize] = true;
                parent[next as usize] = Some(current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Strategy 1: nearest safe column by move distance
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestSafe;

impl BotStrategy for NearestSafe {
    fn name(&self) -> &'static str {
        "nearest-safe"
    }

    fn plan(&self, view: &BotView<'_>) -> Result<BotPlan, BotError> {
        let path = breadth_first(view.column, view.columns(), |c| view.is_safe(c))
            .ok_or(BotError::NoSafeColumnFound { row: view.row })?;
        Ok(BotPlan {
            target_column: *path.last().unwrap_or(&view.column),
            path: view.path_through(&path),
        })
    }

    fn fallback(&self, view: &BotView<'_>) -> BotPlan {
        BotPlan::stay(view)
    }
}

/// Strategy 2: least exposed of stay, left, right
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    fn plan_local(&self, view: &BotView<'_>) -> BotPlan {
        let mut best = view.column;
        let mut lowest = u32::MAX;
        for column in [view.column, view.column - 1, view.column + 1] {
            if column < 0 || column >= view.columns() {
                continue;
            }
            let exposure = view.exposure(column);
            if exposure < lowest {
                lowest = exposure;
                best = column;
            }
        }

        let path = if best == view.column {
            vec![view.column]
        } else {
            vec![view.column, best]
        };
        BotPlan {
            target_column: best,
            path: view.path_through(&path),
        }
    }
}

impl BotStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn plan(&self, view: &BotView<'_>) -> Result<BotPlan, BotError> {
        Ok(self.plan_local(view))
    }
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    /// Insertion order; equal costs pop first-in first-out
    seq: u64,
    column: i32,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so the max-heap yields the cheapest, oldest entry
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Strategy 3: cheapest safe column under a danger- and center-weighted cost
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterHugger;

impl CenterHugger {
    /// Per-column best cost from the token and the predecessor on that path
    fn shortest_paths(view: &BotView<'_>) -> (Vec<f64>, Vec<Option<i32>>) {
        let columns = view.columns();
        let center = columns / 2;
        let mut costs = vec![f64::INFINITY; columns as usize];
        let mut parent: Vec<Option<i32>> = vec![None; columns as usize];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        costs[view.column as usize] = 0.0;
        heap.push(Frontier {
            cost: 0.0,
            seq,
            column: view.column,
        });

        while let Some(Frontier { cost, column: u, .. }) = heap.pop() {
            if cost > costs[u as usize] {
                continue;
            }
            for v in [u - 1, u + 1] {
                if v < 0 || v >= columns {
                    continue;
                }
                let step = 1.0
                    + f64::from(view.exposure(v)) * CENTER_HUGGER_DANGER_WEIGHT
                    + f64::from((v - center).abs()) * CENTER_HUGGER_CENTER_WEIGHT;
                let candidate = costs[u as usize] + step;
                if candidate < costs[v as usize] {
                    costs[v as usize] = candidate;
                    parent[v as usize] = Some(u);
                    seq += 1;
                    heap.push(Frontier {
                        cost: candidate,
                        seq,
                        column: v,
                    });
                }
            }
        }
        (costs, parent)
    }
}

impl BotStrategy for CenterHugger {
    fn name(&self) -> &'static str {
        "center-hugger"
    }

    fn plan(&self, view: &BotView<'_>) -> Result<BotPlan, BotError> {
        if view.column < 0 || view.column >= view.columns() {
            return Err(BotError::NoSafeColumnFound { row: view.row });
        }
        let (costs, parent) = Self::shortest_paths(view);

        let mut target = None;
        let mut lowest = f64::INFINITY;
        for column in 0..view.columns() {
            if view.is_safe(column) && costs[column as usize] < lowest {
                lowest = costs[column as usize];
                target = Some(column);
            }
        }
        let target = target.ok_or(BotError::NoSafeColumnFound { row: view.row })?;

        let mut path = vec![target];
        let mut at = target;
        while let Some(prev) = parent[at as usize] {
            path.push(prev);
            at = prev;
        }
        path.reverse();
        Ok(BotPlan {
            target_column: target,
            path: view.path_through(&path),
        })
    }
}

/// Strategy 4: head for the middle of the widest safe gap
#[derive(Debug, Clone, Copy, Default)]
pub struct Opportunist;

impl Opportunist {
    /// Start and length of the first longest run of safe columns
    pub fn widest_gap(view: &BotView<'_>) -> Option<(i32, i32)> {
        let mut best: Option<(i32, i32)> = None;
        let mut run: Option<(i32, i32)> = None;
        for column in 0..view.columns() {
            if view.is_safe(column) {
                run = Some(run.map_or((column, 1), |(start, len)| (start, len + 1)));
            } else if let Some(current) = run.take() {
                if best.is_none_or(|(_, len)| current.1 > len) {
                    best = Some(current);
                }
            }
        }
        if let Some(current) = run {
            if best.is_none_or(|(_, len)| current.1 > len) {
                best = Some(current);
            }
        }
        best
    }
}

impl BotStrategy for Opportunist {
    fn name(&self) -> &'static str {
        "opportunist"
    }

    fn plan(&self, view: &BotView<'_>) -> Result<BotPlan, BotError> {
        let (start, len) =
            Self::widest_gap(view).ok_or(BotError::NoSafeColumnFound { row: view.row })?;
        let target = start + len / 2;
        let path = breadth_first(view.column, view.columns(), |c| c == target)
            .ok_or(BotError::NoSafeColumnFound { row: view.row })?;
        Ok(BotPlan {
            target_column: target,
            path: view.path_through(&path),
        })
    }
}

/// Selectable autopilot, numbered 1 to 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BotAlgorithm {
    #[default]
    NearestSafe,
    Greedy,
    CenterHugger,
    Opportunist,
}

impl BotAlgorithm {
    pub const ALL: [BotAlgorithm; 4] = [
        BotAlgorithm::NearestSafe,
        BotAlgorithm::Greedy,
        BotAlgorithm::CenterHugger,
        BotAlgorithm::Opportunist,
    ];

    pub fn from_number(n: u8) -> Result<Self, CommandError> {
        match n {
            1..=4 => Ok(Self::ALL[(n - 1) as usize]),
            _ => Err(CommandError::InvalidAlgorithm(n)),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            BotAlgorithm::NearestSafe => 1,
            BotAlgorithm::Greedy => 2,
            BotAlgorithm::CenterHugger => 3,
            BotAlgorithm::Opportunist => 4,
        }
    }

    pub fn strategy(self) -> &'static dyn BotStrategy {
        match self {
            BotAlgorithm::NearestSafe => &NearestSafe,
            BotAlgorithm::Greedy => &Greedy,
            BotAlgorithm::CenterHugger => &CenterHugger,
            BotAlgorithm::Opportunist => &Opportunist,
        }
    }
}

/// Per-player autopilot state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BotController {
    pub active: bool,
    pub algorithm: BotAlgorithm,
    pub target_column: Option<i32>,
    pub path: Vec<IVec2>,
    /// Timestamp (ms) of the last think cycle
    pub last_think_ms: f64,
}

impl BotController {
    /// Recompute target and path
    pub fn think(&mut self, view: &BotView<'_>, now_ms: f64) {
        let plan = think(self.algorithm.strategy(), view);
        self.target_column = Some(plan.target_column);
        self.path = plan.path;
        self.last_think_ms = now_ms;
    }

    /// Column one step closer to the target
    pub fn step_from(&self, column: i32) -> i32 {
        match self.target_column {
            Some(target) if target > column => column + 1,
            Some(target) if target < column => column - 1,
            _ => column,
        }
    }
}
