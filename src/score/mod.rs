//! Constraint evaluation.
//!
//! Scores a [`DockYardSolution`](crate::models::DockYardSolution) against
//! three hard rules and one soft rule:
//!
//! | Rule | Level | Penalty |
//! |------|-------|---------|
//! | Dock conflict | hard | 1 per pair of planned trucks sharing timeslot and dock |
//! | Truck conflict | hard | 1 per pair of planned trucks sharing timeslot and name |
//! | Capacity overload | hard | excess over dock capacity per overloaded [`CapacityScope`] group |
//! | Unplanned truck | soft | `unplanned_weight` per truck missing timeslot or dock |
//!
//! Two evaluation paths exist and must always agree:
//! - [`calculate_score`]: from-scratch recomputation, one pure function per rule.
//! - [`ScoreDirector`]: incremental tallies with O(k) move deltas.
//!
//! # Reference
//! Hoos & Stützle (2004), "Stochastic Local Search", Ch. 1.5 (incremental evaluation)

mod analysis;
mod constraints;
mod director;

pub use analysis::{analyze, ConstraintMatch, ConstraintType, ScoreAnalysis};
pub use constraints::{
    calculate_score, capacity_overload, constraint_totals, dock_conflicts, truck_conflicts,
    unplanned_count,
};
pub use director::{PlacementChange, ScoreDirector};

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

use crate::models::{DockYardSolution, HardSoftScore};

/// Grouping the capacity rule penalizes over.
///
/// `PerDock` and `PerTimeslot` sum truck capacities per group and
/// penalize the load above the dock capacity. `TruckFit` checks each
/// truck against its dock on its own: every distinct (dock, truck
/// capacity) pair among planned trucks whose capacity exceeds the dock
/// is penalized once by the excess, however many trucks share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityScope {
    /// One group per dock, summed across every timeslot.
    #[default]
    PerDock,
    /// One group per (timeslot, dock) cell.
    PerTimeslot,
    /// One group per (dock, distinct truck capacity), timeslots ignored.
    TruckFit,
}

/// Capacity-group layout of one problem instance.
///
/// Each planned truck adds [`weight`](Self::weight) to the tally of its
/// [`key`](Self::key) group; [`penalty`](Self::penalty) turns a tally
/// into the hard penalty of that group.
#[derive(Debug, Clone)]
pub(crate) struct CapacityGroups {
    scope: CapacityScope,
    n_docks: usize,
    n_capacities: usize,
    /// Interned capacity index per truck (`TruckFit` only).
    capacity_ids: Vec<usize>,
    /// Tally contribution per truck.
    weights: Vec<i64>,
    /// Per group: dock capacity, or the fixed excess under `TruckFit`.
    limits: Vec<i64>,
}

impl CapacityGroups {
    pub(crate) fn new(solution: &DockYardSolution, scope: CapacityScope) -> Self {
        let docks = solution.docks();
        let trucks = solution.trucks();
        let n_docks = docks.len();

        let mut distinct: Vec<i64> = trucks.iter().map(|t| t.capacity).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let (capacity_ids, weights, limits) = match scope {
            CapacityScope::PerDock => (
                Vec::new(),
                trucks.iter().map(|t| t.capacity).collect(),
                docks.iter().map(|d| d.capacity).collect(),
            ),
            CapacityScope::PerTimeslot => (
                Vec::new(),
                trucks.iter().map(|t| t.capacity).collect(),
                (0..solution.timeslots().len())
                    .flat_map(|_| docks.iter().map(|d| d.capacity))
                    .collect(),
            ),
            CapacityScope::TruckFit => (
                trucks
                    .iter()
                    .map(|t| distinct.binary_search(&t.capacity).unwrap_or_else(|i| i))
                    .collect(),
                vec![1; trucks.len()],
                docks
                    .iter()
                    .flat_map(|d| distinct.iter().map(move |&c| overload(c, d.capacity)))
                    .collect(),
            ),
        };

        Self {
            scope,
            n_docks,
            n_capacities: distinct.len(),
            capacity_ids,
            weights,
            limits,
        }
    }

    /// Number of groups.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.limits.len()
    }

    /// Group of truck `truck` placed in cell `(timeslot, dock)`.
    #[inline]
    pub(crate) fn key(&self, truck: usize, (timeslot, dock): (usize, usize)) -> usize {
        match self.scope {
            CapacityScope::PerDock => dock,
            CapacityScope::PerTimeslot => timeslot * self.n_docks + dock,
            CapacityScope::TruckFit => dock * self.n_capacities + self.capacity_ids[truck],
        }
    }

    /// Tally contribution of truck `truck`.
    #[inline]
    pub(crate) fn weight(&self, truck: usize) -> i64 {
        self.weights[truck]
    }

    /// Hard penalty of group `group` at tally `tally`.
    #[inline]
    pub(crate) fn penalty(&self, group: usize, tally: i64) -> i64 {
        match self.scope {
            CapacityScope::TruckFit if tally > 0 => self.limits[group],
            CapacityScope::TruckFit => 0,
            _ => overload(tally, self.limits[group]),
        }
    }
}

/// Constraint parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Grouping of the capacity rule.
    pub capacity_scope: CapacityScope,
    /// Soft penalty per unplanned truck (0 disables the rule).
    pub unplanned_weight: i64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            capacity_scope: CapacityScope::PerDock,
            unplanned_weight: 1,
        }
    }
}

impl ConstraintConfig {
    /// Sets the capacity scope.
    pub fn with_capacity_scope(mut self, scope: CapacityScope) -> Self {
        self.capacity_scope = scope;
        self
    }

    /// Sets the unplanned-truck weight.
    pub fn with_unplanned_weight(mut self, weight: i64) -> Self {
        self.unplanned_weight = weight;
        self
    }
}

/// Raw per-rule totals, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintTotals {
    /// Pairs of planned trucks sharing timeslot and dock.
    pub dock_conflicts: i64,
    /// Pairs of planned trucks sharing timeslot and name.
    pub truck_conflicts: i64,
    /// Summed capacity excess over all groups.
    pub capacity_overload: i64,
    /// Trucks without a full placement.
    pub unplanned: i64,
}

impl ConstraintTotals {
    /// Sum of the hard rules.
    #[inline]
    pub fn hard(&self) -> i64 {
        self.dock_conflicts + self.truck_conflicts + self.capacity_overload
    }

    /// Weighted score.
    #[inline]
    pub fn score(&self, config: &ConstraintConfig) -> HardSoftScore {
        HardSoftScore::new(self.hard(), self.unplanned * config.unplanned_weight)
    }
}

impl Add for ConstraintTotals {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ConstraintTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.dock_conflicts += rhs.dock_conflicts;
        self.truck_conflicts += rhs.truck_conflicts;
        self.capacity_overload += rhs.capacity_overload;
        self.unplanned += rhs.unplanned;
    }
}

impl Sub for ConstraintTotals {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            dock_conflicts: self.dock_conflicts - rhs.dock_conflicts,
            truck_conflicts: self.truck_conflicts - rhs.truck_conflicts,
            capacity_overload: self.capacity_overload - rhs.capacity_overload,
            unplanned: self.unplanned - rhs.unplanned,
        }
    }
}

/// Capacity excess of a load over a limit.
#[inline]
pub(crate) fn overload(load: i64, limit: i64) -> i64 {
    (load - limit).max(0)
}

/// Unordered pairs among `n` items.
#[inline]
pub(crate) fn pairs(n: i64) -> i64 {
    n * (n - 1) / 2
}
