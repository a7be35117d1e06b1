//! Score explanation.
//!
//! Breaks a score down into the individual constraint matches that
//! produce it, for reporting which trucks cause which penalty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    constraint_totals, pairs, CapacityGroups, CapacityScope, ConstraintConfig, ConstraintTotals,
};
use crate::models::{DockYardSolution, HardSoftScore};

/// Rule that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Planned trucks sharing timeslot and dock.
    DockConflict,
    /// Planned trucks sharing timeslot and name.
    TruckConflict,
    /// Capacity group loaded beyond its dock's capacity.
    CapacityOverload,
    /// Truck without a full placement.
    UnplannedTruck,
}

impl ConstraintType {
    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintType::DockConflict => "Dock conflict",
            ConstraintType::TruckConflict => "Truck conflict",
            ConstraintType::CapacityOverload => "Required capacity",
            ConstraintType::UnplannedTruck => "Unplanned truck",
        }
    }
}

/// One group of trucks penalized by one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintMatch {
    /// Rule that fired.
    pub constraint: ConstraintType,
    /// IDs of the trucks involved.
    pub truck_ids: Vec<u64>,
    /// Timeslot index, when the match is bound to one.
    pub timeslot: Option<usize>,
    /// Dock index, when the match is bound to one.
    pub dock: Option<usize>,
    /// Penalty contributed by this match.
    pub penalty: HardSoftScore,
    /// Human-readable description.
    pub message: String,
}

/// Score with its per-rule totals and matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAnalysis {
    /// Total score.
    pub score: HardSoftScore,
    /// Per-rule totals.
    pub totals: ConstraintTotals,
    /// Every match, grouped by rule in a fixed order.
    pub matches: Vec<ConstraintMatch>,
}

impl ScoreAnalysis {
    /// Matches produced by one rule.
    pub fn matches_of(&self, constraint: ConstraintType) -> impl Iterator<Item = &ConstraintMatch> {
        self.matches.iter().filter(move |m| m.constraint == constraint)
    }

    /// Sum of the penalties of one rule.
    pub fn penalty_of(&self, constraint: ConstraintType) -> HardSoftScore {
        self.matches_of(constraint).map(|m| m.penalty).sum()
    }

    /// Whether any hard rule fired.
    pub fn is_feasible(&self) -> bool {
        self.score.is_feasible()
    }
}

/// Planned trucks sharing one capacity group.
struct CapacityGroup {
    timeslot: Option<usize>,
    dock: usize,
    tally: i64,
    load: i64,
    truck_ids: Vec<u64>,
}

/// Explains the score of a solution.
///
/// Pair rules yield one match per crowded group with penalty equal to
/// the number of pairs in it; the capacity rule yields one match per
/// overloaded group of the configured [`CapacityScope`].
pub fn analyze(solution: &DockYardSolution, config: &ConstraintConfig) -> ScoreAnalysis {
    let trucks = solution.trucks();
    let docks = solution.docks();
    let mut matches = Vec::new();

    let mut by_cell: BTreeMap<(usize, usize), Vec<u64>> = BTreeMap::new();
    let mut by_name: BTreeMap<(usize, &str), Vec<u64>> = BTreeMap::new();
    let groups = CapacityGroups::new(solution, config.capacity_scope);
    let mut by_group: BTreeMap<usize, CapacityGroup> = BTreeMap::new();

    for (i, truck) in trucks.iter().enumerate() {
        let Some((slot, dock)) = truck.placement().cell() else {
            continue;
        };
        by_cell.entry((slot, dock)).or_default().push(truck.id);
        by_name
            .entry((slot, truck.name.as_str()))
            .or_default()
            .push(truck.id);
        let entry = by_group
            .entry(groups.key(i, (slot, dock)))
            .or_insert_with(|| CapacityGroup {
                timeslot: (config.capacity_scope == CapacityScope::PerTimeslot).then_some(slot),
                dock,
                tally: 0,
                load: 0,
                truck_ids: Vec::new(),
            });
        entry.tally += groups.weight(i);
        entry.load += truck.capacity;
        entry.truck_ids.push(truck.id);
    }

    for ((slot, dock), ids) in by_cell {
        let n = pairs(ids.len() as i64);
        if n > 0 {
            matches.push(ConstraintMatch {
                constraint: ConstraintType::DockConflict,
                message: format!(
                    "{} trucks share dock '{}' in timeslot #{slot}",
                    ids.len(),
                    docks[dock].name
                ),
                truck_ids: ids,
                timeslot: Some(slot),
                dock: Some(dock),
                penalty: HardSoftScore::of_hard(n),
            });
        }
    }

    for ((slot, name), ids) in by_name {
        let n = pairs(ids.len() as i64);
        if n > 0 {
            matches.push(ConstraintMatch {
                constraint: ConstraintType::TruckConflict,
                message: format!("{} trucks named '{name}' in timeslot #{slot}", ids.len()),
                truck_ids: ids,
                timeslot: Some(slot),
                dock: None,
                penalty: HardSoftScore::of_hard(n),
            });
        }
    }

    for (key, group) in by_group {
        let excess = groups.penalty(key, group.tally);
        if excess > 0 {
            let dock = &docks[group.dock];
            let message = match config.capacity_scope {
                CapacityScope::TruckFit => format!(
                    "{} truck(s) of capacity {} exceed dock '{}' capacity {}",
                    group.truck_ids.len(),
                    group.load / group.tally,
                    dock.name,
                    dock.capacity
                ),
                _ => format!(
                    "Dock '{}' loaded {} over capacity {}",
                    dock.name, group.load, dock.capacity
                ),
            };
            matches.push(ConstraintMatch {
                constraint: ConstraintType::CapacityOverload,
                message,
                truck_ids: group.truck_ids,
                timeslot: group.timeslot,
                dock: Some(group.dock),
                penalty: HardSoftScore::of_hard(excess),
            });
        }
    }

    if config.unplanned_weight != 0 {
        for truck in solution.unplanned_trucks() {
            matches.push(ConstraintMatch {
                constraint: ConstraintType::UnplannedTruck,
                truck_ids: vec![truck.id],
                timeslot: truck.timeslot(),
                dock: truck.dock(),
                penalty: HardSoftScore::of_soft(config.unplanned_weight),
                message: format!("Truck '{}' ({}) is unplanned", truck.name, truck.capacity),
            });
        }
    }

    let totals = constraint_totals(solution, config);
    ScoreAnalysis {
        score: totals.score(config),
        totals,
        matches,
    }
}
