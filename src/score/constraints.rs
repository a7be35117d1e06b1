//! From-scratch constraint rules.
//!
//! Each rule is a pure function over a solution, O(n) in the number
//! of trucks. Unplanned trucks never contribute to a hard rule.

use std::collections::HashMap;

use super::{pairs, CapacityGroups, CapacityScope, ConstraintConfig, ConstraintTotals};
use crate::models::{DockYardSolution, HardSoftScore};

/// Planned trucks as (truck index, timeslot, dock).
fn planned_cells(solution: &DockYardSolution) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    solution
        .trucks()
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.placement().cell().map(|(s, d)| (i, s, d)))
}

/// Dock conflicts: pairs of planned trucks sharing timeslot and dock.
pub fn dock_conflicts(solution: &DockYardSolution) -> i64 {
    let mut counts: HashMap<(usize, usize), i64> = HashMap::new();
    for (_, slot, dock) in planned_cells(solution) {
        *counts.entry((slot, dock)).or_insert(0) += 1;
    }
    counts.values().map(|&n| pairs(n)).sum()
}

/// Truck conflicts: pairs of planned trucks sharing timeslot and name.
pub fn truck_conflicts(solution: &DockYardSolution) -> i64 {
    let trucks = solution.trucks();
    let mut counts: HashMap<(usize, &str), i64> = HashMap::new();
    for (i, slot, _) in planned_cells(solution) {
        *counts.entry((slot, trucks[i].name.as_str())).or_insert(0) += 1;
    }
    counts.values().map(|&n| pairs(n)).sum()
}

/// Capacity overload under `scope`.
///
/// Sum scopes penalize `load − capacity` per overloaded group.
/// [`CapacityScope::TruckFit`] penalizes `truck capacity − dock capacity`
/// once per distinct (dock, truck capacity) pair among planned trucks.
pub fn capacity_overload(solution: &DockYardSolution, scope: CapacityScope) -> i64 {
    let groups = CapacityGroups::new(solution, scope);
    let mut tallies = vec![0i64; groups.len()];

    for (i, slot, dock) in planned_cells(solution) {
        tallies[groups.key(i, (slot, dock))] += groups.weight(i);
    }

    tallies
        .iter()
        .enumerate()
        .map(|(group, &tally)| groups.penalty(group, tally))
        .sum()
}

/// Trucks without a full placement.
pub fn unplanned_count(solution: &DockYardSolution) -> i64 {
    solution.unplanned_trucks().count() as i64
}

/// All rule totals.
pub fn constraint_totals(solution: &DockYardSolution, config: &ConstraintConfig) -> ConstraintTotals {
    ConstraintTotals {
        dock_conflicts: dock_conflicts(solution),
        truck_conflicts: truck_conflicts(solution),
        capacity_overload: capacity_overload(solution, config.capacity_scope),
        unplanned: unplanned_count(solution),
    }
}

/// Full score recomputation.
pub fn calculate_score(solution: &DockYardSolution, config: &ConstraintConfig) -> HardSoftScore {
    constraint_totals(solution, config).score(config)
}
