//! Incremental score director.
//!
//! Owns the working solution and keeps three tallies in sync with it:
//! trucks per (timeslot, dock) cell, trucks per (timeslot, name) and
//! load per capacity group. Moving a truck touches at most one key of
//! each tally on the way out and one on the way in, so a move delta is
//! O(1) per changed truck.
//!
//! Deltas are computed against a small overlay on top of the tallies
//! and never mutate the director.

use std::collections::HashMap;

use super::{constraint_totals, CapacityGroups, ConstraintConfig, ConstraintTotals};
use crate::models::{DockYardSolution, HardSoftScore, Placement};
use crate::validation::ValidationError;

/// New placement for one truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementChange {
    /// Truck index in the solution.
    pub truck: usize,
    /// Placement the truck takes.
    pub placement: Placement,
}

impl PlacementChange {
    /// Creates a change.
    #[inline]
    pub fn new(truck: usize, placement: Placement) -> Self {
        Self { truck, placement }
    }
}

/// Immutable key layout derived from the problem facts.
#[derive(Debug, Clone)]
struct ScoreIndex {
    n_docks: usize,
    n_names: usize,
    /// Interned name per truck.
    name_ids: Vec<usize>,
    groups: CapacityGroups,
    config: ConstraintConfig,
}

impl ScoreIndex {
    fn new(solution: &DockYardSolution, config: &ConstraintConfig) -> Self {
        let mut names: HashMap<&str, usize> = HashMap::new();
        let name_ids = solution
            .trucks()
            .iter()
            .map(|t| {
                let next = names.len();
                *names.entry(t.name.as_str()).or_insert(next)
            })
            .collect();

        Self {
            n_docks: solution.docks().len(),
            n_names: names.len(),
            name_ids,
            groups: CapacityGroups::new(solution, config.capacity_scope),
            config: config.clone(),
        }
    }

    #[inline]
    fn dock_key(&self, (slot, dock): (usize, usize)) -> usize {
        slot * self.n_docks + dock
    }

    #[inline]
    fn name_key(&self, truck: usize, slot: usize) -> usize {
        slot * self.n_names + self.name_ids[truck]
    }
}

/// Mutable access to tally counters by key.
trait TallyStore {
    fn dock_cell(&mut self, key: usize) -> &mut i64;
    fn name_cell(&mut self, key: usize) -> &mut i64;
    fn load(&mut self, key: usize) -> &mut i64;
}

#[derive(Debug, Clone)]
struct Tallies {
    dock_cells: Vec<i64>,
    name_cells: Vec<i64>,
    loads: Vec<i64>,
}

impl TallyStore for Tallies {
    #[inline]
    fn dock_cell(&mut self, key: usize) -> &mut i64 {
        &mut self.dock_cells[key]
    }

    #[inline]
    fn name_cell(&mut self, key: usize) -> &mut i64 {
        &mut self.name_cells[key]
    }

    #[inline]
    fn load(&mut self, key: usize) -> &mut i64 {
        &mut self.loads[key]
    }
}

/// Copy-on-touch view over [`Tallies`] for delta evaluation.
struct Overlay<'a> {
    base: &'a Tallies,
    dock_cells: Vec<(usize, i64)>,
    name_cells: Vec<(usize, i64)>,
    loads: Vec<(usize, i64)>,
}

impl<'a> Overlay<'a> {
    fn new(base: &'a Tallies) -> Self {
        Self {
            base,
            dock_cells: Vec::with_capacity(4),
            name_cells: Vec::with_capacity(4),
            loads: Vec::with_capacity(4),
        }
    }
}

fn touched(entries: &mut Vec<(usize, i64)>, key: usize, base: i64) -> &mut i64 {
    let pos = match entries.iter().position(|&(k, _)| k == key) {
        Some(pos) => pos,
        None => {
            entries.push((key, base));
            entries.len() - 1
        }
    };
    &mut entries[pos].1
}

impl TallyStore for Overlay<'_> {
    fn dock_cell(&mut self, key: usize) -> &mut i64 {
        touched(&mut self.dock_cells, key, self.base.dock_cells[key])
    }

    fn name_cell(&mut self, key: usize) -> &mut i64 {
        touched(&mut self.name_cells, key, self.base.name_cells[key])
    }

    fn load(&mut self, key: usize) -> &mut i64 {
        touched(&mut self.loads, key, self.base.loads[key])
    }
}

/// Adds a truck to a cell, returning the totals delta.
fn insert<S: TallyStore>(
    index: &ScoreIndex,
    store: &mut S,
    truck: usize,
    cell: (usize, usize),
) -> ConstraintTotals {
    let mut delta = ConstraintTotals::default();

    let count = store.dock_cell(index.dock_key(cell));
    delta.dock_conflicts += *count;
    *count += 1;

    let count = store.name_cell(index.name_key(truck, cell.0));
    delta.truck_conflicts += *count;
    *count += 1;

    let group = index.groups.key(truck, cell);
    let load = store.load(group);
    let before = index.groups.penalty(group, *load);
    *load += index.groups.weight(truck);
    delta.capacity_overload += index.groups.penalty(group, *load) - before;

    delta.unplanned -= 1;
    delta
}

/// Removes a truck from a cell, returning the totals delta.
fn retract<S: TallyStore>(
    index: &ScoreIndex,
    store: &mut S,
    truck: usize,
    cell: (usize, usize),
) -> ConstraintTotals {
    let mut delta = ConstraintTotals::default();

    let count = store.dock_cell(index.dock_key(cell));
    *count -= 1;
    delta.dock_conflicts -= *count;

    let count = store.name_cell(index.name_key(truck, cell.0));
    *count -= 1;
    delta.truck_conflicts -= *count;

    let group = index.groups.key(truck, cell);
    let load = store.load(group);
    let before = index.groups.penalty(group, *load);
    *load -= index.groups.weight(truck);
    delta.capacity_overload += index.groups.penalty(group, *load) - before;

    delta.unplanned += 1;
    delta
}

fn move_truck<S: TallyStore>(
    index: &ScoreIndex,
    store: &mut S,
    truck: usize,
    from: Placement,
    to: Placement,
) -> ConstraintTotals {
    let mut delta = ConstraintTotals::default();
    if let Some(cell) = from.cell() {
        delta += retract(index, store, truck, cell);
    }
    if let Some(cell) = to.cell() {
        delta += insert(index, store, truck, cell);
    }
    delta
}

/// Incremental score calculator owning the working solution.
///
/// All placement changes during solving go through
/// [`apply_changes`](Self::apply_changes) so that the tallies never
/// drift from the solution.
///
/// # Example
/// ```
/// use u_dockyard::models::{Dock, DockYardSolution, HardSoftScore, Placement, Timeslot, Truck};
/// use u_dockyard::score::{ConstraintConfig, PlacementChange, ScoreDirector};
///
/// let solution = DockYardSolution::new(
///     vec![Timeslot::from_hm((8, 0), (9, 0)).unwrap()],
///     vec![Dock::new("A", 40).unwrap()],
///     vec![Truck::new(0, "T10", 10)],
/// ).unwrap();
/// let mut director = ScoreDirector::new(solution, ConstraintConfig::default()).unwrap();
/// assert_eq!(director.score(), HardSoftScore::new(0, 1));
///
/// let change = [PlacementChange::new(0, Placement::at(0, 0))];
/// assert_eq!(director.delta(&change), HardSoftScore::new(0, -1));
/// director.apply_changes(&change);
/// assert_eq!(director.score(), HardSoftScore::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct ScoreDirector {
    solution: DockYardSolution,
    index: ScoreIndex,
    tallies: Tallies,
    totals: ConstraintTotals,
}

impl ScoreDirector {
    /// Builds the tallies for a solution.
    ///
    /// # Errors
    /// Returns the validation issues of a malformed solution.
    pub fn new(
        solution: DockYardSolution,
        config: ConstraintConfig,
    ) -> Result<Self, Vec<ValidationError>> {
        solution.validate()?;

        let index = ScoreIndex::new(&solution, &config);
        let n_slots = solution.timeslots().len();
        let mut tallies = Tallies {
            dock_cells: vec![0; n_slots * index.n_docks],
            name_cells: vec![0; n_slots * index.n_names],
            loads: vec![0; index.groups.len()],
        };
        let mut totals = ConstraintTotals {
            unplanned: solution.trucks().len() as i64,
            ..ConstraintTotals::default()
        };
        for (truck, t) in solution.trucks().iter().enumerate() {
            if let Some(cell) = t.placement().cell() {
                totals += insert(&index, &mut tallies, truck, cell);
            }
        }

        Ok(Self {
            solution,
            index,
            tallies,
            totals,
        })
    }

    /// The working solution.
    #[inline]
    pub fn solution(&self) -> &DockYardSolution {
        &self.solution
    }

    /// Constraint parameters in use.
    #[inline]
    pub fn config(&self) -> &ConstraintConfig {
        &self.index.config
    }

    /// Current per-rule totals.
    #[inline]
    pub fn totals(&self) -> ConstraintTotals {
        self.totals
    }

    /// Current score.
    #[inline]
    pub fn score(&self) -> HardSoftScore {
        self.totals.score(&self.index.config)
    }

    /// Whether `change` names a truck of the solution and a placement
    /// inside its timeslot and dock ranges.
    pub fn is_valid_change(&self, change: &PlacementChange) -> bool {
        let in_range = |index: Option<usize>, len: usize| index.map_or(true, |i| i < len);
        change.truck < self.solution.trucks().len()
            && in_range(change.placement.timeslot, self.solution.timeslots().len())
            && in_range(change.placement.dock, self.solution.docks().len())
    }

    /// Score change the given changes would cause, without applying them.
    ///
    /// Each truck may appear at most once in `changes`.
    ///
    /// # Panics
    /// If a change fails [`is_valid_change`](Self::is_valid_change).
    pub fn delta(&self, changes: &[PlacementChange]) -> HardSoftScore {
        self.check_changes(changes);
        let mut overlay = Overlay::new(&self.tallies);
        let mut delta = ConstraintTotals::default();
        for change in changes {
            let from = self.solution.trucks()[change.truck].placement();
            delta += move_truck(&self.index, &mut overlay, change.truck, from, change.placement);
        }
        delta.score(&self.index.config)
    }

    /// Commits placement changes and updates the tallies.
    ///
    /// # Panics
    /// If a change fails [`is_valid_change`](Self::is_valid_change). The
    /// check runs before anything is committed.
    pub fn apply_changes(&mut self, changes: &[PlacementChange]) {
        self.check_changes(changes);
        for change in changes {
            let truck = self.solution.truck_mut(change.truck);
            let from = truck.placement();
            truck.set_placement(change.placement);
            self.totals += move_truck(
                &self.index,
                &mut self.tallies,
                change.truck,
                from,
                change.placement,
            );
        }
    }

    fn check_changes(&self, changes: &[PlacementChange]) {
        for change in changes {
            assert!(
                self.is_valid_change(change),
                "placement change {change:?} is out of range for {} trucks, {} timeslots, {} docks",
                self.solution.trucks().len(),
                self.solution.timeslots().len(),
                self.solution.docks().len(),
            );
        }
    }

    /// Recomputes the score from scratch (ignores the tallies).
    pub fn recompute(&self) -> HardSoftScore {
        constraint_totals(&self.solution, &self.index.config).score(&self.index.config)
    }

    /// Whether the incremental totals match a from-scratch recount.
    pub fn is_consistent(&self) -> bool {
        constraint_totals(&self.solution, &self.index.config) == self.totals
    }

    /// Clone of the working solution with its score set.
    pub fn snapshot(&self) -> DockYardSolution {
        let mut snapshot = self.solution.clone();
        snapshot.set_score(Some(self.score()));
        snapshot
    }

    /// Releases the working solution with its score set.
    pub fn into_solution(self) -> DockYardSolution {
        let score = self.score();
        let mut solution = self.solution;
        solution.set_score(Some(score));
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dock, Timeslot, Truck};
    use crate::score::{capacity_overload, dock_conflicts, CapacityScope};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_problem<R: Rng>(rng: &mut R, slots: usize, docks: usize, trucks: usize) -> DockYardSolution {
        let timeslots = (0..slots)
            .map(|i| Timeslot::new(i as i64 * 1000, (i as i64 + 1) * 1000).unwrap())
            .collect();
        let docks = (0..docks)
            .map(|i| Dock::new(format!("D{i}"), rng.random_range(0..30)).unwrap())
            .collect();
        // Few distinct names so truck conflicts occur.
        let trucks = (0..trucks)
            .map(|i| Truck::new(i as u64, format!("N{}", rng.random_range(0..4)), rng.random_range(1..20)))
            .collect();
        DockYardSolution::new(timeslots, docks, trucks).unwrap()
    }

    fn random_placement<R: Rng>(rng: &mut R, slots: usize, docks: usize) -> Placement {
        match rng.random_range(0..8) {
            0 => Placement::UNASSIGNED,
            1 => Placement {
                timeslot: Some(rng.random_range(0..slots)),
                dock: None,
            },
            _ => Placement::at(rng.random_range(0..slots), rng.random_range(0..docks)),
        }
    }

    /// O(n²) recount of dock-conflict pairs.
    fn brute_force_dock_conflicts(s: &DockYardSolution) -> i64 {
        let t = s.trucks();
        let mut n = 0;
        for i in 0..t.len() {
            for j in (i + 1)..t.len() {
                if let (Some(a), Some(b)) = (t[i].placement().cell(), t[j].placement().cell()) {
                    if a == b {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Per-dock overload recount, independent of the group machinery.
    fn brute_force_dock_overload(s: &DockYardSolution) -> i64 {
        s.docks()
            .iter()
            .enumerate()
            .map(|(d, dock)| {
                let load: i64 = s
                    .planned_trucks()
                    .filter(|t| t.dock() == Some(d))
                    .map(|t| t.capacity)
                    .sum();
                (load - dock.capacity).max(0)
            })
            .sum()
    }

    #[test]
    fn test_initial_tallies_match_recompute() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut s = random_problem(&mut rng, 3, 3, 12);
        s.clear_assignments();
        let seeded: Vec<Truck> = s
            .trucks()
            .iter()
            .cloned()
            .map(|t| t.with_placement(random_placement(&mut rng, 3, 3)))
            .collect();
        let s = DockYardSolution::new(s.timeslots().to_vec(), s.docks().to_vec(), seeded).unwrap();

        let director = ScoreDirector::new(s, ConstraintConfig::default()).unwrap();
        assert!(director.is_consistent());
        assert_eq!(director.score(), director.recompute());
    }

    #[test]
    fn test_incremental_matches_brute_force_after_random_mutations() {
        let mut rng = SmallRng::seed_from_u64(42);
        let s = random_problem(&mut rng, 3, 4, 20);
        let mut director = ScoreDirector::new(s, ConstraintConfig::default()).unwrap();

        for _ in 0..2000 {
            let truck = rng.random_range(0..20);
            let placement = random_placement(&mut rng, 3, 4);
            director.apply_changes(&[PlacementChange::new(truck, placement)]);

            let totals = director.totals();
            let sol = director.solution();
            assert_eq!(totals.dock_conflicts, brute_force_dock_conflicts(sol));
            assert_eq!(totals.dock_conflicts, dock_conflicts(sol));
            assert_eq!(totals.capacity_overload, brute_force_dock_overload(sol));
            assert_eq!(
                totals.capacity_overload,
                capacity_overload(sol, CapacityScope::PerDock)
            );
            assert!(director.is_consistent());
        }
    }

    #[test]
    fn test_delta_matches_full_recompute() {
        // 10,000+ sampled changes across varied sizes and every scope.
        let mut rng = SmallRng::seed_from_u64(2024);
        let sizes = [(1, 1, 2), (2, 3, 5), (3, 3, 11), (4, 2, 16), (5, 5, 30)];
        let scopes = [
            CapacityScope::PerDock,
            CapacityScope::PerTimeslot,
            CapacityScope::TruckFit,
        ];
        let mut checked = 0;

        for &(slots, docks, trucks) in &sizes {
            for &scope in &scopes {
                let s = random_problem(&mut rng, slots, docks, trucks);
                let config = ConstraintConfig::default().with_capacity_scope(scope);
                let mut director = ScoreDirector::new(s, config).unwrap();

                for _ in 0..1100 {
                    let a = rng.random_range(0..trucks);
                    let mut changes = vec![PlacementChange::new(a, random_placement(&mut rng, slots, docks))];
                    if trucks > 1 && rng.random_bool(0.5) {
                        let mut b = rng.random_range(0..trucks - 1);
                        if b >= a {
                            b += 1;
                        }
                        changes.push(PlacementChange::new(b, random_placement(&mut rng, slots, docks)));
                    }

                    let before = director.recompute();
                    let delta = director.delta(&changes);
                    director.apply_changes(&changes);
                    let after = director.recompute();

                    assert_eq!(delta, after - before);
                    assert_eq!(director.score(), after);
                    checked += 1;
                }
            }
        }
        assert!(checked >= 10_000);
    }

    #[test]
    fn test_delta_does_not_mutate() {
        let mut rng = SmallRng::seed_from_u64(1);
        let s = random_problem(&mut rng, 2, 2, 6);
        let director = ScoreDirector::new(s, ConstraintConfig::default()).unwrap();
        let before = director.solution().clone();
        let score = director.score();

        let _ = director.delta(&[PlacementChange::new(0, Placement::at(1, 1))]);
        assert_eq!(director.solution(), &before);
        assert_eq!(director.score(), score);
    }

    fn one_slot_director() -> ScoreDirector {
        let s = DockYardSolution::new(
            vec![Timeslot::new(0, 10).unwrap()],
            vec![Dock::new("A", 5).unwrap()],
            vec![Truck::new(0, "T", 4)],
        )
        .unwrap();
        ScoreDirector::new(s, ConstraintConfig::default()).unwrap()
    }

    #[test]
    fn test_is_valid_change() {
        let director = one_slot_director();
        assert!(director.is_valid_change(&PlacementChange::new(0, Placement::at(0, 0))));
        assert!(director.is_valid_change(&PlacementChange::new(0, Placement::UNASSIGNED)));
        assert!(!director.is_valid_change(&PlacementChange::new(0, Placement::at(3, 0))));
        assert!(!director.is_valid_change(&PlacementChange::new(0, Placement::at(0, 1))));
        assert!(!director.is_valid_change(&PlacementChange::new(1, Placement::at(0, 0))));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_apply_changes_rejects_out_of_range_timeslot() {
        let mut director = one_slot_director();
        director.apply_changes(&[PlacementChange::new(0, Placement::at(3, 0))]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_delta_rejects_out_of_range_dock() {
        let director = one_slot_director();
        let _ = director.delta(&[PlacementChange::new(0, Placement::at(0, 2))]);
    }

    #[test]
    fn test_rejected_change_leaves_director_untouched() {
        let mut director = one_slot_director();
        let changes = [
            PlacementChange::new(0, Placement::at(0, 0)),
            PlacementChange::new(0, Placement::at(3, 0)),
        ];
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            director.apply_changes(&changes);
        }));
        assert!(outcome.is_err());
        assert!(!director.solution().trucks()[0].is_planned());
        assert!(director.is_consistent());
    }

    #[test]
    fn test_snapshot_and_into_solution_carry_score() {
        let s = DockYardSolution::new(
            vec![Timeslot::new(0, 10).unwrap()],
            vec![Dock::new("A", 5).unwrap()],
            vec![Truck::new(0, "T", 8).with_placement(Placement::at(0, 0))],
        )
        .unwrap();
        let director = ScoreDirector::new(s, ConstraintConfig::default()).unwrap();
        assert_eq!(director.snapshot().score(), Some(HardSoftScore::of_hard(3)));
        assert_eq!(
            director.into_solution().score(),
            Some(HardSoftScore::of_hard(3))
        );
    }
}
