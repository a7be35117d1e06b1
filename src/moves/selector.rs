//! Move catalog: enumeration and uniform sampling.
//!
//! Reassign values are numbered `0..=t·d` per truck: value 0 is the
//! unassigned placement, value `1 + s·d + k` is cell (timeslot `s`,
//! dock `k`). Numbering the whole neighborhood lets [`MoveSelector::sample`]
//! draw uniformly from it without materializing it.

use rand::Rng;

use super::DockYardMove;
use crate::models::{DockYardSolution, Placement};

/// Generates the reassign and swap neighborhoods of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSelector {
    trucks: usize,
    timeslots: usize,
    docks: usize,
    swaps: bool,
}

impl MoveSelector {
    /// Creates a selector for the solution's fact and entity counts.
    ///
    /// `swaps` enables the swap neighborhood.
    pub fn new(solution: &DockYardSolution, swaps: bool) -> Self {
        Self {
            trucks: solution.trucks().len(),
            timeslots: solution.timeslots().len(),
            docks: solution.docks().len(),
            swaps,
        }
    }

    /// Placement values available to one truck (cells + unassigned).
    #[inline]
    pub fn values_per_truck(&self) -> usize {
        self.timeslots * self.docks + 1
    }

    /// Placement numbered `value`.
    #[inline]
    pub fn placement_at(&self, value: usize) -> Placement {
        match value {
            0 => Placement::UNASSIGNED,
            v => Placement::at((v - 1) / self.docks, (v - 1) % self.docks),
        }
    }

    /// Every placement value in catalog order, unassigned first.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        (0..self.values_per_truck()).map(move |v| self.placement_at(v))
    }

    /// n·(t·d + 1).
    pub fn reassign_count(&self) -> u64 {
        self.trucks as u64 * self.values_per_truck() as u64
    }

    /// n·(n − 1)/2, or 0 when swaps are disabled.
    pub fn swap_count(&self) -> u64 {
        if !self.swaps {
            return 0;
        }
        let n = self.trucks as u64;
        n * n.saturating_sub(1) / 2
    }

    /// Total neighborhood size.
    pub fn size(&self) -> u64 {
        self.reassign_count() + self.swap_count()
    }

    /// Whether there is no move at all.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// All reassign moves, truck-major.
    pub fn reassign_moves(&self) -> impl Iterator<Item = DockYardMove> + '_ {
        (0..self.trucks).flat_map(move |truck| {
            self.placements()
                .map(move |to| DockYardMove::Reassign { truck, to })
        })
    }

    /// All swap moves with `left < right`.
    pub fn swap_moves(&self) -> impl Iterator<Item = DockYardMove> + '_ {
        let n = if self.swaps { self.trucks } else { 0 };
        (0..n).flat_map(move |left| {
            ((left + 1)..n).map(move |right| DockYardMove::Swap { left, right })
        })
    }

    /// The full neighborhood: reassign moves, then swap moves.
    pub fn iter(&self) -> impl Iterator<Item = DockYardMove> + '_ {
        self.reassign_moves().chain(self.swap_moves())
    }

    /// Draws one move uniformly from the full neighborhood.
    ///
    /// Returns `None` if the neighborhood is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<DockYardMove> {
        let total = self.size();
        if total == 0 {
            return None;
        }
        let k = rng.random_range(0..total);
        let reassign = self.reassign_count();
        if k < reassign {
            let per_truck = self.values_per_truck() as u64;
            return Some(DockYardMove::Reassign {
                truck: (k / per_truck) as usize,
                to: self.placement_at((k % per_truck) as usize),
            });
        }

        // Uniform over unordered pairs.
        let left = rng.random_range(0..self.trucks);
        let mut right = rng.random_range(0..self.trucks - 1);
        if right >= left {
            right += 1;
        }
        Some(DockYardMove::Swap {
            left: left.min(right),
            right: left.max(right),
        })
    }
}
