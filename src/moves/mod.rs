//! Moves: atomic, reversible perturbations of a solution.
//!
//! | Move | Effect | Neighborhood size |
//! |------|--------|-------------------|
//! | `Reassign` | one truck takes a new placement (or none) | n·(t·d + 1) |
//! | `Swap` | two trucks exchange placements verbatim | n·(n − 1)/2 |
//!
//! Every move can report its score delta before it is applied, and
//! returns an [`UndoToken`] when applied so it can be reverted exactly.
//!
//! # Reference
//! Hoos & Stützle (2004), "Stochastic Local Search", Ch. 1.5 (neighbourhoods)

mod selector;

pub use selector::MoveSelector;

use std::fmt;
use std::ops::Deref;

use crate::models::{DockYardSolution, HardSoftScore, Placement};
use crate::score::{PlacementChange, ScoreDirector};

/// A local move over truck placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockYardMove {
    /// Gives one truck a new placement.
    Reassign {
        /// Truck index.
        truck: usize,
        /// Placement to take.
        to: Placement,
    },
    /// Exchanges the placements of two distinct trucks.
    Swap {
        /// First truck index.
        left: usize,
        /// Second truck index.
        right: usize,
    },
}

/// Up to two placement changes, stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveChanges {
    items: [PlacementChange; 2],
    len: usize,
}

impl MoveChanges {
    fn one(change: PlacementChange) -> Self {
        Self {
            items: [change, change],
            len: 1,
        }
    }

    fn two(first: PlacementChange, second: PlacementChange) -> Self {
        Self {
            items: [first, second],
            len: 2,
        }
    }
}

impl Deref for MoveChanges {
    type Target = [PlacementChange];

    fn deref(&self) -> &[PlacementChange] {
        &self.items[..self.len]
    }
}

/// Placements to restore when undoing a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an applied move can only be reverted with its undo token"]
pub struct UndoToken {
    restore: MoveChanges,
}

impl DockYardMove {
    /// Creates a reassign move.
    pub fn reassign(truck: usize, to: Placement) -> Self {
        Self::Reassign { truck, to }
    }

    /// Creates a swap move.
    pub fn swap(left: usize, right: usize) -> Self {
        Self::Swap { left, right }
    }

    /// Whether applying the move would change anything.
    ///
    /// Reassigning a truck to its current placement and swapping two
    /// trucks with equal placements are no-ops.
    pub fn is_doable(&self, solution: &DockYardSolution) -> bool {
        let trucks = solution.trucks();
        match *self {
            DockYardMove::Reassign { truck, to } => trucks[truck].placement() != to,
            DockYardMove::Swap { left, right } => {
                left != right && trucks[left].placement() != trucks[right].placement()
            }
        }
    }

    /// Placement changes this move makes on the given solution.
    pub fn changes(&self, solution: &DockYardSolution) -> MoveChanges {
        let trucks = solution.trucks();
        match *self {
            DockYardMove::Reassign { truck, to } => MoveChanges::one(PlacementChange::new(truck, to)),
            DockYardMove::Swap { left, right } => MoveChanges::two(
                PlacementChange::new(left, trucks[right].placement()),
                PlacementChange::new(right, trucks[left].placement()),
            ),
        }
    }

    /// Score change the move would cause, without applying it.
    ///
    /// # Panics
    /// If the move names a truck, timeslot or dock outside the
    /// director's solution. [`MoveSelector`] only yields moves inside it.
    pub fn delta(&self, director: &ScoreDirector) -> HardSoftScore {
        director.delta(&self.changes(director.solution()))
    }

    /// Applies the move.
    ///
    /// # Panics
    /// Same as [`delta`](Self::delta); nothing is committed when it does.
    pub fn apply(&self, director: &mut ScoreDirector) -> UndoToken {
        let changes = self.changes(director.solution());
        let trucks = director.solution().trucks();
        let mut restore = changes;
        for item in &mut restore.items[..restore.len] {
            item.placement = trucks[item.truck].placement();
        }
        director.apply_changes(&changes);
        UndoToken { restore }
    }

    /// Reverts a previously applied move.
    pub fn undo(director: &mut ScoreDirector, token: UndoToken) {
        director.apply_changes(&token.restore);
    }
}

impl fmt::Display for DockYardMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |i| i.to_string());
        match self {
            DockYardMove::Reassign { truck, to } => write!(
                f,
                "#{truck} -> ({}, {})",
                side(to.timeslot),
                side(to.dock)
            ),
            DockYardMove::Swap { left, right } => write!(f, "#{left} <-> #{right}"),
        }
    }
}
