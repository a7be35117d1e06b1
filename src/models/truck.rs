//! Truck model.
//!
//! A truck is the planning entity: a unit of work with a capacity
//! requirement whose timeslot and dock are chosen by the solver.
//!
//! # Planning Variables
//! `timeslot` and `dock` are indices into the owning solution's
//! fact lists. Either may be unset; a truck is *planned* only when
//! both are set.

use serde::{Deserialize, Serialize};

/// A truck waiting to be served at a dock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    /// Unique truck identifier.
    pub id: u64,
    /// Human-readable name (e.g. licence plate). Not required to be unique.
    pub name: String,
    /// Capacity units this truck needs at its dock.
    pub capacity: i64,
    /// Assigned timeslot index (planning variable).
    timeslot: Option<usize>,
    /// Assigned dock index (planning variable).
    dock: Option<usize>,
}

/// The (timeslot, dock) pair held by a truck.
///
/// Both sides are optional so that partially seeded trucks can be
/// represented and swapped verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Placement {
    /// Timeslot index.
    pub timeslot: Option<usize>,
    /// Dock index.
    pub dock: Option<usize>,
}

impl Placement {
    /// No timeslot, no dock.
    pub const UNASSIGNED: Placement = Placement {
        timeslot: None,
        dock: None,
    };

    /// A fully assigned placement.
    #[inline]
    pub const fn at(timeslot: usize, dock: usize) -> Self {
        Self {
            timeslot: Some(timeslot),
            dock: Some(dock),
        }
    }

    /// The (timeslot, dock) cell, if both sides are set.
    #[inline]
    pub fn cell(&self) -> Option<(usize, usize)> {
        self.timeslot.zip(self.dock)
    }

    /// Whether both sides are set.
    #[inline]
    pub fn is_planned(&self) -> bool {
        self.cell().is_some()
    }
}

impl Truck {
    /// Creates a new, unassigned truck.
    pub fn new(id: u64, name: impl Into<String>, capacity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            timeslot: None,
            dock: None,
        }
    }

    /// Seeds the truck with an initial placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.set_placement(placement);
        self
    }

    /// Assigned timeslot index.
    #[inline]
    pub fn timeslot(&self) -> Option<usize> {
        self.timeslot
    }

    /// Assigned dock index.
    #[inline]
    pub fn dock(&self) -> Option<usize> {
        self.dock
    }

    /// Sets the timeslot variable.
    #[inline]
    pub fn set_timeslot(&mut self, timeslot: Option<usize>) {
        self.timeslot = timeslot;
    }

    /// Sets the dock variable.
    #[inline]
    pub fn set_dock(&mut self, dock: Option<usize>) {
        self.dock = dock;
    }

    /// Current placement.
    #[inline]
    pub fn placement(&self) -> Placement {
        Placement {
            timeslot: self.timeslot,
            dock: self.dock,
        }
    }

    /// Replaces both planning variables.
    #[inline]
    pub fn set_placement(&mut self, placement: Placement) {
        self.timeslot = placement.timeslot;
        self.dock = placement.dock;
    }

    /// Whether both timeslot and dock are assigned.
    #[inline]
    pub fn is_planned(&self) -> bool {
        self.placement().is_planned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truck_starts_unassigned() {
        let truck = Truck::new(7, "T10", 10);
        assert_eq!(truck.id, 7);
        assert_eq!(truck.name, "T10");
        assert_eq!(truck.capacity, 10);
        assert_eq!(truck.placement(), Placement::UNASSIGNED);
        assert!(!truck.is_planned());
    }

    #[test]
    fn test_truck_partial_assignment_is_not_planned() {
        let mut truck = Truck::new(0, "T", 1);
        truck.set_timeslot(Some(2));
        assert_eq!(truck.timeslot(), Some(2));
        assert!(!truck.is_planned());
        truck.set_dock(Some(0));
        assert!(truck.is_planned());
        assert_eq!(truck.placement().cell(), Some((2, 0)));
    }

    #[test]
    fn test_truck_with_placement() {
        let truck = Truck::new(1, "T", 5).with_placement(Placement::at(1, 2));
        assert_eq!(truck.timeslot(), Some(1));
        assert_eq!(truck.dock(), Some(2));

        let mut cleared = truck.clone();
        cleared.set_placement(Placement::UNASSIGNED);
        assert_eq!(cleared.timeslot(), None);
        assert_eq!(cleared.dock(), None);
    }
}
