//! Dock-yard planning solution.
//!
//! Aggregates the problem facts (timeslots, docks), the planning
//! entities (trucks) and the current score. The fact lists and the
//! truck list are fixed at construction; only each truck's
//! placement changes afterwards. Deserialization runs the same
//! validation as [`DockYardSolution::new`].

use serde::{de, Deserialize, Deserializer, Serialize};

use super::{Dock, HardSoftScore, Placement, Timeslot, Truck};
use crate::validation::{validate_input, ValidationError};

/// A (possibly partial) assignment of trucks to timeslots and docks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockYardSolution {
    timeslots: Vec<Timeslot>,
    docks: Vec<Dock>,
    trucks: Vec<Truck>,
    score: Option<HardSoftScore>,
}

/// Wire form of [`DockYardSolution`] before validation.
#[derive(Deserialize)]
struct RawSolution {
    timeslots: Vec<Timeslot>,
    docks: Vec<Dock>,
    trucks: Vec<Truck>,
    #[serde(default)]
    score: Option<HardSoftScore>,
}

impl<'de> Deserialize<'de> for DockYardSolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSolution::deserialize(deserializer)?;
        let mut solution = Self::new(raw.timeslots, raw.docks, raw.trucks).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            <D::Error as de::Error>::custom(format!("invalid problem: {}", messages.join("; ")))
        })?;
        solution.score = raw.score;
        Ok(solution)
    }
}

impl DockYardSolution {
    /// Creates a solution after validating the input.
    ///
    /// # Errors
    /// Returns every validation issue found (see [`validate_input`]).
    pub fn new(
        timeslots: Vec<Timeslot>,
        docks: Vec<Dock>,
        trucks: Vec<Truck>,
    ) -> Result<Self, Vec<ValidationError>> {
        validate_input(&timeslots, &docks, &trucks)?;
        Ok(Self {
            timeslots,
            docks,
            trucks,
            score: None,
        })
    }

    /// Re-runs input validation.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_input(&self.timeslots, &self.docks, &self.trucks)
    }

    /// All timeslots.
    #[inline]
    pub fn timeslots(&self) -> &[Timeslot] {
        &self.timeslots
    }

    /// All docks.
    #[inline]
    pub fn docks(&self) -> &[Dock] {
        &self.docks
    }

    /// All trucks.
    #[inline]
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// Mutable truck access for move application.
    #[inline]
    pub(crate) fn truck_mut(&mut self, index: usize) -> &mut Truck {
        &mut self.trucks[index]
    }

    /// Last score set by the solver, if any.
    #[inline]
    pub fn score(&self) -> Option<HardSoftScore> {
        self.score
    }

    /// Sets the score.
    #[inline]
    pub fn set_score(&mut self, score: Option<HardSoftScore>) {
        self.score = score;
    }

    /// Number of (timeslot, dock) cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.timeslots.len() * self.docks.len()
    }

    /// Whether solving is meaningless (no timeslots or no docks).
    pub fn is_empty_problem(&self) -> bool {
        self.timeslots.is_empty() || self.docks.is_empty()
    }

    /// Looks up a truck index by id.
    pub fn truck_index(&self, id: u64) -> Option<usize> {
        self.trucks.iter().position(|t| t.id == id)
    }

    /// Looks up a truck by id.
    pub fn truck_by_id(&self, id: u64) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.id == id)
    }

    /// Trucks with both timeslot and dock assigned.
    pub fn planned_trucks(&self) -> impl Iterator<Item = &Truck> {
        self.trucks.iter().filter(|t| t.is_planned())
    }

    /// Trucks missing a timeslot or a dock.
    pub fn unplanned_trucks(&self) -> impl Iterator<Item = &Truck> {
        self.trucks.iter().filter(|t| !t.is_planned())
    }

    /// Trucks occupying the given (timeslot, dock) cell.
    pub fn trucks_in(&self, timeslot: usize, dock: usize) -> Vec<&Truck> {
        self.trucks
            .iter()
            .filter(|t| t.placement().cell() == Some((timeslot, dock)))
            .collect()
    }

    /// Clears every truck's placement and the score.
    pub fn clear_assignments(&mut self) {
        for truck in &mut self.trucks {
            truck.set_placement(Placement::UNASSIGNED);
        }
        self.score = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    fn sample() -> DockYardSolution {
        DockYardSolution::new(
            vec![
                Timeslot::from_hm((8, 0), (9, 0)).unwrap(),
                Timeslot::from_hm((9, 0), (10, 0)).unwrap(),
            ],
            vec![Dock::new("A", 40).unwrap(), Dock::new("B", 20).unwrap()],
            vec![
                Truck::new(0, "T10", 10).with_placement(Placement::at(0, 1)),
                Truck::new(1, "T15", 15).with_placement(Placement::at(0, 1)),
                Truck::new(2, "T05", 5),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_solution_accessors() {
        let s = sample();
        assert_eq!(s.timeslots().len(), 2);
        assert_eq!(s.docks().len(), 2);
        assert_eq!(s.cell_count(), 4);
        assert!(!s.is_empty_problem());
        assert_eq!(s.score(), None);
        assert_eq!(s.truck_index(2), Some(2));
        assert_eq!(s.truck_by_id(1).map(|t| t.name.as_str()), Some("T15"));
        assert!(s.truck_by_id(99).is_none());
    }

    #[test]
    fn test_planned_and_unplanned() {
        let s = sample();
        assert_eq!(s.planned_trucks().count(), 2);
        let unplanned: Vec<u64> = s.unplanned_trucks().map(|t| t.id).collect();
        assert_eq!(unplanned, vec![2]);
        assert_eq!(s.trucks_in(0, 1).len(), 2);
        assert!(s.trucks_in(1, 0).is_empty());
    }

    #[test]
    fn test_clear_assignments() {
        let mut s = sample();
        s.set_score(Some(HardSoftScore::of_hard(1)));
        s.clear_assignments();
        assert_eq!(s.planned_trucks().count(), 0);
        assert_eq!(s.score(), None);
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        let errors = DockYardSolution::new(
            vec![Timeslot {
                start_ms: 10,
                end_ms: 5,
            }],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTimeslot);
    }

    #[test]
    fn test_empty_problem() {
        let s = DockYardSolution::new(vec![], vec![Dock::new("A", 1).unwrap()], vec![]).unwrap();
        assert!(s.is_empty_problem());
    }

    #[test]
    fn test_solution_serde_roundtrip() {
        let s = sample();
        let json = serde_json::to_string(&s).unwrap();
        let back: DockYardSolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_deserialize_keeps_score() {
        let mut s = sample();
        s.set_score(Some(HardSoftScore::new(0, 1)));
        let back: DockYardSolution =
            serde_json::from_value(serde_json::to_value(&s).unwrap()).unwrap();
        assert_eq!(back.score(), Some(HardSoftScore::new(0, 1)));
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_dock() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["trucks"][0]["dock"] = serde_json::json!(5);

        let err = serde_json::from_value::<DockYardSolution>(json).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid problem"), "{message}");
        assert!(message.contains("unknown dock #5"), "{message}");
    }

    #[test]
    fn test_deserialize_rejects_every_broken_fact() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["trucks"][1]["timeslot"] = serde_json::json!(9);
        json["trucks"][2]["capacity"] = serde_json::json!(0);
        json["docks"][1]["capacity"] = serde_json::json!(-4);

        let message = serde_json::from_value::<DockYardSolution>(json)
            .unwrap_err()
            .to_string();
        assert!(message.contains("unknown timeslot #9"), "{message}");
        assert!(message.contains("non-positive capacity 0"), "{message}");
        assert!(message.contains("negative capacity -4"), "{message}");
    }
}
