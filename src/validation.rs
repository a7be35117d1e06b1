//! Input validation for dock-yard problems.
//!
//! Checks structural integrity of timeslots, docks and trucks before
//! solving. Detects:
//! - Timeslots that do not start before they end, or appear twice
//! - Docks with negative capacity or duplicate names
//! - Trucks with non-positive capacity or duplicate IDs
//! - Capacities above [`MAX_CAPACITY`]
//! - Seeded placements that point outside the fact lists
//!
//! Duplicate truck *names* are accepted: the truck-conflict rule
//! scores them instead.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Dock, Timeslot, Truck};

/// Largest dock or truck capacity accepted.
///
/// Capacity tallies are plain `i64` sums; with this bound they stay exact
/// for up to 2^23 trucks.
pub const MAX_CAPACITY: i64 = 1 << 40;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A timeslot with `start >= end`.
    InvalidTimeslot,
    /// Two timeslots with equal bounds.
    DuplicateTimeslot,
    /// A dock with capacity below zero.
    NegativeCapacity,
    /// Two docks share a name.
    DuplicateDockName,
    /// A truck requiring zero or negative capacity.
    NonPositiveTruckCapacity,
    /// A dock or truck capacity above [`MAX_CAPACITY`].
    CapacityTooLarge,
    /// Two trucks share an ID.
    DuplicateTruckId,
    /// A truck's timeslot index is out of range.
    InvalidTimeslotReference,
    /// A truck's dock index is out of range.
    InvalidDockReference,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a dock-yard problem.
///
/// Checks:
/// 1. Every timeslot starts before it ends
/// 2. No two timeslots are equal
/// 3. No dock has negative capacity
/// 4. No duplicate dock names
/// 5. Every truck requires positive capacity
/// 6. No capacity exceeds [`MAX_CAPACITY`]
/// 7. No duplicate truck IDs
/// 8. Seeded timeslot/dock indices are in range
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(timeslots: &[Timeslot], docks: &[Dock], trucks: &[Truck]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen_slots = HashSet::new();
    for slot in timeslots {
        if !slot.is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeslot,
                format!(
                    "Timeslot [{}, {}) must start before it ends",
                    slot.start_ms, slot.end_ms
                ),
            ));
        }
        if !seen_slots.insert(*slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTimeslot,
                format!("Duplicate timeslot [{}, {})", slot.start_ms, slot.end_ms),
            ));
        }
    }

    let mut dock_names = HashSet::new();
    for dock in docks {
        if dock.capacity < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeCapacity,
                format!("Dock '{}' has negative capacity {}", dock.name, dock.capacity),
            ));
        }
        if dock.capacity > MAX_CAPACITY {
            errors.push(too_large(format!("Dock '{}'", dock.name), dock.capacity));
        }
        if !dock_names.insert(dock.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateDockName,
                format!("Duplicate dock name: {}", dock.name),
            ));
        }
    }

    let mut truck_ids = HashSet::new();
    for truck in trucks {
        if truck.capacity <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveTruckCapacity,
                format!(
                    "Truck {} ('{}') requires non-positive capacity {}",
                    truck.id, truck.name, truck.capacity
                ),
            ));
        }
        if truck.capacity > MAX_CAPACITY {
            errors.push(too_large(
                format!("Truck {} ('{}')", truck.id, truck.name),
                truck.capacity,
            ));
        }
        if !truck_ids.insert(truck.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTruckId,
                format!("Duplicate truck ID: {}", truck.id),
            ));
        }
        if let Some(slot) = truck.timeslot() {
            if slot >= timeslots.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeslotReference,
                    format!("Truck {} references unknown timeslot #{slot}", truck.id),
                ));
            }
        }
        if let Some(dock) = truck.dock() {
            if dock >= docks.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDockReference,
                    format!("Truck {} references unknown dock #{dock}", truck.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn too_large(subject: String, capacity: i64) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::CapacityTooLarge,
        format!("{subject} capacity {capacity} exceeds the maximum {MAX_CAPACITY}"),
    )
}
