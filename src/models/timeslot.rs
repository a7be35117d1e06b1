//! Timeslot model.
//!
//! A timeslot is a fixed time window in which a dock can serve a truck.
//! Timeslots are problem facts: they never change during solving.
//!
//! # Time Model
//! All times are in milliseconds relative to a scheduling epoch.
//! The consumer defines what epoch means (e.g., midnight of the yard's day).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{ValidationError, ValidationErrorKind};

/// A time window [start, end).
///
/// Half-open interval: includes start, excludes end.
/// Two timeslots are the same timeslot iff their bounds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timeslot {
    /// Window start (ms, inclusive).
    pub start_ms: i64,
    /// Window end (ms, exclusive).
    pub end_ms: i64,
}

impl Timeslot {
    /// Creates a new timeslot.
    ///
    /// # Errors
    /// Returns [`ValidationErrorKind::InvalidTimeslot`] if `start_ms >= end_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, ValidationError> {
        let slot = Self { start_ms, end_ms };
        if slot.is_valid() {
            Ok(slot)
        } else {
            Err(ValidationError::new(
                ValidationErrorKind::InvalidTimeslot,
                format!("Timeslot {slot} must start before it ends"),
            ))
        }
    }

    /// Creates a timeslot from wall-clock hours and minutes (e.g. 08:00-09:00).
    ///
    /// Times are measured from the scheduling epoch.
    pub fn from_hm(
        start: (u32, u32),
        end: (u32, u32),
    ) -> Result<Self, ValidationError> {
        Self::new(hm_to_ms(start), hm_to_ms(end))
    }

    /// Whether `start_ms < end_ms`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start_ms < self.end_ms
    }

    /// Duration of this timeslot (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Whether a timestamp falls within this timeslot.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }
}

fn hm_to_ms((hours, minutes): (u32, u32)) -> i64 {
    (i64::from(hours) * 60 + i64::from(minutes)) * 60_000
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = |ms: i64| ms.div_euclid(60_000);
        let (s, e) = (minutes(self.start_ms), minutes(self.end_ms));
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            s.div_euclid(60),
            s.rem_euclid(60),
            e.div_euclid(60),
            e.rem_euclid(60)
        )
    }
}
