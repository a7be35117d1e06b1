//! Dock model.
//!
//! Docks are the capacity-bounded resources trucks are assigned to.
//! A dock serves at most one truck per timeslot, and the trucks it
//! serves must fit its capacity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::validation::{too_large, ValidationError, ValidationErrorKind, MAX_CAPACITY};

/// A dock that can serve trucks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dock {
    /// Unique dock name.
    pub name: String,
    /// Capacity units the dock can take (non-negative).
    pub capacity: i64,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

impl Dock {
    /// Creates a new dock.
    ///
    /// # Errors
    /// Returns [`ValidationErrorKind::NegativeCapacity`] if `capacity < 0`
    /// and [`ValidationErrorKind::CapacityTooLarge`] above [`MAX_CAPACITY`].
    pub fn new(name: impl Into<String>, capacity: i64) -> Result<Self, ValidationError> {
        let name = name.into();
        if capacity < 0 {
            return Err(ValidationError::new(
                ValidationErrorKind::NegativeCapacity,
                format!("Dock '{name}' has negative capacity {capacity}"),
            ));
        }
        if capacity > MAX_CAPACITY {
            return Err(too_large(format!("Dock '{name}'"), capacity));
        }
        Ok(Self {
            name,
            capacity,
            attributes: HashMap::new(),
        })
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether a single truck of the given capacity fits this dock.
    #[inline]
    pub fn fits(&self, capacity: i64) -> bool {
        capacity <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dock_new() {
        let dock = Dock::new("DocYard-A-40", 40)
            .unwrap()
            .with_attribute("gate", "north");
        assert_eq!(dock.name, "DocYard-A-40");
        assert_eq!(dock.capacity, 40);
        assert_eq!(dock.attributes.get("gate"), Some(&"north".to_string()));
        assert!(dock.fits(40));
        assert!(!dock.fits(41));
    }

    #[test]
    fn test_dock_zero_capacity_allowed() {
        let dock = Dock::new("closed", 0).unwrap();
        assert!(!dock.fits(1));
    }

    #[test]
    fn test_dock_negative_capacity() {
        let err = Dock::new("broken", -1).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NegativeCapacity);
    }

    #[test]
    fn test_dock_capacity_too_large() {
        assert!(Dock::new("big", MAX_CAPACITY).is_ok());
        let err = Dock::new("huge", MAX_CAPACITY + 1).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::CapacityTooLarge);
    }
}
