//! Hard/soft penalty score.
//!
//! Scores are penalties: both components count violations, so
//! **lower is better** and `0hard/0soft` is perfect. Comparison is
//! lexicographic: any reduction in `hard` outweighs any change in `soft`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A (hard, soft) penalty pair.
///
/// The derived ordering compares `hard` first, then `soft`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HardSoftScore {
    /// Hard penalty. Zero means feasible.
    pub hard: i64,
    /// Soft penalty, ranking feasible solutions.
    pub soft: i64,
}

impl HardSoftScore {
    /// `0hard/0soft`.
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    /// Creates a score.
    #[inline]
    pub const fn new(hard: i64, soft: i64) -> Self {
        Self { hard, soft }
    }

    /// A pure hard score.
    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        Self { hard, soft: 0 }
    }

    /// A pure soft score.
    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        Self { hard: 0, soft }
    }

    /// Whether no hard constraint is violated.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard <= 0
    }
}

impl Add for HardSoftScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.hard + rhs.hard, self.soft + rhs.soft)
    }
}

impl AddAssign for HardSoftScore {
    fn add_assign(&mut self, rhs: Self) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sub for HardSoftScore {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.hard - rhs.hard, self.soft - rhs.soft)
    }
}

impl Neg for HardSoftScore {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.hard, -self.soft)
    }
}

impl Sum for HardSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}
