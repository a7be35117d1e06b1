//! Dock-yard domain models.
//!
//! Provides the problem facts, planning entities and score type of
//! the truck-to-dock planning problem.
//!
//! # Roles
//!
//! | Type | Role | Mutable while solving |
//! |------|------|-----------------------|
//! | `Timeslot` | Problem fact | no |
//! | `Dock` | Problem fact | no |
//! | `Truck` | Planning entity | timeslot + dock only |
//! | `DockYardSolution` | Aggregate | trucks' placements + score |
//! | `HardSoftScore` | Score | no |

mod dock;
mod score;
mod solution;
mod timeslot;
mod truck;

pub use dock::Dock;
pub use score::HardSoftScore;
pub use solution::DockYardSolution;
pub use timeslot::Timeslot;
pub use truck::{Placement, Truck};
