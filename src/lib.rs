//! Dock-yard truck planning for the U-Engine ecosystem.
//!
//! Assigns trucks to (timeslot, dock) cells so that no dock serves two
//! trucks at once, no truck name appears twice in a timeslot and no
//! dock takes more capacity than it offers. Solving is an anytime,
//! seeded, budget-bounded local search.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Timeslot`, `Dock`, `Truck`, `Placement`,
//!   `DockYardSolution`, `HardSoftScore`
//! - **`validation`**: Input integrity checks (duplicate IDs, bad references, capacities)
//! - **`score`**: Constraint rules, incremental `ScoreDirector`, score analysis
//! - **`moves`**: Reassign and swap moves with delta, apply and undo
//! - **`solver`**: Construction heuristic, late-acceptance local search, KPIs
//! - **`error`**: `SolverError`
//!
//! # Example
//!
//! ```
//! use u_dockyard::models::{Dock, DockYardSolution, Timeslot, Truck};
//! use u_dockyard::{solve, SolverConfig};
//!
//! let problem = DockYardSolution::new(
//!     vec![Timeslot::from_hm((8, 0), (9, 0)).unwrap()],
//!     vec![Dock::new("A", 40).unwrap()],
//!     vec![Truck::new(1, "T1", 30)],
//! ).unwrap();
//!
//! let config = SolverConfig::default().without_time_budget().with_iteration_cap(100);
//! let result = solve(problem, &config).unwrap();
//! assert!(result.is_feasible());
//! ```
//!
//! # Logging
//!
//! Progress is reported through `tracing`. The crate never installs a
//! subscriber.
//!
//! # References
//!
//! - Hoos & Stützle (2004), "Stochastic Local Search: Foundations and Applications"
//! - Burke & Bykov (2017), "The late acceptance hill-climbing heuristic"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod error;
pub mod models;
pub mod moves;
pub mod score;
pub mod solver;
pub mod validation;

pub use error::SolverError;
pub use solver::{solve, SolveResult, SolverConfig};
