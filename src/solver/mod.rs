//! Solving: construction, local search and the solve boundary.
//!
//! | Component | Role |
//! |-----------|------|
//! | [`SolverConfig`] | Budget, seed, acceptor, neighborhood and constraint parameters |
//! | [`Acceptor`] | Hill climbing or late acceptance |
//! | [`LocalSearchSolver`] | Construction + anytime local search |
//! | [`SolveResult`] | Best solution, its score and run statistics |
//! | [`SolutionKpi`] | Plan metrics for reporting |
//!
//! [`solve`] is the stateless entry point: one call, one configuration
//! value, no solver state shared between calls.

mod acceptor;
mod config;
mod construction;
mod kpi;
mod local_search;
mod termination;

pub use acceptor::{Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor};
pub use config::{AcceptorType, EnvironmentMode, SolverConfig, DEFAULT_LATE_ACCEPTANCE_SIZE};
pub use kpi::SolutionKpi;
pub use local_search::{LocalSearchSolver, NoopListener, SolveResult, SolverListener, SolverStats};
pub use termination::TerminationReason;

use crate::error::SolverError;
use crate::models::DockYardSolution;

/// Solves a dock-yard problem with the given configuration.
///
/// Existing placements in `problem` are the starting point; the result
/// holds the best solution found before the budget ran out.
///
/// # Errors
/// See [`LocalSearchSolver::solve`].
///
/// # Example
/// ```
/// use u_dockyard::models::{Dock, DockYardSolution, Timeslot, Truck};
/// use u_dockyard::score::CapacityScope;
/// use u_dockyard::solver::{solve, SolverConfig};
///
/// let problem = DockYardSolution::new(
///     vec![
///         Timeslot::from_hm((8, 0), (9, 0)).unwrap(),
///         Timeslot::from_hm((9, 0), (10, 0)).unwrap(),
///     ],
///     vec![Dock::new("A", 40).unwrap(), Dock::new("C", 10).unwrap()],
///     vec![
///         Truck::new(1, "T1", 30),
///         Truck::new(2, "T2", 25),
///         Truck::new(3, "T3", 5),
///     ],
/// ).unwrap();
///
/// let config = SolverConfig::default()
///     .without_time_budget()
///     .with_iteration_cap(2_000)
///     .with_capacity_scope(CapacityScope::PerTimeslot);
/// let result = solve(problem, &config).unwrap();
/// assert_eq!(result.score.hard, 0);
/// assert_eq!(result.solution.unplanned_trucks().count(), 0);
/// ```
pub fn solve(
    problem: DockYardSolution,
    config: &SolverConfig,
) -> Result<SolveResult, SolverError> {
    LocalSearchSolver::new(config.clone()).solve(problem)
}
