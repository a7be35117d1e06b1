//! Local search driver.
//!
//! Anytime improvement loop over a [`ScoreDirector`]: sample moves,
//! keep the best of the sample, ask the acceptor, apply or drop it, and
//! snapshot the working solution whenever it beats the best so far.
//!
//! # Algorithm
//!
//! 1. Validate config and problem; stop early on an empty problem
//! 2. Optional first-fit-decreasing construction
//! 3. Repeat until a termination condition fires:
//!    sample `sample_size` doable moves, evaluate their deltas, pick the
//!    best (first wins ties), accept or reject it
//!
//! The RNG is seeded from the configuration, so a run bounded only by
//! an iteration cap is fully reproducible.
//!
//! # Reference
//! Burke & Bykov (2017), "The late acceptance hill-climbing heuristic"

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::construction::construct;
use super::termination::{Termination, TerminationReason};
use super::{EnvironmentMode, SolverConfig};
use crate::error::SolverError;
use crate::models::{DockYardSolution, HardSoftScore};
use crate::moves::{DockYardMove, MoveSelector};
use crate::score::ScoreDirector;

/// Observer of solver progress.
///
/// Every method has an empty default, so implementors override only
/// what they need.
pub trait SolverListener {
    /// A move was accepted at `iteration`, leaving the working solution at `score`.
    fn move_accepted(&mut self, _iteration: u64, _mv: &DockYardMove, _score: HardSoftScore) {}

    /// A new best solution was found at `iteration`.
    ///
    /// Iteration 0 reports the starting point after construction.
    fn best_solution_changed(&mut self, _iteration: u64, _score: HardSoftScore) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SolverListener for NoopListener {}

/// Counters of a solve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Local-search steps taken.
    pub iterations: u64,
    /// Doable moves whose delta was evaluated.
    pub moves_evaluated: u64,
    /// Moves accepted and applied.
    pub moves_accepted: u64,
    /// Times the best solution was replaced during local search.
    pub best_improvements: u64,
    /// Trucks planned by the construction heuristic.
    pub construction_placed: usize,
    /// Wall-clock time of the whole call.
    pub elapsed: Duration,
    /// Why the search stopped.
    pub termination: TerminationReason,
}

/// Outcome of a solve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    /// Best solution found, with its score set.
    pub solution: DockYardSolution,
    /// Score of `solution`.
    pub score: HardSoftScore,
    /// Run statistics.
    pub stats: SolverStats,
}

impl SolveResult {
    /// Whether the best solution satisfies every hard constraint.
    pub fn is_feasible(&self) -> bool {
        self.score.is_feasible()
    }
}

/// Late-acceptance (or hill-climbing) local search over truck placements.
///
/// # Example
/// ```
/// use u_dockyard::models::{Dock, DockYardSolution, Timeslot, Truck};
/// use u_dockyard::solver::{LocalSearchSolver, SolverConfig};
///
/// let problem = DockYardSolution::new(
///     vec![Timeslot::from_hm((8, 0), (9, 0)).unwrap()],
///     vec![Dock::new("A", 40).unwrap(), Dock::new("B", 20).unwrap()],
///     vec![Truck::new(1, "T1", 30), Truck::new(2, "T2", 15)],
/// ).unwrap();
///
/// let config = SolverConfig::default().without_time_budget().with_iteration_cap(1_000);
/// let result = LocalSearchSolver::new(config).solve(problem).unwrap();
/// assert!(result.is_feasible());
/// assert_eq!(result.solution.planned_trucks().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearchSolver {
    config: SolverConfig,
}

impl LocalSearchSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves the problem, returning the best solution found.
    ///
    /// # Errors
    /// - [`SolverError::InvalidConfig`] if the configuration cannot run
    /// - [`SolverError::InvalidProblem`] if the problem fails validation
    /// - [`SolverError::ScoreCorruption`] in full-assert mode only
    pub fn solve(&self, problem: DockYardSolution) -> Result<SolveResult, SolverError> {
        self.solve_with_listener(problem, &mut NoopListener)
    }

    /// Like [`solve`](Self::solve), reporting progress to `listener`.
    pub fn solve_with_listener(
        &self,
        problem: DockYardSolution,
        listener: &mut dyn SolverListener,
    ) -> Result<SolveResult, SolverError> {
        let config = &self.config;
        config.validate()?;
        problem.validate()?;

        let started = Instant::now();
        info!(
            trucks = problem.trucks().len(),
            timeslots = problem.timeslots().len(),
            docks = problem.docks().len(),
            seed = config.random_seed,
            acceptor = ?config.acceptor,
            "Starting dock-yard solver"
        );

        let mut stats = SolverStats {
            iterations: 0,
            moves_evaluated: 0,
            moves_accepted: 0,
            best_improvements: 0,
            construction_placed: 0,
            elapsed: Duration::ZERO,
            termination: TerminationReason::EmptyProblem,
        };

        if problem.is_empty_problem() || problem.trucks().is_empty() {
            let mut problem = problem;
            problem.clear_assignments();
            let director = ScoreDirector::new(problem, config.constraints.clone())?;
            let score = director.score();
            let solution = director.into_solution();
            stats.elapsed = started.elapsed();
            info!(score = %score, "Empty problem, nothing to solve");
            return Ok(SolveResult {
                solution,
                score,
                stats,
            });
        }

        let mut director = ScoreDirector::new(problem, config.constraints.clone())?;
        let selector = MoveSelector::new(director.solution(), config.swap_moves);

        if config.construction_heuristic {
            stats.construction_placed = construct(&mut director, &selector);
            debug!(
                placed = stats.construction_placed,
                score = %director.score(),
                "Construction heuristic finished"
            );
        }

        let mut current = director.score();
        let mut best = director.snapshot();
        let mut best_score = current;
        listener.best_solution_changed(0, best_score);

        let mut acceptor = config.acceptor.build();
        acceptor.phase_started(current);
        debug!(acceptor = acceptor.name(), score = %current, "Local search started");
        let mut rng = SmallRng::seed_from_u64(config.random_seed);
        let termination = Termination::new(config, started);
        let full_assert = config.environment_mode == EnvironmentMode::FullAssert;
        let mut unimproved: u64 = 0;

        let reason = loop {
            if let Some(reason) = termination.check(stats.iterations, best_score, unimproved) {
                break reason;
            }
            stats.iterations += 1;
            let iteration = stats.iterations;

            let mut candidate: Option<(DockYardMove, HardSoftScore)> = None;
            for _ in 0..config.sample_size {
                let Some(mv) = selector.sample(&mut rng) else {
                    break;
                };
                if !mv.is_doable(director.solution()) {
                    continue;
                }
                let delta = if full_assert {
                    assert_move(&mut director, &mv, iteration)?
                } else {
                    mv.delta(&director)
                };
                stats.moves_evaluated += 1;
                let score = current + delta;
                if candidate.map_or(true, |(_, s)| score < s) {
                    candidate = Some((mv, score));
                }
            }

            let mut improved = false;
            if let Some((mv, score)) = candidate {
                if acceptor.is_accepted(current, score) {
                    let _ = mv.apply(&mut director);
                    current = director.score();
                    stats.moves_accepted += 1;
                    listener.move_accepted(iteration, &mv, current);

                    if current < best_score {
                        best = director.snapshot();
                        best_score = current;
                        stats.best_improvements += 1;
                        improved = true;
                        debug!(iteration, score = %best_score, "New best solution");
                        listener.best_solution_changed(iteration, best_score);
                    }
                }
            }
            unimproved = if improved { 0 } else { unimproved + 1 };
            acceptor.step_ended(current);
        };

        stats.termination = reason;
        stats.elapsed = started.elapsed();
        info!(
            score = %best_score,
            iterations = stats.iterations,
            accepted = stats.moves_accepted,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            termination = %reason,
            "Dock-yard solver finished"
        );

        Ok(SolveResult {
            solution: best,
            score: best_score,
            stats,
        })
    }
}

/// Evaluates a move by applying and undoing it, checking every score path agrees.
fn assert_move(
    director: &mut ScoreDirector,
    mv: &DockYardMove,
    iteration: u64,
) -> Result<HardSoftScore, SolverError> {
    let before = director.score();
    let delta = mv.delta(director);
    let token = mv.apply(director);
    let after = director.score();
    let recomputed = director.recompute();
    DockYardMove::undo(director, token);

    let corruption = if after != before + delta {
        Some((before + delta, after))
    } else if recomputed != after {
        Some((recomputed, after))
    } else if director.score() != before {
        Some((before, director.score()))
    } else {
        None
    };

    match corruption {
        Some((expected, actual)) => {
            warn!(iteration, %expected, %actual, mv = %mv, "Score corruption detected");
            Err(SolverError::ScoreCorruption {
                iteration,
                expected,
                actual,
            })
        }
        None => Ok(delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dock, Timeslot, Truck};
    use crate::score::{calculate_score, CapacityScope};
    use crate::solver::AcceptorType;

    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }

    fn problem(capacities: &[i64]) -> DockYardSolution {
        DockYardSolution::new(
            vec![
                Timeslot::from_hm((8, 0), (9, 0)).unwrap(),
                Timeslot::from_hm((9, 0), (10, 0)).unwrap(),
                Timeslot::from_hm((10, 0), (11, 0)).unwrap(),
            ],
            vec![
                Dock::new("A", 40).unwrap(),
                Dock::new("B", 20).unwrap(),
                Dock::new("C", 10).unwrap(),
            ],
            capacities
                .iter()
                .enumerate()
                .map(|(i, &c)| Truck::new(i as u64 + 1, format!("Truck{c}"), c))
                .collect(),
        )
        .unwrap()
    }

    const SCENARIO: [i64; 11] = [10, 15, 5, 30, 40, 20, 3, 19, 22, 11, 12];

    fn capped(iterations: u64) -> SolverConfig {
        SolverConfig::default()
            .without_time_budget()
            .with_iteration_cap(iterations)
            .with_capacity_scope(CapacityScope::PerTimeslot)
    }

    #[derive(Default)]
    struct Recorder {
        accepted: Vec<(u64, DockYardMove, HardSoftScore)>,
        bests: Vec<HardSoftScore>,
    }

    impl SolverListener for Recorder {
        fn move_accepted(&mut self, iteration: u64, mv: &DockYardMove, score: HardSoftScore) {
            self.accepted.push((iteration, *mv, score));
        }

        fn best_solution_changed(&mut self, _iteration: u64, score: HardSoftScore) {
            self.bests.push(score);
        }
    }

    #[test]
    fn test_scenario_with_construction() {
        init_test_logging();
        let result = LocalSearchSolver::new(capped(20_000))
            .solve(problem(&SCENARIO))
            .unwrap();

        assert_eq!(result.score.hard, 0);
        assert!(result.solution.planned_trucks().count() >= 9);
        assert_eq!(result.stats.construction_placed, 9);
        assert_eq!(result.solution.score(), Some(result.score));
        let constraints = capped(1).constraints;
        assert_eq!(calculate_score(&result.solution, &constraints), result.score);
        let planned = result.solution.planned_trucks().count() as i64;
        assert_eq!(result.score.soft, 11 - planned);
    }

    #[test]
    fn test_scenario_local_search_only() {
        init_test_logging();
        let config = capped(200_000)
            .with_construction_heuristic(false)
            .with_random_seed(7);
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();

        assert_eq!(result.score.hard, 0);
        assert!(result.solution.planned_trucks().count() >= 9);
        assert_eq!(result.stats.construction_placed, 0);
    }

    #[test]
    fn test_scenario_time_budget() {
        let config = SolverConfig::default()
            .with_time_budget(Duration::from_millis(200))
            .with_capacity_scope(CapacityScope::PerTimeslot);
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();

        assert_eq!(result.stats.termination, TerminationReason::TimeBudget);
        assert!(result.stats.elapsed >= Duration::from_millis(200));
        assert_eq!(result.score.hard, 0);
    }

    #[test]
    fn test_oversized_truck_left_unplanned() {
        let mut capacities = SCENARIO.to_vec();
        capacities.push(50);
        let result = LocalSearchSolver::new(capped(20_000))
            .solve(problem(&capacities))
            .unwrap();

        assert_eq!(result.score.hard, 0);
        let oversized = result.solution.truck_by_id(12).unwrap();
        assert_eq!(oversized.capacity, 50);
        assert!(!oversized.is_planned());
    }

    #[test]
    fn test_oversized_truck_left_unplanned_per_dock() {
        let mut capacities = SCENARIO.to_vec();
        capacities.push(50);
        let config = SolverConfig::default()
            .without_time_budget()
            .with_iteration_cap(20_000);
        assert_eq!(config.constraints.capacity_scope, CapacityScope::PerDock);
        let result = LocalSearchSolver::new(config)
            .solve(problem(&capacities))
            .unwrap();

        assert_eq!(result.score.hard, 0);
        assert!(!result.solution.truck_by_id(12).unwrap().is_planned());
        assert!(result.solution.planned_trucks().count() > 0);
        for (d, dock) in result.solution.docks().iter().enumerate() {
            let load: i64 = result
                .solution
                .planned_trucks()
                .filter(|t| t.dock() == Some(d))
                .map(|t| t.capacity)
                .sum();
            assert!(load <= dock.capacity, "dock {} loaded {load}", dock.name);
        }
    }

    #[test]
    fn test_scenario_truck_fit() {
        let mut capacities = SCENARIO.to_vec();
        capacities.push(50);
        let config = capped(20_000).with_capacity_scope(CapacityScope::TruckFit);
        let result = LocalSearchSolver::new(config)
            .solve(problem(&capacities))
            .unwrap();

        assert_eq!(result.score.hard, 0);
        assert_eq!(result.stats.construction_placed, 9);
        assert_eq!(result.solution.planned_trucks().count(), 9);
        assert!(!result.solution.truck_by_id(12).unwrap().is_planned());
        for truck in result.solution.planned_trucks() {
            let dock = &result.solution.docks()[truck.dock().unwrap()];
            assert!(dock.fits(truck.capacity));
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let run = || {
            let mut recorder = Recorder::default();
            let config = capped(3_000).with_construction_heuristic(false).with_random_seed(42);
            let result = LocalSearchSolver::new(config)
                .solve_with_listener(problem(&SCENARIO), &mut recorder)
                .unwrap();
            (result.solution, result.stats.moves_accepted, recorder.accepted)
        };
        let (sol_a, accepted_a, moves_a) = run();
        let (sol_b, accepted_b, moves_b) = run();

        assert_eq!(sol_a, sol_b);
        assert_eq!(accepted_a, accepted_b);
        assert_eq!(moves_a, moves_b);
        assert!(!moves_a.is_empty());
    }

    #[test]
    fn test_best_score_is_monotonic() {
        let mut recorder = Recorder::default();
        let config = capped(5_000).with_construction_heuristic(false);
        let result = LocalSearchSolver::new(config)
            .solve_with_listener(problem(&SCENARIO), &mut recorder)
            .unwrap();

        assert!(recorder.bests.len() >= 2);
        assert!(recorder.bests.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(recorder.bests.last(), Some(&result.score));
        // Every accepted step was scored on the working solution.
        assert!(recorder.accepted.iter().all(|(_, _, s)| *s >= result.score));
    }

    #[test]
    fn test_hill_climbing_acceptor() {
        let config = capped(20_000)
            .with_acceptor(AcceptorType::HillClimbing)
            .with_sample_size(4);
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();
        assert_eq!(result.score.hard, 0);
    }

    #[test]
    fn test_best_score_limit_stops_early() {
        let config = capped(1_000_000).with_best_score_limit(HardSoftScore::new(0, 2));
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();

        // Construction already reaches 0hard/2soft.
        assert_eq!(result.stats.termination, TerminationReason::BestScoreLimit);
        assert_eq!(result.stats.iterations, 0);
        assert_eq!(result.score, HardSoftScore::new(0, 2));
    }

    #[test]
    fn test_unimproved_limit() {
        let config = capped(1_000_000).with_unimproved_iteration_limit(500);
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();
        assert_eq!(result.stats.termination, TerminationReason::UnimprovedLimit);
        assert!(result.stats.iterations < 1_000_000);
    }

    #[test]
    fn test_full_assert_mode() {
        init_test_logging();
        let config = capped(2_000)
            .with_construction_heuristic(false)
            .with_sample_size(3)
            .with_environment_mode(EnvironmentMode::FullAssert);
        let result = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap();
        assert_eq!(result.stats.termination, TerminationReason::IterationCap);
        assert!(result.stats.moves_evaluated > 0);
    }

    #[test]
    fn test_empty_problem() {
        let problem = DockYardSolution::new(
            vec![],
            vec![Dock::new("A", 40).unwrap()],
            vec![Truck::new(1, "T1", 10), Truck::new(2, "T2", 20)],
        )
        .unwrap();
        let result = LocalSearchSolver::new(capped(100)).solve(problem).unwrap();

        assert_eq!(result.stats.termination, TerminationReason::EmptyProblem);
        assert_eq!(result.stats.iterations, 0);
        assert_eq!(result.score.hard, 0);
        assert_eq!(result.score.soft, 2);
        assert_eq!(result.solution.planned_trucks().count(), 0);
    }

    #[test]
    fn test_no_trucks() {
        let result = LocalSearchSolver::new(capped(100)).solve(problem(&[])).unwrap();
        assert_eq!(result.stats.termination, TerminationReason::EmptyProblem);
        assert_eq!(result.score, HardSoftScore::ZERO);
    }

    #[test]
    fn test_invalid_config() {
        let config = SolverConfig::default().without_time_budget();
        let err = LocalSearchSolver::new(config).solve(problem(&SCENARIO)).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig(_)));
    }

    #[test]
    fn test_stats_serde() {
        let result = LocalSearchSolver::new(capped(50)).solve(problem(&SCENARIO)).unwrap();
        let json = serde_json::to_string(&result.stats).unwrap();
        let back: SolverStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result.stats);
    }
}
