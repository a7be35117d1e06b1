//! Termination conditions of the local search.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use super::SolverConfig;
use crate::models::HardSoftScore;

/// Why a solve call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The wall-clock budget ran out.
    TimeBudget,
    /// The iteration cap was reached.
    IterationCap,
    /// The best score reached the configured limit.
    BestScoreLimit,
    /// Too many steps passed without a new best score.
    UnimprovedLimit,
    /// Nothing to solve: no timeslots, docks or trucks.
    EmptyProblem,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::TimeBudget => "time budget",
            TerminationReason::IterationCap => "iteration cap",
            TerminationReason::BestScoreLimit => "best score limit",
            TerminationReason::UnimprovedLimit => "unimproved iteration limit",
            TerminationReason::EmptyProblem => "empty problem",
        };
        f.write_str(name)
    }
}

/// Budget bookkeeping for one solve call.
#[derive(Debug, Clone)]
pub(crate) struct Termination {
    started: Instant,
    time_budget: Option<Duration>,
    iteration_cap: Option<u64>,
    best_score_limit: Option<HardSoftScore>,
    unimproved_limit: Option<u64>,
}

impl Termination {
    pub(crate) fn new(config: &SolverConfig, started: Instant) -> Self {
        Self {
            started,
            time_budget: config.time_budget,
            iteration_cap: config.iteration_cap,
            best_score_limit: config.best_score_limit,
            unimproved_limit: config.unimproved_iteration_limit,
        }
    }

    /// First condition that fires, checked between steps.
    pub(crate) fn check(
        &self,
        iterations: u64,
        best: HardSoftScore,
        unimproved: u64,
    ) -> Option<TerminationReason> {
        if self.best_score_limit.is_some_and(|limit| best <= limit) {
            return Some(TerminationReason::BestScoreLimit);
        }
        if self.iteration_cap.is_some_and(|cap| iterations >= cap) {
            return Some(TerminationReason::IterationCap);
        }
        if self.unimproved_limit.is_some_and(|limit| unimproved >= limit) {
            return Some(TerminationReason::UnimprovedLimit);
        }
        if self
            .time_budget
            .is_some_and(|budget| self.started.elapsed() >= budget)
        {
            return Some(TerminationReason::TimeBudget);
        }
        None
    }
}
