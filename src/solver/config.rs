//! Solver configuration.
//!
//! A plain value passed into each solve call; there is no global
//! solver state. Serializable so it can live in a caller's config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::acceptor::{Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor};
use crate::error::SolverError;
use crate::models::HardSoftScore;
use crate::score::{CapacityScope, ConstraintConfig};
use crate::validation::MAX_CAPACITY;

/// Default late-acceptance history length.
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Acceptance policy of the local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptorType {
    /// Accept candidates not worse than the current score.
    HillClimbing,
    /// Accept candidates not worse than the current score or the score
    /// `size` steps ago.
    LateAcceptance {
        /// History length.
        size: usize,
    },
}

impl Default for AcceptorType {
    fn default() -> Self {
        AcceptorType::LateAcceptance {
            size: DEFAULT_LATE_ACCEPTANCE_SIZE,
        }
    }
}

impl AcceptorType {
    /// Builds a fresh acceptor.
    pub fn build(&self) -> Box<dyn Acceptor> {
        match *self {
            AcceptorType::HillClimbing => Box::new(HillClimbingAcceptor),
            AcceptorType::LateAcceptance { size } => Box::new(LateAcceptanceAcceptor::new(size)),
        }
    }
}

/// Runtime checks performed while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnvironmentMode {
    /// No extra checks; same seed and iteration cap give the same run.
    #[default]
    Reproducible,
    /// Applies and undoes every evaluated move, verifying delta,
    /// incremental and from-scratch scores agree. Slow.
    FullAssert,
}

/// Configuration of a solve call.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_dockyard::solver::{AcceptorType, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_time_budget(Duration::from_secs(2))
///     .with_random_seed(42)
///     .with_acceptor(AcceptorType::LateAcceptance { size: 100 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget. `None` = no time limit.
    pub time_budget: Option<Duration>,
    /// Seed of the move-sampling RNG.
    pub random_seed: u64,
    /// Maximum local-search steps. `None` = no cap.
    pub iteration_cap: Option<u64>,
    /// Stop as soon as the best score is at least this good.
    pub best_score_limit: Option<HardSoftScore>,
    /// Stop after this many steps without a new best score.
    pub unimproved_iteration_limit: Option<u64>,
    /// Acceptance policy.
    pub acceptor: AcceptorType,
    /// Moves sampled per step; the best of them is the candidate.
    pub sample_size: usize,
    /// Whether swap moves are part of the neighborhood.
    pub swap_moves: bool,
    /// Whether to run the construction heuristic before local search.
    pub construction_heuristic: bool,
    /// Runtime checks.
    pub environment_mode: EnvironmentMode,
    /// Constraint parameters.
    pub constraints: ConstraintConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_budget: Some(Duration::from_secs(10)),
            random_seed: 0,
            iteration_cap: None,
            best_score_limit: None,
            unimproved_iteration_limit: None,
            acceptor: AcceptorType::default(),
            sample_size: 1,
            swap_moves: true,
            construction_heuristic: true,
            environment_mode: EnvironmentMode::Reproducible,
            constraints: ConstraintConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Removes the time budget (an iteration cap is then required).
    pub fn without_time_budget(mut self) -> Self {
        self.time_budget = None;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the iteration cap.
    pub fn with_iteration_cap(mut self, cap: u64) -> Self {
        self.iteration_cap = Some(cap);
        self
    }

    /// Sets the best-score limit.
    pub fn with_best_score_limit(mut self, limit: HardSoftScore) -> Self {
        self.best_score_limit = Some(limit);
        self
    }

    /// Sets the unimproved-iteration limit.
    pub fn with_unimproved_iteration_limit(mut self, limit: u64) -> Self {
        self.unimproved_iteration_limit = Some(limit);
        self
    }

    /// Sets the acceptor.
    pub fn with_acceptor(mut self, acceptor: AcceptorType) -> Self {
        self.acceptor = acceptor;
        self
    }

    /// Sets the per-step sample size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Enables or disables swap moves.
    pub fn with_swap_moves(mut self, enabled: bool) -> Self {
        self.swap_moves = enabled;
        self
    }

    /// Enables or disables the construction heuristic.
    pub fn with_construction_heuristic(mut self, enabled: bool) -> Self {
        self.construction_heuristic = enabled;
        self
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the constraint parameters.
    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.constraints = constraints;
        self
    }

    /// Shorthand for the capacity scope of the constraint parameters.
    pub fn with_capacity_scope(mut self, scope: CapacityScope) -> Self {
        self.constraints.capacity_scope = scope;
        self
    }

    /// Checks the configuration can run.
    ///
    /// # Errors
    /// [`SolverError::InvalidConfig`] when no budget bounds the search,
    /// the late-acceptance history or the sample size is zero, or the
    /// unplanned weight lies outside `0..=MAX_CAPACITY`.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.time_budget.is_none() && self.iteration_cap.is_none() {
            return Err(SolverError::InvalidConfig(
                "either time_budget or iteration_cap must be set".into(),
            ));
        }
        if let AcceptorType::LateAcceptance { size: 0 } = self.acceptor {
            return Err(SolverError::InvalidConfig(
                "late acceptance size must be positive".into(),
            ));
        }
        if self.sample_size == 0 {
            return Err(SolverError::InvalidConfig(
                "sample_size must be positive".into(),
            ));
        }
        if !(0..=MAX_CAPACITY).contains(&self.constraints.unplanned_weight) {
            return Err(SolverError::InvalidConfig(format!(
                "unplanned_weight must be within 0..={MAX_CAPACITY}"
            )));
        }
        Ok(())
    }
}
