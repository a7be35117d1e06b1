//! Move acceptance policies.
//!
//! An acceptor decides whether the local search moves to a candidate
//! score from the current one. Acceptors are stateful per solve: the
//! driver calls [`Acceptor::phase_started`] once and
//! [`Acceptor::step_ended`] after every step.
//!
//! # Reference
//! Burke & Bykov (2017), "The late acceptance hill-climbing heuristic",
//! European Journal of Operational Research 258(1)

use std::fmt::Debug;

use crate::models::HardSoftScore;

/// A move acceptance policy.
pub trait Acceptor: Debug {
    /// Policy name (e.g., "LateAcceptance").
    fn name(&self) -> &'static str;

    /// Resets internal state for a new search starting at `initial`.
    fn phase_started(&mut self, initial: HardSoftScore);

    /// Whether to move from `current` to `candidate`.
    fn is_accepted(&self, current: HardSoftScore, candidate: HardSoftScore) -> bool;

    /// Records the score at the end of a step (accepted or not).
    fn step_ended(&mut self, current: HardSoftScore);
}

/// Accepts any candidate that is not worse than the current score.
///
/// Equal moves are accepted so the search can drift across plateaus.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbingAcceptor;

impl Acceptor for HillClimbingAcceptor {
    fn name(&self) -> &'static str {
        "HillClimbing"
    }

    fn phase_started(&mut self, _initial: HardSoftScore) {}

    fn is_accepted(&self, current: HardSoftScore, candidate: HardSoftScore) -> bool {
        candidate <= current
    }

    fn step_ended(&mut self, _current: HardSoftScore) {}
}

/// Late acceptance hill climbing.
///
/// Keeps the current score of the last `size` steps in a ring buffer.
/// A candidate is accepted if it is not worse than the current score
/// or than the score recorded `size` steps ago.
#[derive(Debug, Clone)]
pub struct LateAcceptanceAcceptor {
    history: Vec<HardSoftScore>,
    cursor: usize,
}

impl LateAcceptanceAcceptor {
    /// Creates an acceptor with the given history length (at least 1).
    pub fn new(size: usize) -> Self {
        Self {
            history: vec![HardSoftScore::ZERO; size.max(1)],
            cursor: 0,
        }
    }

    /// History length.
    pub fn size(&self) -> usize {
        self.history.len()
    }
}

impl Acceptor for LateAcceptanceAcceptor {
    fn name(&self) -> &'static str {
        "LateAcceptance"
    }

    fn phase_started(&mut self, initial: HardSoftScore) {
        self.history.fill(initial);
        self.cursor = 0;
    }

    fn is_accepted(&self, current: HardSoftScore, candidate: HardSoftScore) -> bool {
        candidate <= current || candidate <= self.history[self.cursor]
    }

    fn step_ended(&mut self, current: HardSoftScore) {
        self.history[self.cursor] = current;
        self.cursor = (self.cursor + 1) % self.history.len();
    }
}
