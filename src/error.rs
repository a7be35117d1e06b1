//! Solver error types.

use thiserror::Error;

use crate::models::HardSoftScore;
use crate::validation::ValidationError;

/// Errors returned by a solve call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The problem instance failed validation; solving never started.
    #[error("invalid problem: {}", join_messages(.0))]
    InvalidProblem(Vec<ValidationError>),

    /// The solver configuration cannot run.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// Incremental and from-scratch scores disagree (full-assert mode only).
    #[error("score corruption at iteration {iteration}: expected {expected}, actual {actual}")]
    ScoreCorruption {
        iteration: u64,
        expected: HardSoftScore,
        actual: HardSoftScore,
    },
}

impl From<Vec<ValidationError>> for SolverError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SolverError::InvalidProblem(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
