use thiserror::Error;

use crate::domain::solver::SolveStatus;

/// Result type for facility siting operations
pub type Result<T> = std::result::Result<T, FacilityError>;

/// Errors that can occur while generating, modelling or solving a siting problem
#[derive(Error, Debug)]
pub enum FacilityError {
    /// Generator parameters cannot produce a well-posed scenario
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Zones or sites handed to the model builder are malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A linear model references unknown variables or carries bad numbers
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// The selected backend cannot express the model
    #[error("Solver {solver} cannot handle this model: {reason}")]
    UnsupportedModel { solver: String, reason: String },

    /// Unknown solver name
    #[error("Unknown solver: {0}")]
    UnknownSolver(String),

    /// The solver finished in a state the interpreter cannot turn into a plan
    #[error("Unexpected solver status: {0:?}")]
    UnexpectedStatus(SolveStatus),

    /// Solver output contradicts the model it was given
    #[error("Numerical inconsistency: {0}")]
    NumericalInconsistency(String),
}
