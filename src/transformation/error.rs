use crate::compute::ComputationError;
use crate::store::{OperationId, ValueId};
use crate::validation::ValidationProblems;
use thiserror::Error;

/// Why a value could not produce a datum. Reported as a validation problem
/// by the consuming operation, never propagated through `validate`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("value {0} does not exist")]
    UnknownValue(ValueId),
    #[error("producing operation {0} has been removed")]
    OperationRemoved(OperationId),
    #[error("operation {0} depends on its own result")]
    Cycle(OperationId),
    #[error("upstream operation '{operation}' failed: {reason}")]
    Upstream { operation: String, reason: String },
}

/// Hard failures surfaced by the transformation API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Operation '{operation}' is not ready: {problems}")]
    NotReady { operation: String, problems: ValidationProblems },
    #[error("Unknown operation {0}")]
    UnknownOperation(OperationId),
    #[error("Unknown value {0}")]
    UnknownValue(ValueId),
    #[error("Identifier '{0}' is already used in this transformation")]
    DuplicateIdentifier(String),
    #[error("Value {value} is already an input of operation '{operation}'")]
    DuplicateInput { operation: String, value: ValueId },
    #[error("Value {value} is not an input of operation '{operation}'")]
    InputNotFound { operation: String, value: ValueId },
    #[error("Value {0} is not a literal")]
    NotALiteral(ValueId),
    #[error("Dependency cycle through operations {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl EngineError {
    /// The blocking problems, for `NotReady`.
    pub fn problems(&self) -> Option<&ValidationProblems> {
        match self {
            EngineError::NotReady { problems, .. } => Some(problems),
            _ => None,
        }
    }
}
