//! The contract every operation kind implements, and the operation node that
//! carries an instance's inputs and diagnostics.
//!
//! A kind supplies three things: a [`OperationDescriptor`], a kind-specific
//! `validate` step layered on top of the generic rules in
//! [`crate::validation::validator`], and a `calculate` step. The engine only
//! calls `calculate` once validation reports no errors.

pub mod average;
pub mod basic;
pub mod catalog;
pub mod descriptor;
pub mod extrema;
pub mod mode;
pub mod power;
pub mod sign;
pub mod square_root;
pub mod text;

pub use catalog::{CatalogError, OperationCatalog};
pub use descriptor::{Category, OperationDescriptor, ValueDescriptor};

use crate::compute::ComputationError;
use crate::config::EngineConfig;
use crate::store::{Datum, Number, OperationId, ValueId};
use crate::validation::{MessageKey, ValidationProblem, ValidationProblems};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A fetched input handed to `validate` and `calculate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub value: ValueId,
    pub name: String,
    pub datum: Datum,
}

/// Identity and configuration visible to a kind while it validates or calculates.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub transformation: &'a str,
    pub operation: &'a str,
    pub config: &'a EngineConfig,
}

impl<'a> EvalContext<'a> {
    /// The owner recorded on problems: `transformation/operation`.
    pub fn owner(&self) -> String {
        format!("{}/{}", self.transformation, self.operation)
    }

    /// Message arguments always lead with the operation and transformation identifiers.
    fn args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(extra.len() + 2);
        args.push(self.operation.to_string());
        args.push(self.transformation.to_string());
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }

    pub fn error(&self, key: MessageKey, extra: &[&str]) -> ValidationProblem {
        ValidationProblem::error(self.owner(), key, self.args(extra))
    }

    pub fn warning(&self, key: MessageKey, extra: &[&str]) -> ValidationProblem {
        ValidationProblem::warning(self.owner(), key, self.args(extra))
    }
}

/// The capability set of an operation kind.
pub trait OperationKind: fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &OperationDescriptor;

    /// Appends kind-specific problems. Only called once the generic rules
    /// (arity, fetch, declared type) have passed, so every term is well typed.
    fn validate(&self, _terms: &[Term], _ctx: &EvalContext<'_>, _problems: &mut ValidationProblems) {}

    /// Computes the result. Only called when validation reported no errors.
    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError>;
}

/// Extracts every term as a number, for kinds whose terms are declared numeric.
pub fn numbers(terms: &[Term], operation: &str) -> Result<Vec<Number>, ComputationError> {
    terms
        .iter()
        .enumerate()
        .map(|(index, term)| {
            term.datum.as_number().ok_or_else(|| ComputationError::UnexpectedTerm {
                operation: operation.to_string(),
                index,
                expected: "Number",
                found: term.datum.value_type().name(),
            })
        })
        .collect()
}

/// Extracts exactly `N` numeric terms.
pub(crate) fn exact_numbers<const N: usize>(
    terms: &[Term],
    operation: &str,
) -> Result<[Number; N], ComputationError> {
    let values = numbers(terms, operation)?;
    values
        .try_into()
        .map_err(|v: Vec<Number>| ComputationError::Arity { operation: operation.to_string(), actual: v.len() })
}

/// Where an operation sits in its validate/compute lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    /// No inputs yet.
    Constructed,
    /// Inputs present, at least one error.
    Invalid,
    /// Error free, nothing cached.
    ValidUncomputed,
    /// Error free, result cached.
    ValidComputed,
}

/// One computation node inside a transformation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,
    pub name: String,
    kind: Arc<dyn OperationKind>,
    pub(crate) inputs: SmallVec<[ValueId; 4]>,
    pub(crate) problems: ValidationProblems,
    /// Set whenever the inputs or anything upstream changed since the last pass.
    pub(crate) stale: bool,
}

impl Operation {
    pub(crate) fn new(id: OperationId, name: String, kind: Arc<dyn OperationKind>) -> Self {
        Self { id, name, kind, inputs: SmallVec::new(), problems: ValidationProblems::new(), stale: true }
    }

    pub fn kind(&self) -> &Arc<dyn OperationKind> { &self.kind }
    pub fn descriptor(&self) -> &OperationDescriptor { self.kind.descriptor() }
    pub fn inputs(&self) -> &[ValueId] { &self.inputs }

    /// Problems from the most recent validation pass. Use
    /// `Transformation::problems` for a diagnosis guaranteed to be current.
    pub fn last_problems(&self) -> &ValidationProblems { &self.problems }

    pub fn is_stale(&self) -> bool { self.stale }
}
