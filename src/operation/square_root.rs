//! Square root of a single numeric term.
use super::{exact_numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::config::NegativeRootPolicy;
use crate::store::{Datum, ValueType};
use crate::validation::{MessageKey, ValidationProblems};

const INPUTS: [ValueDescriptor; 1] = [ValueDescriptor::single(
    "square_root.term",
    "Term",
    "The number whose square root is calculated",
    ValueType::Number,
)];

pub static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
    id: "square_root",
    name: "Square Root",
    description: "Calculates the square root of a number",
    abbreviation: "sqrt",
    categories: &[Category::Arithmetic],
    inputs: &INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

/// Floating-point square root. Negative terms follow
/// [`NegativeRootPolicy`]: NaN by default, or a validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareRoot;

impl OperationKind for SquareRoot {
    fn descriptor(&self) -> &OperationDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, terms: &[Term], ctx: &EvalContext<'_>, problems: &mut ValidationProblems) {
        if ctx.config.negative_square_root != NegativeRootPolicy::Reject {
            return;
        }
        for term in terms {
            if term.datum.as_number().is_some_and(|n| n.is_negative()) {
                problems.add(ctx.error(MessageKey::NegativeSquareRoot, &[&term.name]));
            }
        }
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let [value] = exact_numbers::<1>(terms, ctx.operation)?;
        Ok(Datum::from(value.to_f64().sqrt()))
    }
}
