//! Arithmetic mean of one or more numeric terms.
use super::{numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::config::AveragePolicy;
use crate::store::number::{mean_float, mean_promoted};
use crate::store::{Datum, Number, ValueType};

const INPUTS: [ValueDescriptor; 1] = [ValueDescriptor::at_least(
    "average.term",
    "Term",
    "A number contributing to the average",
    ValueType::Number,
    1,
)];

pub static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
    id: "average",
    name: "Average",
    description: "Calculates the average of one or more numbers",
    abbreviation: "avg",
    categories: &[Category::Arithmetic],
    inputs: &INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

/// Sums the terms and divides by their count.
///
/// Under [`AveragePolicy::Promote`] the result domain is the widest among the
/// terms, so an all-integer average truncates toward zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Average;

impl OperationKind for Average {
    fn descriptor(&self) -> &OperationDescriptor {
        &DESCRIPTOR
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let values = numbers(terms, ctx.operation)?;
        let mean = match ctx.config.average {
            AveragePolicy::Promote => mean_promoted(&values),
            AveragePolicy::AlwaysFloat => (!values.is_empty()).then(|| Number::Float(mean_float(&values))),
        };
        mean.map(Datum::Number)
            .ok_or(ComputationError::Arity { operation: ctx.operation.to_string(), actual: 0 })
    }
}
