//! Sign (-1, 0 or 1) of a single numeric term.
use super::{exact_numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::{Datum, Number, ValueType};

const INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::single("sign.term", "Term", "The number whose sign is calculated", ValueType::Number)];

pub static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
    id: "sign",
    name: "Sign",
    description: "Calculates the sign (0, 1, or -1) of a number",
    abbreviation: "signum",
    categories: &[Category::Arithmetic],
    inputs: &INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

/// Decimal terms use decimal sign semantics, floats use `signum` with zero
/// and NaN mapping to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sign;

impl OperationKind for Sign {
    fn descriptor(&self) -> &OperationDescriptor {
        &DESCRIPTOR
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let [value] = exact_numbers::<1>(terms, ctx.operation)?;
        Ok(Datum::Number(Number::Int(value.signum())))
    }
}
