//! Raises a base to an exponent.
use super::{exact_numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::{Datum, ValueType};

const INPUTS: [ValueDescriptor; 2] = [
    ValueDescriptor::single("power.base", "Base", "The number being raised", ValueType::Number),
    ValueDescriptor::single("power.exponent", "Exponent", "The power the base is raised to", ValueType::Number),
];

pub static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
    id: "power",
    name: "Power",
    description: "Raises a base number to the power of an exponent",
    abbreviation: "pow",
    categories: &[Category::Arithmetic],
    inputs: &INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

/// Always calculated in floating point, whatever the terms' domains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Power;

impl OperationKind for Power {
    fn descriptor(&self) -> &OperationDescriptor {
        &DESCRIPTOR
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let [base, exponent] = exact_numbers::<2>(terms, ctx.operation)?;
        Ok(Datum::from(base.to_f64().powf(exponent.to_f64())))
    }
}
