//! The four basic arithmetic kinds.
use super::{exact_numbers, numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::number::{difference, product, sum};
use crate::store::{Datum, Number, ValueType};
use crate::validation::{MessageKey, ValidationProblems};

const ADD_INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::at_least("add.term", "Addend", "A number being added", ValueType::Number, 1)];

pub static ADD: OperationDescriptor = OperationDescriptor {
    id: "add",
    name: "Add",
    description: "Adds one or more numbers",
    abbreviation: "+",
    categories: &[Category::Arithmetic],
    inputs: &ADD_INPUTS,
    output: ValueType::Number,
    unique_inputs: false,
};

const SUBTRACT_INPUTS: [ValueDescriptor; 2] = [
    ValueDescriptor::single("subtract.minuend", "Minuend", "The number being subtracted from", ValueType::Number),
    ValueDescriptor::at_least("subtract.subtrahend", "Subtrahend", "A number being subtracted", ValueType::Number, 1),
];

pub static SUBTRACT: OperationDescriptor = OperationDescriptor {
    id: "subtract",
    name: "Subtract",
    description: "Subtracts one or more numbers from the first",
    abbreviation: "-",
    categories: &[Category::Arithmetic],
    inputs: &SUBTRACT_INPUTS,
    output: ValueType::Number,
    unique_inputs: false,
};

const MULTIPLY_INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::at_least("multiply.term", "Factor", "A number being multiplied", ValueType::Number, 1)];

pub static MULTIPLY: OperationDescriptor = OperationDescriptor {
    id: "multiply",
    name: "Multiply",
    description: "Multiplies one or more numbers",
    abbreviation: "*",
    categories: &[Category::Arithmetic],
    inputs: &MULTIPLY_INPUTS,
    output: ValueType::Number,
    unique_inputs: false,
};

const DIVIDE_INPUTS: [ValueDescriptor; 2] = [
    ValueDescriptor::single("divide.dividend", "Dividend", "The number being divided", ValueType::Number),
    ValueDescriptor::single("divide.divisor", "Divisor", "The number to divide by", ValueType::Number),
];

pub static DIVIDE: OperationDescriptor = OperationDescriptor {
    id: "divide",
    name: "Divide",
    description: "Divides one number by another",
    abbreviation: "/",
    categories: &[Category::Arithmetic],
    inputs: &DIVIDE_INPUTS,
    output: ValueType::Number,
    unique_inputs: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl OperationKind for Add {
    fn descriptor(&self) -> &OperationDescriptor {
        &ADD
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        Ok(Datum::Number(sum(&numbers(terms, ctx.operation)?)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtract;

impl OperationKind for Subtract {
    fn descriptor(&self) -> &OperationDescriptor {
        &SUBTRACT
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        difference(&numbers(terms, ctx.operation)?)
            .map(Datum::Number)
            .ok_or(ComputationError::Arity { operation: ctx.operation.to_string(), actual: 0 })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

impl OperationKind for Multiply {
    fn descriptor(&self) -> &OperationDescriptor {
        &MULTIPLY
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        Ok(Datum::Number(product(&numbers(terms, ctx.operation)?)))
    }
}

/// Floating-point quotient. A zero divisor is a validation error, so
/// `calculate` never sees one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

impl OperationKind for Divide {
    fn descriptor(&self) -> &OperationDescriptor {
        &DIVIDE
    }

    fn validate(&self, terms: &[Term], ctx: &EvalContext<'_>, problems: &mut ValidationProblems) {
        if let Some(divisor) = terms.get(1) {
            if divisor.datum.as_number().is_some_and(|n| n.is_zero()) {
                problems.add(ctx.error(MessageKey::DivideByZero, &[&divisor.name]));
            }
        }
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let [dividend, divisor] = exact_numbers::<2>(terms, ctx.operation)?;
        Ok(Datum::Number(Number::Float(dividend.to_f64() / divisor.to_f64())))
    }
}
