//! Minimum, maximum and absolute value.
use super::{exact_numbers, numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::{Datum, Number, ValueType};
use std::cmp::Ordering;

const MIN_INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::at_least("min.term", "Term", "A candidate for the minimum", ValueType::Number, 1)];

pub static MIN: OperationDescriptor = OperationDescriptor {
    id: "min",
    name: "Minimum",
    description: "Finds the smallest of one or more numbers",
    abbreviation: "min",
    categories: &[Category::Arithmetic, Category::Statistical],
    inputs: &MIN_INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

const MAX_INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::at_least("max.term", "Term", "A candidate for the maximum", ValueType::Number, 1)];

pub static MAX: OperationDescriptor = OperationDescriptor {
    id: "max",
    name: "Maximum",
    description: "Finds the largest of one or more numbers",
    abbreviation: "max",
    categories: &[Category::Arithmetic, Category::Statistical],
    inputs: &MAX_INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

const ABS_INPUTS: [ValueDescriptor; 1] =
    [ValueDescriptor::single("abs.term", "Term", "The number whose magnitude is taken", ValueType::Number)];

pub static ABSOLUTE_VALUE: OperationDescriptor = OperationDescriptor {
    id: "absolute_value",
    name: "Absolute Value",
    description: "Calculates the absolute value of a number",
    abbreviation: "abs",
    categories: &[Category::Arithmetic],
    inputs: &ABS_INPUTS,
    output: ValueType::Number,
    unique_inputs: true,
};

/// Picks the extreme term by numeric value, keeping the first on ties.
/// NaN terms never win.
fn extreme(values: &[Number], wanted: Ordering) -> Option<Number> {
    values.iter().copied().reduce(|best, n| match n.numeric_cmp(&best) {
        Some(ordering) if ordering == wanted => n,
        None if best.to_f64().is_nan() => n,
        _ => best,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl OperationKind for Min {
    fn descriptor(&self) -> &OperationDescriptor {
        &MIN
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        extreme(&numbers(terms, ctx.operation)?, Ordering::Less)
            .map(Datum::Number)
            .ok_or(ComputationError::Arity { operation: ctx.operation.to_string(), actual: 0 })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl OperationKind for Max {
    fn descriptor(&self) -> &OperationDescriptor {
        &MAX
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        extreme(&numbers(terms, ctx.operation)?, Ordering::Greater)
            .map(Datum::Number)
            .ok_or(ComputationError::Arity { operation: ctx.operation.to_string(), actual: 0 })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteValue;

impl OperationKind for AbsoluteValue {
    fn descriptor(&self) -> &OperationDescriptor {
        &ABSOLUTE_VALUE
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let [value] = exact_numbers::<1>(terms, ctx.operation)?;
        Ok(Datum::Number(value.abs()))
    }
}
