//! Finds the most common value(s) among numeric terms.
use super::{numbers, Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::{Datum, Number, ValueType};
use crate::validation::{MessageKey, ValidationProblems};

const INPUTS: [ValueDescriptor; 1] = [ValueDescriptor::at_least(
    "mode.term",
    "Input",
    "An input term used to determine the mode value of a set of terms",
    ValueType::Number,
    1,
)];

pub static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
    id: "mode",
    name: "Mode",
    description: "Finds the mode of two or more numbers",
    abbreviation: "mode",
    categories: &[Category::Arithmetic, Category::Statistical],
    inputs: &INPUTS,
    output: ValueType::List,
    unique_inputs: true,
};

/// Returns the set of values tied for the highest occurrence count, compared
/// by numeric value. When every value is distinct there is no mode and the
/// result is the empty set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mode;

/// Occurrence counts keyed by the first-seen representative of each numeric value.
fn tally(values: &[Number]) -> Vec<(Number, usize)> {
    let mut counts: Vec<(Number, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| seen.numeric_eq(value)) {
            Some((_, count)) => *count += 1,
            None => counts.push((*value, 1)),
        }
    }
    counts
}

pub fn mode_of(values: &[Number]) -> Vec<Number> {
    let counts = tally(values);
    let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let modes: Vec<Number> = counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(value, _)| value)
        .collect();

    if modes.len() == values.len() {
        Vec::new()
    } else {
        modes
    }
}

impl OperationKind for Mode {
    fn descriptor(&self) -> &OperationDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, terms: &[Term], ctx: &EvalContext<'_>, problems: &mut ValidationProblems) {
        if terms.len() == 1 {
            problems.add(ctx.warning(MessageKey::ModeOfSingleTerm, &[]));
        }
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let values = numbers(terms, ctx.operation)?;
        Ok(Datum::List(mode_of(&values).into_iter().map(Datum::Number).collect()))
    }
}
