//! Text operations.
use super::{Category, EvalContext, OperationDescriptor, OperationKind, Term, ValueDescriptor};
use crate::compute::ComputationError;
use crate::store::{Datum, ValueType};

const CONCATENATE_INPUTS: [ValueDescriptor; 1] = [ValueDescriptor::at_least(
    "concatenate.term",
    "Term",
    "A piece of text being appended",
    ValueType::Text,
    1,
)];

pub static CONCATENATE: OperationDescriptor = OperationDescriptor {
    id: "concatenate",
    name: "Concatenate",
    description: "Joins one or more pieces of text",
    abbreviation: "concat",
    categories: &[Category::Text],
    inputs: &CONCATENATE_INPUTS,
    output: ValueType::Text,
    unique_inputs: false,
};

/// Joins terms in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concatenate;

impl OperationKind for Concatenate {
    fn descriptor(&self) -> &OperationDescriptor {
        &CONCATENATE
    }

    fn calculate(&self, terms: &[Term], ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
        let mut joined = String::new();
        for (index, term) in terms.iter().enumerate() {
            let text = term.datum.as_text().ok_or_else(|| ComputationError::UnexpectedTerm {
                operation: ctx.operation.to_string(),
                index,
                expected: "Text",
                found: term.datum.value_type().name(),
            })?;
            joined.push_str(text);
        }
        Ok(Datum::Text(joined))
    }
}
