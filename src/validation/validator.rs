//! The generic validation rules every operation passes through before its
//! kind-specific checks.
use super::error::ValidationProblems;
use super::messages::MessageKey;
use crate::operation::{EvalContext, OperationKind, Term};
use crate::store::{Datum, ValueId, ValueType};
use crate::transformation::FetchError;

/// One input as seen by a validation pass: the fetch may have failed.
#[derive(Debug, Clone)]
pub struct FetchedTerm {
    pub value: ValueId,
    pub name: String,
    pub fetched: Result<Datum, FetchError>,
}

/// Runs a complete validation pass and returns a freshly built problem set.
///
/// Every generic rule is evaluated so the caller sees all issues at once:
/// 1. no terms at all (nothing else is checked);
/// 2. term count outside the descriptor's bounds;
/// 3. terms whose fetch failed;
/// 4. terms whose datum is not an instance of the declared slot type.
///
/// The kind's own `validate` only runs when none of these produced an error.
pub fn validate_operation(
    kind: &dyn OperationKind,
    ctx: &EvalContext<'_>,
    fetched: Vec<FetchedTerm>,
) -> ValidationProblems {
    let mut problems = ValidationProblems::new();
    let descriptor = kind.descriptor();

    if fetched.is_empty() {
        problems.add(ctx.error(MessageKey::HasNoTerms, &[]));
        return problems;
    }

    let count = fetched.len();
    let min = descriptor.min_terms();
    let max = descriptor.max_terms();
    if count < min || max.is_some_and(|max| count > max) {
        let max_str = max.map_or_else(|| "unbounded".to_string(), |m| m.to_string());
        problems.add(ctx.error(
            MessageKey::InvalidTermCount,
            &[&count.to_string(), &min.to_string(), &max_str],
        ));
    }

    let mut terms = Vec::with_capacity(count);
    for (index, term) in fetched.into_iter().enumerate() {
        match term.fetched {
            Err(e) => {
                problems.add(ctx.error(MessageKey::OperationValidationError, &[&term.name, &e.to_string()]));
            }
            Ok(datum) => {
                let expected = descriptor.input_for(index).map_or(ValueType::Any, |d| d.value_type);
                if expected.accepts(&datum) {
                    terms.push(Term { value: term.value, name: term.name, datum });
                } else {
                    problems.add(ctx.error(
                        MessageKey::InvalidTermType,
                        &[&term.name, expected.name(), datum.value_type().name()],
                    ));
                }
            }
        }
    }

    if problems.is_ok() {
        kind.validate(&terms, ctx, &mut problems);
    }
    problems
}
