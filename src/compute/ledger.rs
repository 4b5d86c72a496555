use crate::store::{Datum, OperationId};
use thiserror::Error;

/// Failures raised from inside a kind's `calculate`.
///
/// The engine only calculates once validation reports no errors, so these
/// signal a kind whose validation does not cover its calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Operation '{operation}' received term {index} of type {found} where {expected} was required")]
    UnexpectedTerm { operation: String, index: usize, expected: &'static str, found: &'static str },
    #[error("Operation '{operation}' received {actual} terms")]
    Arity { operation: String, actual: usize },
}

/// Cached results, indexed densely by operation.
///
/// A slot is only ever filled by a successful calculation over an error-free
/// operation, and is emptied whenever the operation or anything upstream of it changes.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: Vec<Option<Datum>>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn ensure_capacity(&mut self, size: usize) {
        if self.values.len() < size {
            self.values.resize(size, None);
        }
    }

    #[inline(always)]
    pub fn get(&self, op: OperationId) -> Option<&Datum> {
        self.values.get(op.index())?.as_ref()
    }

    pub fn contains(&self, op: OperationId) -> bool {
        self.get(op).is_some()
    }

    #[inline(always)]
    pub fn insert(&mut self, op: OperationId, value: Datum) {
        let idx = op.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    pub fn invalidate(&mut self, ops: impl IntoIterator<Item = OperationId>) {
        for id in ops {
            if let Some(slot) = self.values.get_mut(id.index()) {
                *slot = None;
            }
        }
    }
}
