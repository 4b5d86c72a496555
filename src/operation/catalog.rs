//! Discovery of operation kinds by id, abbreviation and category.
use super::average::Average;
use super::basic::{Add, Divide, Multiply, Subtract};
use super::extrema::{AbsoluteValue, Max, Min};
use super::mode::Mode;
use super::power::Power;
use super::sign::Sign;
use super::square_root::SquareRoot;
use super::text::Concatenate;
use super::{Category, OperationDescriptor, OperationKind};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("An operation kind with id '{0}' is already registered")]
    DuplicateKind(String),
}

/// An ordered set of operation kinds, keyed by descriptor id.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    kinds: Vec<Arc<dyn OperationKind>>,
}

impl OperationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind the crate ships with.
    pub fn builtin() -> Self {
        let kinds: Vec<Arc<dyn OperationKind>> = vec![
            Arc::new(Average),
            Arc::new(Mode),
            Arc::new(Sign),
            Arc::new(Power),
            Arc::new(SquareRoot),
            Arc::new(Add),
            Arc::new(Subtract),
            Arc::new(Multiply),
            Arc::new(Divide),
            Arc::new(Min),
            Arc::new(Max),
            Arc::new(AbsoluteValue),
            Arc::new(Concatenate),
        ];
        Self { kinds }
    }

    pub fn register(&mut self, kind: Arc<dyn OperationKind>) -> Result<(), CatalogError> {
        let id = kind.descriptor().id;
        if self.kinds.iter().any(|k| k.descriptor().id == id) {
            return Err(CatalogError::DuplicateKind(id.to_string()));
        }
        self.kinds.push(kind);
        Ok(())
    }

    /// Looks a kind up by descriptor id, falling back to its abbreviation.
    pub fn get(&self, key: &str) -> Option<Arc<dyn OperationKind>> {
        self.kinds
            .iter()
            .find(|k| k.descriptor().id == key)
            .or_else(|| self.kinds.iter().find(|k| k.descriptor().abbreviation == key))
            .cloned()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Arc<dyn OperationKind>> {
        self.kinds.iter().filter(move |k| k.descriptor().has_category(category))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.kinds.iter().map(|k| k.descriptor())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
