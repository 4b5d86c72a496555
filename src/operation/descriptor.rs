//! Static metadata describing an operation kind and its inputs.

use crate::store::ValueType;
use serde::Serialize;
use std::fmt;

/// Discovery tags for grouping operation kinds. They carry no computational effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Arithmetic,
    Statistical,
    Text,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Arithmetic => "arithmetic",
            Category::Statistical => "statistical",
            Category::Text => "text",
        };
        f.write_str(name)
    }
}

/// Describes one declared input slot of an operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: ValueType,
    pub required: bool,
    /// Minimum number of terms this slot needs.
    pub min_count: usize,
    /// Maximum number of terms this slot takes; `None` is unbounded.
    pub max_count: Option<usize>,
    /// Whether the slot accepts more than one term.
    pub multiple: bool,
}

impl ValueDescriptor {
    /// A slot taking exactly one term of `value_type`.
    pub const fn single(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        value_type: ValueType,
    ) -> Self {
        Self {
            id,
            name,
            description,
            value_type,
            required: true,
            min_count: 1,
            max_count: Some(1),
            multiple: false,
        }
    }

    /// A slot taking `min_count` or more terms of `value_type`.
    pub const fn at_least(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        value_type: ValueType,
        min_count: usize,
    ) -> Self {
        Self {
            id,
            name,
            description,
            value_type,
            required: true,
            min_count,
            max_count: None,
            multiple: true,
        }
    }
}

/// Immutable metadata for an operation kind, shared by all of its instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub abbreviation: &'static str,
    pub categories: &'static [Category],
    /// Declared input slots, in positional order.
    pub inputs: &'static [ValueDescriptor],
    pub output: ValueType,
    /// Whether the same value may appear more than once among the inputs.
    pub unique_inputs: bool,
}

impl OperationDescriptor {
    pub fn min_terms(&self) -> usize {
        self.inputs.iter().filter(|d| d.required).map(|d| d.min_count).sum()
    }

    /// `None` when any slot is unbounded.
    pub fn max_terms(&self) -> Option<usize> {
        self.inputs.iter().try_fold(0usize, |acc, d| d.max_count.map(|max| acc + max))
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// The slot a term at `index` is matched against.
    ///
    /// Slots are filled in order up to their maximum; terms beyond every
    /// slot's capacity fall to the last slot so they are still type checked.
    pub fn input_for(&self, index: usize) -> Option<&ValueDescriptor> {
        let mut start = 0usize;
        for descriptor in self.inputs {
            match descriptor.max_count {
                None => return Some(descriptor),
                Some(max) if index < start + max => return Some(descriptor),
                Some(max) => start += max,
            }
        }
        self.inputs.last()
    }
}
