//! Stable message keys and the localisation boundary.
//!
//! The engine only ever records a [`MessageKey`] plus positional arguments on a
//! problem. Turning them into text is the job of a [`Localizer`];
//! [`MessageCatalog`] is a template-based implementation with an English default.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKey {
    /// args: operation, transformation
    HasNoTerms,
    /// args: operation, transformation, count, min, max
    InvalidTermCount,
    /// args: operation, transformation, term, expected type, found type
    InvalidTermType,
    /// args: operation, transformation, term, reason
    OperationValidationError,
    /// args: operation, transformation, term
    DivideByZero,
    /// args: operation, transformation, term
    NegativeSquareRoot,
    /// args: operation, transformation
    ModeOfSingleTerm,
    /// args: transformation, operations
    CyclicDependency,
}

impl MessageKey {
    pub const ALL: [MessageKey; 8] = [
        MessageKey::HasNoTerms,
        MessageKey::InvalidTermCount,
        MessageKey::InvalidTermType,
        MessageKey::OperationValidationError,
        MessageKey::DivideByZero,
        MessageKey::NegativeSquareRoot,
        MessageKey::ModeOfSingleTerm,
        MessageKey::CyclicDependency,
    ];

    /// The stable identifier used to look the message up in a catalog.
    pub fn code(&self) -> &'static str {
        match self {
            MessageKey::HasNoTerms => "operation.has_no_terms",
            MessageKey::InvalidTermCount => "operation.invalid_term_count",
            MessageKey::InvalidTermType => "operation.invalid_term_type",
            MessageKey::OperationValidationError => "operation.validation_error",
            MessageKey::DivideByZero => "operation.divide_by_zero",
            MessageKey::NegativeSquareRoot => "operation.negative_square_root",
            MessageKey::ModeOfSingleTerm => "operation.mode_single_term",
            MessageKey::CyclicDependency => "transformation.cyclic_dependency",
        }
    }

    fn english(&self) -> &'static str {
        match self {
            MessageKey::HasNoTerms => "Operation '{0}' in transformation '{1}' has no terms",
            MessageKey::InvalidTermCount => {
                "Operation '{0}' in transformation '{1}' has an invalid term count of {2} (expected {3} to {4})"
            }
            MessageKey::InvalidTermType => {
                "Operation '{0}' in transformation '{1}' has term '{2}' of type {4} where {3} is required"
            }
            MessageKey::OperationValidationError => {
                "Operation '{0}' in transformation '{1}' could not read term '{2}': {3}"
            }
            MessageKey::DivideByZero => "Operation '{0}' in transformation '{1}' divides by zero term '{2}'",
            MessageKey::NegativeSquareRoot => {
                "Operation '{0}' in transformation '{1}' takes the square root of negative term '{2}'"
            }
            MessageKey::ModeOfSingleTerm => {
                "Operation '{0}' in transformation '{1}' has a single term, so it has no mode"
            }
            MessageKey::CyclicDependency => "Transformation '{0}' has a dependency cycle through {1}",
        }
    }
}

/// External message lookup.
pub trait Localizer: Send + Sync {
    fn localize(&self, key: MessageKey, args: &[String]) -> String;
}

/// Positional-template message catalog (`{0}`, `{1}`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = MessageKey::ALL
            .iter()
            .map(|key| (key.code().to_string(), key.english().to_string()))
            .collect();
        Self { templates }
    }
}

impl MessageCatalog {
    /// The shared English catalog.
    pub fn english() -> &'static MessageCatalog {
        static ENGLISH: OnceLock<MessageCatalog> = OnceLock::new();
        ENGLISH.get_or_init(MessageCatalog::default)
    }

    /// Builds a catalog from a JSON object of `code -> template`, layered over
    /// the English defaults so untranslated keys still render.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        let mut catalog = Self::default();
        catalog.templates.extend(overrides);
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn template(&self, key: MessageKey) -> &str {
        self.templates.get(key.code()).map_or(key.english(), String::as_str)
    }
}

impl Localizer for MessageCatalog {
    fn localize(&self, key: MessageKey, args: &[String]) -> String {
        render(self.template(key), args)
    }
}

/// Substitutes `{n}` placeholders in a single pass over `template`.
///
/// Inserted arguments are never rescanned. Placeholders without a matching
/// argument are kept verbatim.
fn render(template: &str, args: &[String]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|index| (index, close)))
            .and_then(|(index, close)| args.get(index).map(|arg| (arg, close)));
        match arg {
            Some((arg, close)) => {
                text.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text
}
