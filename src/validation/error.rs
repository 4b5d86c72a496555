//! Defines the diagnostics produced by validation passes.
use super::messages::{Localizer, MessageCatalog, MessageKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a validation problem is. Only `Error` blocks computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single immutable diagnostic about an operation or transformation.
///
/// The problem carries a stable message key plus positional arguments; the
/// final text is produced by a [`Localizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblem {
    severity: Severity,
    owner: String,
    key: MessageKey,
    args: Vec<String>,
}

impl ValidationProblem {
    pub fn new(severity: Severity, owner: impl Into<String>, key: MessageKey, args: Vec<String>) -> Self {
        Self { severity, owner: owner.into(), key, args }
    }

    pub fn error(owner: impl Into<String>, key: MessageKey, args: Vec<String>) -> Self {
        Self::new(Severity::Error, owner, key, args)
    }

    pub fn warning(owner: impl Into<String>, key: MessageKey, args: Vec<String>) -> Self {
        Self::new(Severity::Warning, owner, key, args)
    }

    pub fn info(owner: impl Into<String>, key: MessageKey, args: Vec<String>) -> Self {
        Self::new(Severity::Info, owner, key, args)
    }

    pub fn severity(&self) -> Severity { self.severity }
    pub fn owner(&self) -> &str { &self.owner }
    pub fn key(&self) -> MessageKey { self.key }
    pub fn args(&self) -> &[String] { &self.args }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Renders the message through the given localizer.
    pub fn message(&self, localizer: &dyn Localizer) -> String {
        localizer.localize(self.key, &self.args)
    }
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}", severity, self.message(MessageCatalog::english()))
    }
}

/// An ordered collection of problems. Severity summaries are always derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblems {
    problems: Vec<ValidationProblem>,
}

impl ValidationProblems {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, problem: ValidationProblem) {
        self.problems.push(problem);
    }

    pub fn extend(&mut self, other: &ValidationProblems) {
        self.problems.extend(other.problems.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.problems.clear();
    }

    /// True iff at least one problem has error severity.
    pub fn is_error(&self) -> bool {
        self.problems.iter().any(ValidationProblem::is_error)
    }

    /// True when no problem has error severity (warnings and infos are fine).
    pub fn is_ok(&self) -> bool {
        !self.is_error()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.problems.iter().filter(|p| p.severity == severity).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationProblem> {
        self.problems.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationProblem> {
        self.problems.iter().filter(|p| p.is_error())
    }

    pub fn contains_key(&self, key: MessageKey) -> bool {
        self.problems.iter().any(|p| p.key == key)
    }
}

impl<'a> IntoIterator for &'a ValidationProblems {
    type Item = &'a ValidationProblem;
    type IntoIter = std::slice::Iter<'a, ValidationProblem>;

    fn into_iter(self) -> Self::IntoIter {
        self.problems.iter()
    }
}

impl fmt::Display for ValidationProblems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", problem)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_severity_is_derived() {
        let mut problems = ValidationProblems::new();
        assert!(problems.is_empty());
        assert!(problems.is_ok());
        assert!(!problems.is_error());

        problems.add(ValidationProblem::warning("t/mode", MessageKey::ModeOfSingleTerm, args(&["mode", "t"])));
        assert!(!problems.is_empty());
        assert!(problems.is_ok());

        problems.add(ValidationProblem::error("t/mode", MessageKey::HasNoTerms, args(&["mode", "t"])));
        assert!(problems.is_error());
        assert_eq!(problems.count(Severity::Error), 1);
        assert_eq!(problems.count(Severity::Warning), 1);

        problems.clear();
        assert!(problems.is_ok());
        assert!(problems.is_empty());
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut problems = ValidationProblems::new();
        problems.add(ValidationProblem::info("t", MessageKey::HasNoTerms, vec![]));
        problems.add(ValidationProblem::error("t", MessageKey::InvalidTermCount, vec![]));
        let keys: Vec<_> = problems.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec![MessageKey::HasNoTerms, MessageKey::InvalidTermCount]);
    }

    #[test]
    fn test_display_uses_english_catalog() {
        let problem = ValidationProblem::error("t/avg", MessageKey::HasNoTerms, args(&["avg", "t"]));
        assert_eq!(problem.to_string(), "error: Operation 'avg' in transformation 't' has no terms");
    }
}
