//! Validation diagnostics and the generic rules applied to every operation.
//!
//! Problems are never patched in place: each pass builds a new
//! [`ValidationProblems`] that replaces the previous one wholesale.
pub mod error;
pub mod messages;
pub mod validator;

pub use error::{Severity, ValidationProblem, ValidationProblems};
pub use messages::{Localizer, MessageCatalog, MessageKey};
pub use validator::{validate_operation, FetchedTerm};
