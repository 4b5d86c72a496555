//! Operation evaluation engine for model-to-model transformations.
//!
//! A [`Transformation`] owns literal values and typed operations whose terms
//! are either literals or the exposed results of other operations. Results are
//! computed lazily, cached, and discarded whenever anything upstream changes;
//! no result is ever produced while the operation has error problems.

pub mod analysis;
pub mod compute;
pub mod config;
pub mod display;
pub mod operation;
pub mod store;
pub mod transformation;
pub mod validation;

pub use config::{AveragePolicy, EngineConfig, NegativeRootPolicy};
pub use operation::{Category, OperationCatalog, OperationDescriptor, OperationKind, OperationState};
pub use store::{Datum, Number, OperationId, ValueId, ValueType};
pub use transformation::{EngineError, FetchError, Transformation};
pub use validation::{Localizer, MessageCatalog, MessageKey, Severity, ValidationProblem, ValidationProblems};
