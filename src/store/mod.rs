//! Typed data, value identity, and the arena that owns a transformation's members.
pub mod number;
pub mod registry;
pub mod types;

pub use number::{Number, NumericDomain};
pub use registry::Registry;
pub use types::{Datum, OperationId, Value, ValueId, ValueSource, ValueType};
