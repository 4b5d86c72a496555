//! Result caching for evaluated operations.
pub mod ledger;

pub use ledger::{ComputationError, Ledger};
