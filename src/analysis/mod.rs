//! Dependency analysis over a transformation's operations.
pub mod topology;
