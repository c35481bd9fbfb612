//! Capture source implementations.

pub mod synthetic;

pub use synthetic::{SyntheticOpener, SyntheticSource};
