//! Condition configuration and evaluation outcome types

pub mod types;

pub use types::{Condition, ConditionOperator, ConditionOutcome};
