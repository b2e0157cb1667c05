//! SOPFLOW Core - Data model and expression language for the SOPFLOW
//! decision engine
//!
//! This crate holds the pure pieces of the system: the runtime `Value`
//! type, condition and decision configuration types, and the sandboxed
//! expression language used by custom conditions and custom logic
//! combinators. No I/O and no async code lives here.

pub mod condition;
pub mod decision;
pub mod error;
pub mod expr;
pub mod types;

// Re-export main types
pub use condition::{Condition, ConditionOperator, ConditionOutcome};
pub use decision::{
    DecisionConfig, DecisionMode, DecisionOption, LogicOperator, ManualChoice, TimeoutBehavior,
};
pub use error::{CoreError, Result};
pub use expr::{evaluate, parse, BinOp, EvalScope, Expr, ParseError, UnaryOp};
pub use types::Value;
