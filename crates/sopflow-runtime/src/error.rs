//! Runtime error types
//!
//! The taxonomy mirrors how callers are expected to react: configuration
//! errors surface synchronously before any work starts, evaluation errors
//! stay contained in condition outcomes, and execution errors are carried
//! on the execution report.

use sopflow_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Missing or inconsistent decision/engine configuration
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// Manual decision submitted without the required justification
    #[error("Justification required for manual decision")]
    JustificationRequired,

    /// Referenced option id does not exist in the decision configuration
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Custom combinator expression failed; a configuration defect, so it
    /// propagates instead of being swallowed like condition-level errors
    #[error("Custom logic failed: {0}")]
    CustomLogic(String),

    /// Automated decision evaluation failed and was escalated
    #[error("Decision evaluation failed: {0}")]
    DecisionFailed(String),

    /// Validation blocked the execution
    #[error("Validation failed with {error_count} error(s)")]
    ValidationFailed { error_count: usize },

    /// Work function exceeded the configured timeout
    #[error("Execution timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Run was cancelled while in flight
    #[error("Execution cancelled")]
    Cancelled,

    /// Work function failed after exhausting the retry budget
    #[error("Work failed: {0}")]
    WorkFailed(String),

    /// Error bubbled up from the core expression layer
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
