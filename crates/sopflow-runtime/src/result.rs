//! Boundary result types
//!
//! Everything the hosting layer consumes is JSON-serializable: the
//! decision result routes the workflow to its next step, and the execution
//! report carries the outcome, metrics, validation, and logs of one run.

use crate::context::{ExecutionContext, ExecutionState};
use crate::validation::ValidationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sopflow_core::{ConditionOutcome, Value};
use uuid::Uuid;

/// Result of evaluating one decision point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Id of the decision point
    pub decision_id: String,

    /// Id of the selected option, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,

    /// Name of the selected option, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_name: Option<String>,

    /// Whether the decision was made automatically
    pub is_automated: bool,

    /// Free-text reason for the outcome
    pub reason: String,

    /// Confidence score in [0, 100]
    pub confidence: f64,

    /// Evaluation time in milliseconds
    pub duration_ms: u64,

    /// Human-readable evaluation trace, one line per step
    pub decision_path: Vec<String>,

    /// Per-condition outcomes of this pass
    pub condition_outcomes: Vec<ConditionOutcome>,

    /// Ids of other options that also matched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,

    /// Set when no option matched and a human must decide
    pub requires_manual_intervention: bool,

    /// Set when evaluation failed and the run should escalate
    pub requires_escalation: bool,

    /// Identity of the decision maker (manual decisions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,

    /// When the decision was made
    pub timestamp: DateTime<Utc>,

    /// Next-step reference carried from the selected option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,

    /// Whether the selected option terminates the workflow
    pub terminate: bool,
}

/// Timing and retry metrics for one execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Wall-clock duration of the whole run in milliseconds
    pub total_ms: u64,

    /// Time spent in validation
    pub validation_ms: u64,

    /// Time spent in the work function (all attempts)
    pub work_ms: u64,

    /// Number of retries performed (attempts beyond the first)
    pub retry_count: u32,
}

/// Result of running one execution through the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Id of the run
    pub execution_id: Uuid,

    /// Whether the run completed successfully
    pub success: bool,

    /// Output of the work function on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Final lifecycle state
    pub state: ExecutionState,

    /// Timing metrics
    pub metrics: ExecutionMetrics,

    /// Validation report, when validation ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,

    /// Per-run log lines collected by the engine
    pub logs: Vec<String>,

    /// Final context, including audit trail and variables
    pub context: ExecutionContext,
}

/// Compact history record kept after a run finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub execution_id: Uuid,
    pub metadata_id: String,
    pub state: ExecutionState,
    pub success: bool,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}
