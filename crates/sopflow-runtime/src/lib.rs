//! SOPFlow Runtime - Decision and execution engine for SOP workflows
//!
//! This crate provides the runtime that evaluates rule-driven decision
//! points and drives workflow step executions through their lifecycle:
//! validation, hooks, retry, timeout, and audit.

pub mod combinator;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod hooks;
pub mod result;
pub mod selector;
pub mod validation;

// Re-export main types
pub use combinator::{LogicCombinator, WeightedVerdict, WEIGHTED_PASS_THRESHOLD};
pub use context::{
    AuditEntry, ExecutionContext, ExecutionMetadata, ExecutionState,
};
pub use decision::{DecisionEngine, DecisionWork, ERROR_PENALTY, SPECIFIC_MATCH_BONUS};
pub use engine::{EngineConfig, ExecutionEngine, WorkUnit, HISTORY_LIMIT};
pub use error::{Result, RuntimeError};
pub use evaluator::ConditionEvaluator;
pub use hooks::{AuditHook, ExecutionHook, HookPhase, HookRegistry};
pub use result::{DecisionResult, ExecutionMetrics, ExecutionReport, ExecutionSummary};
pub use selector::OptionSelector;
pub use validation::{
    ComplianceCheck, ComplianceRule, ComplianceStatus, CustomRule, FinancialApprovalRule,
    PersonalDataConsentRule, Severity, ValidationFramework, ValidationIssue, ValidationReport,
};
