//! Custom validation rules
//!
//! Custom rules reuse the condition machinery: preconditions decide
//! whether the rule applies, checks decide whether it holds. Unlike the
//! compliance layer, a custom rule that errors is logged and skipped
//! rather than blocking the run.

use super::{Severity, ValidationIssue, ValidationReport};
use crate::context::ExecutionContext;
use crate::evaluator::ConditionEvaluator;
use sopflow_core::Condition;

/// A user-registered validation rule built from conditions
#[derive(Debug, Clone)]
pub struct CustomRule {
    /// Stable rule id, used as the finding code
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Severity of a failed check
    pub severity: Severity,

    /// The rule applies only when every precondition passes
    pub preconditions: Vec<Condition>,

    /// Checks that must all pass when the rule applies
    pub checks: Vec<Condition>,

    /// Message recorded when a check fails
    pub message: String,
}

impl CustomRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        checks: Vec<Condition>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            severity,
            preconditions: Vec::new(),
            checks,
            message: message.into(),
        }
    }

    /// Gate the rule behind preconditions
    pub fn with_preconditions(mut self, preconditions: Vec<Condition>) -> Self {
        self.preconditions = preconditions;
        self
    }
}

/// Run every applicable custom rule. Rules whose conditions error are
/// skipped after a log line.
pub fn run_custom(rules: &[CustomRule], ctx: &ExecutionContext) -> ValidationReport {
    let mut report = ValidationReport::valid();

    'rules: for rule in rules {
        for pre in &rule.preconditions {
            let outcome = ConditionEvaluator::evaluate(pre, ctx);
            if let Some(error) = outcome.error {
                tracing::warn!(rule = %rule.id, condition = %pre.id, %error, "custom rule precondition errored, skipping rule");
                continue 'rules;
            }
            if !outcome.passed {
                continue 'rules;
            }
        }

        for check in &rule.checks {
            let outcome = ConditionEvaluator::evaluate(check, ctx);
            if let Some(error) = outcome.error {
                tracing::warn!(rule = %rule.id, condition = %check.id, %error, "custom rule check errored, skipping rule");
                continue 'rules;
            }
            if !outcome.passed {
                report.push(ValidationIssue::new(
                    Some(&check.field),
                    rule.message.clone(),
                    rule.id.clone(),
                    rule.severity,
                ));
            }
        }
    }

    report
}
