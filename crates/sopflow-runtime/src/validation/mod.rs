//! Validation framework
//!
//! Pre-execution validation runs three layers over the execution context:
//! structural basics, compliance rules, and user-registered custom rules.
//! Basic and compliance failures block execution (fail-closed); custom
//! rules that themselves error are logged and skipped (fail-open).

mod basic;
mod compliance;
mod custom;

pub use compliance::{ComplianceRule, FinancialApprovalRule, PersonalDataConsentRule};
pub use custom::CustomRule;

use crate::context::ExecutionContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Findings at this severity block execution
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path the finding refers to, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Human-readable message
    pub message: String,

    /// Stable machine-readable code
    pub code: String,

    /// Severity of the finding
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn new(
        field: Option<&str>,
        message: impl Into<String>,
        code: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            field: field.map(str::to_string),
            message: message.into(),
            code: code.into(),
            severity,
        }
    }
}

/// Outcome of one compliance rule check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    NotApplicable,
}

/// Record of one compliance rule run, kept for auditability regardless of
/// outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub rule_id: String,
    pub rule_name: String,
    pub status: ComplianceStatus,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Aggregated result of a validation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no blocking findings were recorded
    pub is_valid: bool,

    /// Blocking findings
    pub errors: Vec<ValidationIssue>,

    /// Non-blocking findings
    pub warnings: Vec<ValidationIssue>,

    /// Compliance checks performed, including compliant ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance: Vec<ComplianceCheck>,
}

impl ValidationReport {
    /// An empty, valid report
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// Record a finding, routing it to errors or warnings by severity
    pub fn push(&mut self, issue: ValidationIssue) {
        if issue.severity.is_blocking() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
        self.recompute();
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.compliance.extend(other.compliance);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.is_valid = self.errors.is_empty();
    }
}

/// Validation framework: owns the rule sets and runs the full pass
pub struct ValidationFramework {
    compliance_rules: Vec<Arc<dyn ComplianceRule>>,
    custom_rules: Vec<CustomRule>,
}

impl Default for ValidationFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationFramework {
    /// A framework with no compliance or custom rules
    pub fn new() -> Self {
        Self {
            compliance_rules: Vec::new(),
            custom_rules: Vec::new(),
        }
    }

    /// A framework preloaded with the built-in compliance rules
    pub fn with_defaults() -> Self {
        let mut framework = Self::new();
        framework.register_compliance(Arc::new(PersonalDataConsentRule));
        framework.register_compliance(Arc::new(FinancialApprovalRule));
        framework
    }

    /// Register a compliance rule
    pub fn register_compliance(&mut self, rule: Arc<dyn ComplianceRule>) {
        self.compliance_rules.push(rule);
    }

    /// Register a custom rule
    pub fn register_custom(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Run all three validation layers and merge their findings
    pub fn validate(&self, ctx: &ExecutionContext) -> ValidationReport {
        let mut report = basic::validate_basic(ctx);
        report.merge(compliance::run_compliance(&self.compliance_rules, ctx));
        report.merge(custom::run_custom(&self.custom_rules, ctx));
        report
    }
}
