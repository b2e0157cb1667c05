//! Compliance rules
//!
//! Compliance rules inspect the execution context and report a status.
//! A rule that fails to run at all is treated as a blocking finding: the
//! engine must not proceed on the strength of a check it could not
//! perform.

use super::{ComplianceCheck, ComplianceStatus, Severity, ValidationIssue, ValidationReport};
use crate::context::ExecutionContext;
use std::collections::HashSet;
use std::sync::Arc;

/// A pluggable compliance rule
pub trait ComplianceRule: Send + Sync {
    /// Stable rule id
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Severity of a non-compliant finding
    fn severity(&self) -> Severity;

    /// Check the context. `Err` means the rule could not run.
    fn check(&self, ctx: &ExecutionContext) -> Result<ComplianceStatus, String>;
}

/// Run every rule, recording each check and converting non-compliance into
/// findings by rule severity
pub fn run_compliance(
    rules: &[Arc<dyn ComplianceRule>],
    ctx: &ExecutionContext,
) -> ValidationReport {
    let mut report = ValidationReport::valid();

    for rule in rules {
        match rule.check(ctx) {
            Ok(status) => {
                report.compliance.push(ComplianceCheck {
                    rule_id: rule.id().to_string(),
                    rule_name: rule.name().to_string(),
                    status,
                    severity: rule.severity(),
                    details: None,
                });
                if status == ComplianceStatus::NonCompliant {
                    report.push(ValidationIssue::new(
                        None,
                        format!("compliance rule '{}' is not satisfied", rule.name()),
                        "COMPLIANCE_VIOLATION",
                        rule.severity(),
                    ));
                }
            }
            Err(e) => {
                tracing::warn!(rule = rule.id(), error = %e, "compliance rule failed to run");
                report.compliance.push(ComplianceCheck {
                    rule_id: rule.id().to_string(),
                    rule_name: rule.name().to_string(),
                    status: ComplianceStatus::NonCompliant,
                    severity: Severity::Error,
                    details: Some(e.clone()),
                });
                report.push(ValidationIssue::new(
                    None,
                    format!("compliance rule '{}' could not be evaluated: {}", rule.name(), e),
                    "COMPLIANCE_RULE_FAILED",
                    Severity::Error,
                ));
            }
        }
    }

    report
}

/// Personal data may only be processed with recorded consent.
///
/// Applies when the input carries a truthy `personal_data` marker; the
/// input must then also carry a truthy `consent`.
pub struct PersonalDataConsentRule;

impl ComplianceRule for PersonalDataConsentRule {
    fn id(&self) -> &str {
        "personal-data-consent"
    }

    fn name(&self) -> &str {
        "Personal data requires consent"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn check(&self, ctx: &ExecutionContext) -> Result<ComplianceStatus, String> {
        let handles_personal_data = ctx
            .resolve_field("input.personal_data")
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if !handles_personal_data {
            return Ok(ComplianceStatus::NotApplicable);
        }

        let consented = ctx
            .resolve_field("input.consent")
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if consented {
            Ok(ComplianceStatus::Compliant)
        } else {
            Ok(ComplianceStatus::NonCompliant)
        }
    }
}

/// Financial steps need approval from at least two distinct actors.
///
/// Applies when the step category is `financial`; the audit trail must
/// then contain `approved` entries from two or more different actors.
pub struct FinancialApprovalRule;

impl ComplianceRule for FinancialApprovalRule {
    fn id(&self) -> &str {
        "financial-dual-approval"
    }

    fn name(&self) -> &str {
        "Financial steps require dual approval"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &ExecutionContext) -> Result<ComplianceStatus, String> {
        if ctx.metadata.category.as_deref() != Some("financial") {
            return Ok(ComplianceStatus::NotApplicable);
        }

        let approvers: HashSet<&str> = ctx
            .audit_trail
            .iter()
            .filter(|e| e.action == "approved")
            .map(|e| e.actor.as_str())
            .collect();

        if approvers.len() >= 2 {
            Ok(ComplianceStatus::Compliant)
        } else {
            Ok(ComplianceStatus::NonCompliant)
        }
    }
}
