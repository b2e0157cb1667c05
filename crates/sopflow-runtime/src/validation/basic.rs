//! Structural validation of the execution context

use super::{Severity, ValidationIssue, ValidationReport};
use crate::context::ExecutionContext;

/// Check the structural invariants every execution must satisfy before it
/// runs: an identified step, an executor for assigned steps, and a
/// well-formed audit trail where one is required.
pub fn validate_basic(ctx: &ExecutionContext) -> ValidationReport {
    let mut report = ValidationReport::valid();

    if ctx.metadata.id.trim().is_empty() {
        report.push(ValidationIssue::new(
            Some("metadata.id"),
            "step metadata must carry a non-empty id",
            "METADATA_ID_REQUIRED",
            Severity::Error,
        ));
    }

    if ctx.metadata.assigned_to.is_some() && ctx.executor.is_none() {
        report.push(ValidationIssue::new(
            Some("executor"),
            "assigned steps require an executor identity",
            "EXECUTOR_REQUIRED",
            Severity::Error,
        ));
    }

    if ctx.metadata.audit_required {
        if ctx.audit_trail.is_empty() {
            report.push(ValidationIssue::new(
                Some("audit_trail"),
                "audit trail is required but empty",
                "AUDIT_TRAIL_EMPTY",
                Severity::Error,
            ));
        } else {
            let ordered = ctx
                .audit_trail
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp);
            if !ordered {
                report.push(ValidationIssue::new(
                    Some("audit_trail"),
                    "audit trail timestamps are not in chronological order",
                    "AUDIT_TRAIL_ORDER",
                    Severity::Error,
                ));
            }
        }
    }

    report
}
