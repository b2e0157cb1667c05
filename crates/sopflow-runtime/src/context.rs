//! Execution context
//!
//! One `ExecutionContext` identifies one run of a unit of work. It carries
//! the lifecycle state, the append-only audit trail, the escalation level,
//! and the free-form data bags (`input`, `variables`, `workflow`) that
//! conditions resolve field paths against. Only the execution engine and
//! the work function it invokes mutate the context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sopflow_core::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle states of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Pending,
    InProgress,
    WaitingApproval,
    Escalated,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Terminal states cannot transition further
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Completed | ExecutionState::Failed | ExecutionState::Cancelled
        )
    }
}

/// Static metadata describing the step being executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Step/procedure id
    pub id: String,

    /// Whether completing this step requires an approval
    #[serde(default)]
    pub requires_approval: bool,

    /// Whether an audit trail must be present for this step
    #[serde(default)]
    pub audit_required: bool,

    /// Who the step is assigned to, if anyone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// Process category (e.g., "financial"), consumed by compliance rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ExecutionMetadata {
    /// Create metadata with all flags off
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            requires_approval: false,
            audit_required: false,
            assigned_to: None,
            category: None,
        }
    }
}

/// One entry in the append-only audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Execution context for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Unique id of this run
    pub execution_id: Uuid,

    /// Static step metadata
    pub metadata: ExecutionMetadata,

    /// Current lifecycle state
    pub state: ExecutionState,

    /// Identity of whoever is executing the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    /// Append-only, time-ordered audit trail
    pub audit_trail: Vec<AuditEntry>,

    /// Escalation level; only ever increases within a run
    pub escalation_level: u32,

    /// Caller-supplied input data
    #[serde(default)]
    pub input: HashMap<String, Value>,

    /// Free-form variable bag, mutated by the work function
    #[serde(default)]
    pub variables: HashMap<String, Value>,

    /// Workflow-level state shared across steps
    #[serde(default)]
    pub workflow: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Create a fresh context in the Pending state
    pub fn new(metadata: ExecutionMetadata) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            metadata,
            state: ExecutionState::Pending,
            executor: None,
            audit_trail: Vec::new(),
            escalation_level: 0,
            input: HashMap::new(),
            variables: HashMap::new(),
            workflow: HashMap::new(),
        }
    }

    /// Set the input bag
    pub fn with_input(mut self, input: HashMap<String, Value>) -> Self {
        self.input = input;
        self
    }

    /// Set the executor identity
    pub fn with_executor(mut self, executor: impl Into<String>) -> Self {
        self.executor = Some(executor.into());
        self
    }

    /// Transition to a new lifecycle state
    pub fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
    }

    /// Append an audit entry; entries are appended in completion order so
    /// the trail stays chronologically ordered within a run
    pub fn append_audit(
        &mut self,
        action: impl Into<String>,
        actor: impl Into<String>,
        details: Option<String>,
    ) {
        self.audit_trail.push(AuditEntry {
            timestamp: Utc::now(),
            action: action.into(),
            actor: actor.into(),
            details,
        });
    }

    /// Raise the escalation level by one
    pub fn escalate(&mut self) {
        self.escalation_level += 1;
    }

    /// Store a variable
    pub fn store_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Resolve a dot-separated field path against the context.
    ///
    /// Reserved leading segments select a sub-object: `input`, `variables`,
    /// `workflow` / `workflow_state`, `metadata`. Without a reserved
    /// prefix the path is resolved against `input` first, then
    /// `variables`. Resolution that hits a missing key or a non-object
    /// short-circuits to `None` without erroring.
    pub fn resolve_field(&self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let (first, rest) = segments.split_first()?;

        match *first {
            "input" => walk(&self.input, rest),
            "variables" => walk(&self.variables, rest),
            "workflow" | "workflow_state" => walk(&self.workflow, rest),
            "metadata" => self.resolve_metadata(rest),
            _ => walk(&self.input, &segments).or_else(|| walk(&self.variables, &segments)),
        }
    }

    fn resolve_metadata(&self, rest: &[&str]) -> Option<Value> {
        let field = rest.first()?;
        if rest.len() > 1 {
            return None;
        }
        match *field {
            "id" => Some(Value::String(self.metadata.id.clone())),
            "requires_approval" => Some(Value::Bool(self.metadata.requires_approval)),
            "audit_required" => Some(Value::Bool(self.metadata.audit_required)),
            "assigned_to" => self
                .metadata
                .assigned_to
                .as_ref()
                .map(|s| Value::String(s.clone())),
            "category" => self
                .metadata
                .category
                .as_ref()
                .map(|s| Value::String(s.clone())),
            _ => None,
        }
    }
}

/// Walk a data bag by path segments, stopping at missing keys or
/// non-object intermediates
fn walk(bag: &HashMap<String, Value>, segments: &[&str]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = bag.get(*first)?;

    for segment in rest {
        match current {
            Value::Object(map) => current = map.get(*segment)?,
            _ => return None,
        }
    }

    if matches!(current, Value::Null) {
        return None;
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_context() -> ExecutionContext {
        let mut input = HashMap::new();
        input.insert("amount".to_string(), Value::Number(1500.0));
        input.insert(
            "department".to_string(),
            Value::String("finance".to_string()),
        );

        let mut requester = HashMap::new();
        requester.insert("name".to_string(), Value::String("Alice".to_string()));
        requester.insert("level".to_string(), Value::Number(3.0));
        input.insert("requester".to_string(), Value::Object(requester));

        ExecutionContext::new(ExecutionMetadata::new("sop-42")).with_input(input)
    }

    #[test]
    fn test_new_context_starts_pending() {
        let ctx = create_test_context();
        assert_eq!(ctx.state, ExecutionState::Pending);
        assert_eq!(ctx.escalation_level, 0);
        assert!(ctx.audit_trail.is_empty());
    }

    #[test]
    fn test_resolve_reserved_input_prefix() {
        let ctx = create_test_context();
        assert_eq!(
            ctx.resolve_field("input.amount"),
            Some(Value::Number(1500.0))
        );
        assert_eq!(
            ctx.resolve_field("input.requester.name"),
            Some(Value::String("Alice".to_string()))
        );
    }

    #[test]
    fn test_resolve_bare_path_falls_through_to_input() {
        let ctx = create_test_context();
        assert_eq!(ctx.resolve_field("amount"), Some(Value::Number(1500.0)));
        assert_eq!(
            ctx.resolve_field("requester.level"),
            Some(Value::Number(3.0))
        );
    }

    #[test]
    fn test_resolve_variables_and_workflow() {
        let mut ctx = create_test_context();
        ctx.store_variable("retries", Value::Number(2.0));
        ctx.workflow
            .insert("current_step".to_string(), Value::String("review".to_string()));

        assert_eq!(
            ctx.resolve_field("variables.retries"),
            Some(Value::Number(2.0))
        );
        assert_eq!(
            ctx.resolve_field("workflow.current_step"),
            Some(Value::String("review".to_string()))
        );
        assert_eq!(
            ctx.resolve_field("workflow_state.current_step"),
            Some(Value::String("review".to_string()))
        );
        // Bare lookup falls back to variables after input
        assert_eq!(ctx.resolve_field("retries"), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_resolve_metadata() {
        let ctx = create_test_context();
        assert_eq!(
            ctx.resolve_field("metadata.id"),
            Some(Value::String("sop-42".to_string()))
        );
        assert_eq!(
            ctx.resolve_field("metadata.requires_approval"),
            Some(Value::Bool(false))
        );
        assert_eq!(ctx.resolve_field("metadata.assigned_to"), None);
    }

    #[test]
    fn test_resolve_missing_short_circuits() {
        let ctx = create_test_context();
        assert_eq!(ctx.resolve_field("input.nonexistent"), None);
        assert_eq!(ctx.resolve_field("input.amount.deeper"), None);
        assert_eq!(ctx.resolve_field(""), None);
    }

    #[test]
    fn test_resolve_null_is_missing() {
        let mut ctx = create_test_context();
        ctx.input.insert("blank".to_string(), Value::Null);
        assert_eq!(ctx.resolve_field("input.blank"), None);
    }

    #[test]
    fn test_audit_trail_appends_in_order() {
        let mut ctx = create_test_context();
        ctx.append_audit("started", "system", None);
        ctx.append_audit("approved", "alice", Some("looks good".to_string()));

        assert_eq!(ctx.audit_trail.len(), 2);
        assert!(ctx.audit_trail[0].timestamp <= ctx.audit_trail[1].timestamp);
        assert_eq!(ctx.audit_trail[1].actor, "alice");
    }

    #[test]
    fn test_escalation_only_increases() {
        let mut ctx = create_test_context();
        ctx.escalate();
        ctx.escalate();
        assert_eq!(ctx.escalation_level, 2);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ExecutionState::Completed.is_terminal());
        assert!(ExecutionState::Failed.is_terminal());
        assert!(ExecutionState::Cancelled.is_terminal());
        assert!(!ExecutionState::InProgress.is_terminal());
        assert!(!ExecutionState::Escalated.is_terminal());
    }
}
