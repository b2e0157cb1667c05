//! Condition types for decision points
//!
//! A `Condition` is an atomic predicate authored outside the engine:
//! a field path into the execution context, a comparison operator, and an
//! expected literal. The evaluator produces one `ConditionOutcome` per
//! condition per evaluation pass.

use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Comparison operators supported by condition evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Equal, with coercive comparison (see `Value::coercive_eq`)
    Equals,
    /// Negation of Equals
    NotEquals,
    /// Numeric greater than (>)
    GreaterThan,
    /// Numeric less than (<)
    LessThan,
    /// Numeric greater than or equal (>=)
    GreaterEqual,
    /// Numeric less than or equal (<=)
    LessEqual,
    /// Case-insensitive substring match
    Contains,
    /// Negation of Contains
    NotContains,
    /// Case-insensitive prefix match
    StartsWith,
    /// Case-insensitive suffix match
    EndsWith,
    /// Regular expression match against the actual value
    Regex,
    /// Field resolved to a non-null value
    Exists,
    /// Field missing or null
    NotExists,
    /// Actual value is an element of the expected array
    InList,
    /// Negation of InList
    NotInList,
    /// Sandboxed custom expression over `actual`/`expected`
    Custom,
}

impl ConditionOperator {
    /// Returns true if this operator compares numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan
                | ConditionOperator::LessThan
                | ConditionOperator::GreaterEqual
                | ConditionOperator::LessEqual
        )
    }

    /// Returns true if this operator works on string views of both sides
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            ConditionOperator::Contains
                | ConditionOperator::NotContains
                | ConditionOperator::StartsWith
                | ConditionOperator::EndsWith
                | ConditionOperator::Regex
        )
    }

    /// Returns true if this operator ignores the expected value
    pub fn is_existence(&self) -> bool {
        matches!(self, ConditionOperator::Exists | ConditionOperator::NotExists)
    }

    /// Symbol or keyword used when rendering decision paths
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "==",
            ConditionOperator::NotEquals => "!=",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::LessThan => "<",
            ConditionOperator::GreaterEqual => ">=",
            ConditionOperator::LessEqual => "<=",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::Regex => "matches",
            ConditionOperator::Exists => "exists",
            ConditionOperator::NotExists => "not_exists",
            ConditionOperator::InList => "in",
            ConditionOperator::NotInList => "not_in",
            ConditionOperator::Custom => "custom",
        }
    }
}

/// An atomic predicate over a context field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Unique id, referenced by decision options and custom logic
    pub id: String,

    /// Dot-separated field path (e.g., "input.amount",
    /// "workflow.current_step")
    pub field: String,

    /// Comparison operator
    pub operator: ConditionOperator,

    /// Expected literal value
    #[serde(default = "default_expected")]
    pub expected: Value,

    /// Weight used by weighted combination and option scoring (default 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Sandboxed expression, required when operator is Custom
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_expression: Option<String>,
}

fn default_expected() -> Value {
    Value::Null
}

impl Condition {
    /// Create a condition with the default weight
    pub fn new(
        id: impl Into<String>,
        field: impl Into<String>,
        operator: ConditionOperator,
        expected: Value,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            operator,
            expected,
            weight: None,
            custom_expression: None,
        }
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the custom expression
    pub fn with_custom_expression(mut self, expr: impl Into<String>) -> Self {
        self.custom_expression = Some(expr.into());
        self
    }

    /// Effective weight (defaults to 1.0)
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// Outcome of evaluating one condition against a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    /// Id of the evaluated condition
    pub condition_id: String,

    /// Field path that was resolved
    pub field: String,

    /// Operator that was applied
    pub operator: ConditionOperator,

    /// Expected value from the configuration
    pub expected: Value,

    /// Actual value resolved from the context (None when the path did not
    /// resolve)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,

    /// Whether the predicate held
    pub passed: bool,

    /// Evaluation time in milliseconds
    pub duration_ms: u64,

    /// Weight carried over from the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Error message when evaluation failed (the outcome is then
    /// `passed = false`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConditionOutcome {
    /// Effective weight (defaults to 1.0)
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}
