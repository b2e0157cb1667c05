//! Decision point configuration types
//!
//! A decision point owns a set of conditions, a logic operator for
//! combining them, and a prioritized set of condition-guarded options.
//! These types are authored outside the engine and treated as immutable
//! configuration.

use crate::condition::Condition;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How condition outcomes combine into a single verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOperator {
    /// All conditions must pass
    And,
    /// At least one condition must pass
    Or,
    /// Negation of a single condition
    Not,
    /// Exactly one condition passes
    Xor,
    /// Weighted majority (score >= threshold)
    Weighted,
    /// Sandboxed custom expression over condition ids
    Custom,
}

/// Policy applied when no option is ultimately selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutBehavior {
    /// Substitute the configured default option and complete normally
    Default,
    /// Fail the owning execution
    Fail,
    /// Raise the escalation level and hand off to a human
    Escalate,
}

impl Default for TimeoutBehavior {
    fn default() -> Self {
        TimeoutBehavior::Default
    }
}

/// How a decision is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Fully rule-driven
    Automated,
    /// Human supplies the choice (and, when configured, a justification)
    Manual,
    /// Automated first, falling back to manual when no option matches
    Hybrid,
}

impl Default for DecisionMode {
    fn default() -> Self {
        DecisionMode::Automated
    }
}

/// A named, prioritized, optionally condition-guarded outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Unique id within the decision point
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Tie-break priority: higher wins
    #[serde(default)]
    pub priority: i32,

    /// Guard conditions: ALL must pass for this option to match.
    /// An empty list marks an unconditioned/default candidate.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Whether selecting this option terminates the workflow
    #[serde(default)]
    pub terminate: bool,

    /// Reference to the next workflow step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

impl DecisionOption {
    /// Create an unconditioned option
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority: 0,
            conditions: Vec::new(),
            terminate: false,
            next_step: None,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add guard conditions
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Set the next-step reference
    pub fn with_next_step(mut self, step: impl Into<String>) -> Self {
        self.next_step = Some(step.into());
        self
    }

    /// True when this option has no guard conditions
    pub fn is_unconditioned(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Configuration of one decision point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Decision point id
    pub id: String,

    /// Conditions evaluated once per decision pass
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Candidate outcomes
    pub options: Vec<DecisionOption>,

    /// How condition outcomes combine
    #[serde(default = "default_logic")]
    pub logic: LogicOperator,

    /// Custom combinator expression, required when logic is Custom
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_logic: Option<String>,

    /// Id of the option substituted under `TimeoutBehavior::Default`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_option: Option<String>,

    /// Policy when no option is selected
    #[serde(default)]
    pub timeout_behavior: TimeoutBehavior,

    /// Decision mode
    #[serde(default)]
    pub mode: DecisionMode,

    /// Manual decisions must carry a justification
    #[serde(default)]
    pub requires_justification: bool,

    /// Whether unhandled evaluation errors may escalate
    #[serde(default = "default_true")]
    pub escalation_enabled: bool,
}

fn default_logic() -> LogicOperator {
    LogicOperator::And
}

fn default_true() -> bool {
    true
}

impl DecisionConfig {
    /// Create a configuration with AND logic and default policies
    pub fn new(id: impl Into<String>, options: Vec<DecisionOption>) -> Self {
        Self {
            id: id.into(),
            conditions: Vec::new(),
            options,
            logic: LogicOperator::And,
            custom_logic: None,
            default_option: None,
            timeout_behavior: TimeoutBehavior::Default,
            mode: DecisionMode::Automated,
            requires_justification: false,
            escalation_enabled: true,
        }
    }

    /// Set the evaluated conditions
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Set the logic operator
    pub fn with_logic(mut self, logic: LogicOperator) -> Self {
        self.logic = logic;
        self
    }

    /// Set the default option id
    pub fn with_default_option(mut self, id: impl Into<String>) -> Self {
        self.default_option = Some(id.into());
        self
    }

    /// Set the timeout behavior
    pub fn with_timeout_behavior(mut self, behavior: TimeoutBehavior) -> Self {
        self.timeout_behavior = behavior;
        self
    }

    /// Set the decision mode
    pub fn with_mode(mut self, mode: DecisionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Look up an option by id
    pub fn option(&self, id: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// All conditions reachable from this configuration, keyed by id.
    /// Guard conditions on options are included so the evaluator can
    /// resolve them in one pass.
    pub fn all_conditions(&self) -> HashMap<&str, &Condition> {
        let mut map: HashMap<&str, &Condition> = HashMap::new();
        for cond in &self.conditions {
            map.insert(cond.id.as_str(), cond);
        }
        for option in &self.options {
            for cond in &option.conditions {
                map.entry(cond.id.as_str()).or_insert(cond);
            }
        }
        map
    }
}

/// A manual choice supplied by a human decision maker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualChoice {
    /// Id of the chosen option
    pub option_id: String,

    /// Identity of the decision maker
    pub decided_by: String,

    /// Free-text justification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,

    /// Arbitrary extra context recorded with the decision
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attachments: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionOperator;

    #[test]
    fn test_option_builder() {
        let opt = DecisionOption::new("opt-approve", "Approve")
            .with_priority(10)
            .with_next_step("notify");

        assert_eq!(opt.priority, 10);
        assert!(opt.is_unconditioned());
        assert_eq!(opt.next_step.as_deref(), Some("notify"));
    }

    #[test]
    fn test_config_lookup() {
        let config = DecisionConfig::new(
            "dp-1",
            vec![
                DecisionOption::new("a", "A"),
                DecisionOption::new("b", "B"),
            ],
        );

        assert!(config.option("a").is_some());
        assert!(config.option("missing").is_none());
    }

    #[test]
    fn test_all_conditions_includes_guards() {
        let shared = Condition::new(
            "c1",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let guard_only = Condition::new(
            "c2",
            "input.department",
            ConditionOperator::Equals,
            Value::String("finance".to_string()),
        );

        let config = DecisionConfig::new(
            "dp-1",
            vec![DecisionOption::new("a", "A").with_conditions(vec![guard_only.clone()])],
        )
        .with_conditions(vec![shared.clone()]);

        let all = config.all_conditions();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("c1"), Some(&&shared));
        assert_eq!(all.get("c2"), Some(&&guard_only));
    }

    #[test]
    fn test_config_serde_defaults() {
        let json = r#"{
            "id": "dp-1",
            "options": [{"id": "a", "name": "A"}]
        }"#;

        let config: DecisionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.logic, LogicOperator::And);
        assert_eq!(config.timeout_behavior, TimeoutBehavior::Default);
        assert_eq!(config.mode, DecisionMode::Automated);
        assert!(config.escalation_enabled);
    }
}
