//! Logic combinator
//!
//! Combines a set of condition outcomes into a single verdict. Unlike
//! condition-level errors, a failing custom expression here propagates to
//! the caller: it is a configuration defect, and the decision engine
//! converts it into an escalation.

use crate::error::{Result, RuntimeError};
use sopflow_core::expr::{call_builtin, evaluate, parse, EvalScope};
use sopflow_core::{ConditionOutcome, CoreError, LogicOperator, Value};

/// Weighted majority threshold: the weighted score must reach this many
/// points (out of 100) to pass. Fixed by product decision, not
/// configurable.
pub const WEIGHTED_PASS_THRESHOLD: f64 = 50.0;

/// Result of a weighted combination
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedVerdict {
    /// Whether the weighted score reached the majority threshold
    pub passed: bool,
    /// Weighted pass fraction scaled to 0-100, rounded
    pub score: f64,
    /// Sum of all condition weights
    pub total_weight: f64,
}

/// Stateless logic combinator
pub struct LogicCombinator;

impl LogicCombinator {
    /// Combine outcomes under the given operator. `custom_expression` is
    /// only consulted for `LogicOperator::Custom`.
    ///
    /// Empty outcome sets always combine to `false`.
    pub fn combine(
        outcomes: &[ConditionOutcome],
        operator: LogicOperator,
        custom_expression: Option<&str>,
    ) -> Result<bool> {
        if outcomes.is_empty() {
            return Ok(false);
        }

        match operator {
            LogicOperator::And => Ok(outcomes.iter().all(|o| o.passed)),
            LogicOperator::Or => Ok(outcomes.iter().any(|o| o.passed)),
            // NOT is defined over a single-condition set: negate the first
            LogicOperator::Not => Ok(!outcomes[0].passed),
            LogicOperator::Xor => {
                Ok(outcomes.iter().filter(|o| o.passed).count() == 1)
            }
            LogicOperator::Weighted => Ok(Self::combine_weighted(outcomes).passed),
            LogicOperator::Custom => {
                let source = custom_expression.ok_or_else(|| {
                    RuntimeError::MissingConfiguration(
                        "custom logic operator requires an expression".to_string(),
                    )
                })?;
                Self::combine_custom(outcomes, source)
            }
        }
    }

    /// Weighted combination: score = passing weight / total weight * 100,
    /// rounded; order-independent by construction.
    pub fn combine_weighted(outcomes: &[ConditionOutcome]) -> WeightedVerdict {
        let total_weight: f64 = outcomes.iter().map(|o| o.effective_weight()).sum();
        if total_weight <= 0.0 {
            return WeightedVerdict {
                passed: false,
                score: 0.0,
                total_weight: 0.0,
            };
        }

        let passing_weight: f64 = outcomes
            .iter()
            .filter(|o| o.passed)
            .map(|o| o.effective_weight())
            .sum();

        let score = (passing_weight / total_weight * 100.0).round();
        WeightedVerdict {
            passed: score >= WEIGHTED_PASS_THRESHOLD,
            score,
            total_weight,
        }
    }

    /// Evaluate a custom combinator expression over the named condition
    /// results. Failures propagate as `RuntimeError::CustomLogic`.
    fn combine_custom(outcomes: &[ConditionOutcome], source: &str) -> Result<bool> {
        let expr = parse(source)
            .map_err(|e| RuntimeError::CustomLogic(e.to_string()))?;
        let scope = CombinatorScope { outcomes };
        let value = evaluate(&expr, &scope)
            .map_err(|e| RuntimeError::CustomLogic(e.to_string()))?;
        Ok(value.is_truthy())
    }
}

/// Expression scope for custom combination: condition ids resolve to their
/// pass/fail booleans, plus `all`/`any`/`count`/`weight` helpers over ids.
struct CombinatorScope<'a> {
    outcomes: &'a [ConditionOutcome],
}

impl CombinatorScope<'_> {
    fn outcome(&self, id: &str) -> Option<&ConditionOutcome> {
        self.outcomes.iter().find(|o| o.condition_id == id)
    }

    fn require_id<'v>(&self, value: &'v Value) -> sopflow_core::Result<&ConditionOutcome> {
        let id = match value {
            Value::String(s) => s.as_str(),
            other => {
                return Err(CoreError::TypeError(format!(
                    "condition id must be a string, got {}",
                    other.type_name()
                )))
            }
        };
        self.outcome(id)
            .ok_or_else(|| CoreError::UnknownIdentifier(id.to_string()))
    }
}

impl EvalScope for CombinatorScope<'_> {
    fn lookup(&self, path: &[String]) -> Option<Value> {
        if path.len() != 1 {
            return None;
        }
        self.outcome(&path[0]).map(|o| Value::Bool(o.passed))
    }

    fn call(&self, name: &str, args: &[Value]) -> sopflow_core::Result<Value> {
        match name {
            // all("c1", "c2"): every named condition passed
            "all" => {
                for arg in args {
                    if !self.require_id(arg)?.passed {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            // any("c1", "c2"): at least one named condition passed
            "any" => {
                for arg in args {
                    if self.require_id(arg)?.passed {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            // count(true) / count(false): outcomes with that verdict
            "count" => {
                let wanted = args
                    .first()
                    .map(|v| v.is_truthy())
                    .unwrap_or(true);
                let n = self
                    .outcomes
                    .iter()
                    .filter(|o| o.passed == wanted)
                    .count();
                Ok(Value::Number(n as f64))
            }
            // weight("c1", "c2"): summed weight of the named conditions
            // that passed
            "weight" => {
                let mut total = 0.0;
                for arg in args {
                    let outcome = self.require_id(arg)?;
                    if outcome.passed {
                        total += outcome.effective_weight();
                    }
                }
                Ok(Value::Number(total))
            }
            _ => call_builtin(name, args),
        }
    }
}
