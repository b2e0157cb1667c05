//! Condition evaluator
//!
//! Evaluates one atomic predicate against an execution context. Evaluation
//! never mutates the context and never panics or throws past this module:
//! any failure (bad regex, malformed custom expression, type mismatch) is
//! recorded on the outcome as `passed = false` plus an `error` string.

use crate::context::ExecutionContext;
use regex::Regex;
use sopflow_core::expr::{call_builtin, evaluate, parse, EvalScope};
use sopflow_core::{Condition, ConditionOperator, ConditionOutcome, Value};
use std::time::Instant;

/// Stateless condition evaluator
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a condition against a context, producing a timed outcome
    pub fn evaluate(condition: &Condition, ctx: &ExecutionContext) -> ConditionOutcome {
        let start = Instant::now();
        let actual = ctx.resolve_field(&condition.field);

        let (passed, error) =
            match Self::apply(condition.operator, actual.as_ref(), condition) {
                Ok(passed) => (passed, None),
                Err(message) => {
                    tracing::debug!(
                        condition = %condition.id,
                        field = %condition.field,
                        %message,
                        "condition evaluation error"
                    );
                    (false, Some(message))
                }
            };

        ConditionOutcome {
            condition_id: condition.id.clone(),
            field: condition.field.clone(),
            operator: condition.operator,
            expected: condition.expected.clone(),
            actual,
            passed,
            duration_ms: start.elapsed().as_millis() as u64,
            weight: condition.weight,
            error,
        }
    }

    fn apply(
        operator: ConditionOperator,
        actual: Option<&Value>,
        condition: &Condition,
    ) -> Result<bool, String> {
        let expected = &condition.expected;

        match operator {
            ConditionOperator::Exists => Ok(actual.is_some()),
            ConditionOperator::NotExists => Ok(actual.is_none()),

            ConditionOperator::Equals => {
                Ok(actual.map(|a| a.coercive_eq(expected)).unwrap_or(false))
            }
            ConditionOperator::NotEquals => {
                Ok(!actual.map(|a| a.coercive_eq(expected)).unwrap_or(false))
            }

            ConditionOperator::GreaterThan
            | ConditionOperator::LessThan
            | ConditionOperator::GreaterEqual
            | ConditionOperator::LessEqual => {
                // Missing fields compare false rather than erroring, so
                // rules can reference optional data
                let Some(actual) = actual else {
                    return Ok(false);
                };
                let a = actual.as_number().ok_or_else(|| {
                    format!("Cannot compare {} numerically", actual.type_name())
                })?;
                let e = expected.as_number().ok_or_else(|| {
                    format!("Expected value is not numeric: {}", expected.type_name())
                })?;
                Ok(match operator {
                    ConditionOperator::GreaterThan => a > e,
                    ConditionOperator::LessThan => a < e,
                    ConditionOperator::GreaterEqual => a >= e,
                    ConditionOperator::LessEqual => a <= e,
                    _ => unreachable!(),
                })
            }

            ConditionOperator::Contains
            | ConditionOperator::NotContains
            | ConditionOperator::StartsWith
            | ConditionOperator::EndsWith => {
                let Some(actual) = actual else {
                    return Ok(matches!(operator, ConditionOperator::NotContains));
                };
                let haystack = actual.as_display_string().to_lowercase();
                let needle = expected.as_display_string().to_lowercase();
                Ok(match operator {
                    ConditionOperator::Contains => haystack.contains(&needle),
                    ConditionOperator::NotContains => !haystack.contains(&needle),
                    ConditionOperator::StartsWith => haystack.starts_with(&needle),
                    ConditionOperator::EndsWith => haystack.ends_with(&needle),
                    _ => unreachable!(),
                })
            }

            ConditionOperator::Regex => {
                let pattern = match expected {
                    Value::String(s) => s,
                    other => {
                        return Err(format!(
                            "Regex pattern must be a string, got {}",
                            other.type_name()
                        ))
                    }
                };
                let regex =
                    Regex::new(pattern).map_err(|e| format!("Invalid regex: {}", e))?;
                let Some(actual) = actual else {
                    return Ok(false);
                };
                Ok(regex.is_match(&actual.as_display_string()))
            }

            ConditionOperator::InList | ConditionOperator::NotInList => {
                let Value::Array(items) = expected else {
                    return Err(format!(
                        "Expected value for list membership must be an array, got {}",
                        expected.type_name()
                    ));
                };
                let contained = actual
                    .map(|a| items.iter().any(|item| item.coercive_eq(a)))
                    .unwrap_or(false);
                Ok(match operator {
                    ConditionOperator::InList => contained,
                    _ => !contained,
                })
            }

            ConditionOperator::Custom => {
                let source = condition
                    .custom_expression
                    .as_deref()
                    .ok_or_else(|| "Custom operator requires custom_expression".to_string())?;
                let expr = parse(source).map_err(|e| e.to_string())?;
                let scope = ConditionScope { actual, expected };
                let result = evaluate(&expr, &scope).map_err(|e| e.to_string())?;
                Ok(result.is_truthy())
            }
        }
    }
}

/// Expression scope for the Custom operator: only `actual` and `expected`
/// are visible, plus the shared builtin functions
struct ConditionScope<'a> {
    actual: Option<&'a Value>,
    expected: &'a Value,
}

impl EvalScope for ConditionScope<'_> {
    fn lookup(&self, path: &[String]) -> Option<Value> {
        if path.len() != 1 {
            return None;
        }
        match path[0].as_str() {
            "actual" => Some(self.actual.cloned().unwrap_or(Value::Null)),
            "expected" => Some(self.expected.clone()),
            _ => None,
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> sopflow_core::Result<Value> {
        call_builtin(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionMetadata;
    use std::collections::HashMap;

    fn context_with(input: Vec<(&str, Value)>) -> ExecutionContext {
        let map: HashMap<String, Value> = input
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ExecutionContext::new(ExecutionMetadata::new("sop-1")).with_input(map)
    }

    #[test]
    fn test_equals_coercive() {
        let ctx = context_with(vec![("amount", Value::Number(1500.0))]);
        let cond = Condition::new(
            "c1",
            "input.amount",
            ConditionOperator::Equals,
            Value::String("1500".to_string()),
        );

        let outcome = ConditionEvaluator::evaluate(&cond, &ctx);
        assert!(outcome.passed);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.actual, Some(Value::Number(1500.0)));
    }

    #[test]
    fn test_not_equals_on_missing_field() {
        let ctx = context_with(vec![]);
        let cond = Condition::new(
            "c1",
            "input.missing",
            ConditionOperator::NotEquals,
            Value::Number(1.0),
        );
        assert!(ConditionEvaluator::evaluate(&cond, &ctx).passed);
    }

    #[test]
    fn test_numeric_operators() {
        let ctx = context_with(vec![("amount", Value::Number(1500.0))]);

        for (op, expected, pass) in [
            (ConditionOperator::GreaterThan, 1000.0, true),
            (ConditionOperator::GreaterThan, 1500.0, false),
            (ConditionOperator::GreaterEqual, 1500.0, true),
            (ConditionOperator::LessThan, 2000.0, true),
            (ConditionOperator::LessEqual, 1499.0, false),
        ] {
            let cond = Condition::new("c", "input.amount", op, Value::Number(expected));
            assert_eq!(
                ConditionEvaluator::evaluate(&cond, &ctx).passed,
                pass,
                "{:?} {}",
                op,
                expected
            );
        }
    }

    #[test]
    fn test_numeric_coerces_string_field() {
        let ctx = context_with(vec![("amount", Value::String("250".to_string()))]);
        let cond = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(100.0),
        );
        assert!(ConditionEvaluator::evaluate(&cond, &ctx).passed);
    }

    #[test]
    fn test_numeric_type_mismatch_is_error_not_panic() {
        let ctx = context_with(vec![("tags", Value::Array(vec![]))]);
        let cond = Condition::new(
            "c",
            "input.tags",
            ConditionOperator::GreaterThan,
            Value::Number(1.0),
        );
        let outcome = ConditionEvaluator::evaluate(&cond, &ctx);
        assert!(!outcome.passed);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_string_operators_case_insensitive() {
        let ctx = context_with(vec![(
            "email",
            Value::String("Alice@Example.COM".to_string()),
        )]);

        let contains = Condition::new(
            "c",
            "input.email",
            ConditionOperator::Contains,
            Value::String("@example.com".to_string()),
        );
        assert!(ConditionEvaluator::evaluate(&contains, &ctx).passed);

        let starts = Condition::new(
            "c",
            "input.email",
            ConditionOperator::StartsWith,
            Value::String("alice".to_string()),
        );
        assert!(ConditionEvaluator::evaluate(&starts, &ctx).passed);

        let ends = Condition::new(
            "c",
            "input.email",
            ConditionOperator::EndsWith,
            Value::String(".com".to_string()),
        );
        assert!(ConditionEvaluator::evaluate(&ends, &ctx).passed);

        let not_contains = Condition::new(
            "c",
            "input.email",
            ConditionOperator::NotContains,
            Value::String("bob".to_string()),
        );
        assert!(ConditionEvaluator::evaluate(&not_contains, &ctx).passed);
    }

    #[test]
    fn test_regex_operator() {
        let ctx = context_with(vec![("ticket", Value::String("SOP-1234".to_string()))]);

        let cond = Condition::new(
            "c",
            "input.ticket",
            ConditionOperator::Regex,
            Value::String(r"^SOP-\d+$".to_string()),
        );
        assert!(ConditionEvaluator::evaluate(&cond, &ctx).passed);

        let bad = Condition::new(
            "c",
            "input.ticket",
            ConditionOperator::Regex,
            Value::String("[unclosed".to_string()),
        );
        let outcome = ConditionEvaluator::evaluate(&bad, &ctx);
        assert!(!outcome.passed);
        assert!(outcome.error.unwrap().contains("Invalid regex"));
    }

    #[test]
    fn test_exists_operators() {
        let ctx = context_with(vec![("present", Value::Bool(false))]);

        let exists = Condition::new("c", "input.present", ConditionOperator::Exists, Value::Null);
        assert!(ConditionEvaluator::evaluate(&exists, &ctx).passed);

        let not_exists =
            Condition::new("c", "input.absent", ConditionOperator::NotExists, Value::Null);
        assert!(ConditionEvaluator::evaluate(&not_exists, &ctx).passed);
    }

    #[test]
    fn test_list_membership() {
        let ctx = context_with(vec![("dept", Value::String("finance".to_string()))]);
        let list = Value::Array(vec![
            Value::String("finance".to_string()),
            Value::String("legal".to_string()),
        ]);

        let in_list =
            Condition::new("c", "input.dept", ConditionOperator::InList, list.clone());
        assert!(ConditionEvaluator::evaluate(&in_list, &ctx).passed);

        let not_in = Condition::new(
            "c",
            "input.other",
            ConditionOperator::NotInList,
            list.clone(),
        );
        assert!(ConditionEvaluator::evaluate(&not_in, &ctx).passed);

        let bad = Condition::new(
            "c",
            "input.dept",
            ConditionOperator::InList,
            Value::String("finance".to_string()),
        );
        let outcome = ConditionEvaluator::evaluate(&bad, &ctx);
        assert!(!outcome.passed);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_custom_expression() {
        let ctx = context_with(vec![("amount", Value::Number(1500.0))]);
        let cond = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::Custom,
            Value::Number(1000.0),
        )
        .with_custom_expression("is_number(actual) && actual > expected");

        let outcome = ConditionEvaluator::evaluate(&cond, &ctx);
        assert!(outcome.passed);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_custom_expression_errors_are_contained() {
        let ctx = context_with(vec![("amount", Value::Number(1.0))]);

        // Missing expression
        let missing = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::Custom,
            Value::Null,
        );
        let outcome = ConditionEvaluator::evaluate(&missing, &ctx);
        assert!(!outcome.passed);
        assert!(outcome.error.is_some());

        // Unknown function: the sandbox has no escape hatch
        let sneaky = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::Custom,
            Value::Null,
        )
        .with_custom_expression("eval('boom')");
        let outcome = ConditionEvaluator::evaluate(&sneaky, &ctx);
        assert!(!outcome.passed);
        assert!(outcome.error.unwrap().contains("Unknown function"));
    }

    #[test]
    fn test_evaluation_is_side_effect_free() {
        let ctx = context_with(vec![("amount", Value::Number(10.0))]);
        let before = ctx.clone();

        let cond = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(5.0),
        );
        let _ = ConditionEvaluator::evaluate(&cond, &ctx);

        assert_eq!(ctx.input, before.input);
        assert_eq!(ctx.audit_trail.len(), before.audit_trail.len());
    }
}
