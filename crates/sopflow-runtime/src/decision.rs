//! Decision engine
//!
//! Orchestrates condition evaluation, logic combination, and option
//! selection for one decision point, producing a `DecisionResult` with a
//! structured audit path and a confidence score. Supports automated,
//! manual, and hybrid decision modes.

use crate::combinator::LogicCombinator;
use crate::context::{ExecutionContext, ExecutionState};
use crate::error::{Result, RuntimeError};
use crate::evaluator::ConditionEvaluator;
use crate::result::DecisionResult;
use crate::selector::OptionSelector;
use chrono::Utc;
use sopflow_core::{
    Condition, ConditionOutcome, DecisionConfig, DecisionMode, DecisionOption, ManualChoice,
    TimeoutBehavior,
};
use std::collections::HashSet;
use std::time::Instant;

/// Confidence points deducted in proportion to the fraction of conditions
/// that errored during evaluation. Fixed by product decision.
pub const ERROR_PENALTY: f64 = 20.0;

/// Confidence points added when a specifically-guarded option was chosen
/// rather than an unconditioned fallback. Fixed by product decision.
pub const SPECIFIC_MATCH_BONUS: f64 = 10.0;

/// Stateless decision engine
pub struct DecisionEngine;

/// Internal outcome of the automated evaluation phase
struct AutomatedPhase {
    outcomes: Vec<ConditionOutcome>,
    selected: Option<usize>,
    alternatives: Vec<String>,
    confidence: f64,
}

impl DecisionEngine {
    /// Evaluate a decision point.
    ///
    /// `manual` supplies the human choice for MANUAL mode and the HYBRID
    /// fallback; `force_manual` makes HYBRID take the manual path even
    /// when automation found a match.
    ///
    /// Configuration defects (no options, missing manual choice or
    /// justification, unknown option ids, failing custom logic) are
    /// returned as errors; everything else produces a structured result.
    pub fn decide(
        config: &DecisionConfig,
        ctx: &mut ExecutionContext,
        manual: Option<&ManualChoice>,
        force_manual: bool,
    ) -> Result<DecisionResult> {
        if config.options.is_empty() {
            return Err(RuntimeError::MissingConfiguration(format!(
                "decision '{}' has no options defined",
                config.id
            )));
        }

        let start = Instant::now();
        let mut path = Vec::new();

        let result = match config.mode {
            DecisionMode::Automated => {
                let phase = Self::automated_phase(config, ctx, &mut path)?;
                Self::finish_automated(config, ctx, phase, &mut path, start)?
            }
            DecisionMode::Manual => {
                Self::manual_decision(config, ctx, manual, &mut path, start)?
            }
            DecisionMode::Hybrid => {
                let phase = Self::automated_phase(config, ctx, &mut path)?;
                let needs_manual = phase.selected.is_none() || force_manual;
                if needs_manual && manual.is_some() {
                    path.push("Falling back to manual decision".to_string());
                    Self::manual_decision(config, ctx, manual, &mut path, start)?
                } else if needs_manual {
                    // No human input available yet: surface the need
                    // rather than failing the run
                    path.push("Manual intervention required".to_string());
                    ctx.set_state(ExecutionState::WaitingApproval);
                    let mut result = Self::base_result(config, path.clone(), start);
                    result.condition_outcomes = phase.outcomes;
                    result.confidence = phase.confidence;
                    result.requires_manual_intervention = true;
                    result.reason = "no option matched; awaiting manual decision".to_string();
                    result
                } else {
                    Self::finish_automated(config, ctx, phase, &mut path, start)?
                }
            }
        };

        ctx.append_audit(
            "decision",
            result.decided_by.clone().unwrap_or_else(|| "system".to_string()),
            Some(result.reason.clone()),
        );

        Ok(result)
    }

    /// Evaluate every reachable condition and select the best option.
    /// Combinator failures escalate (when enabled) and propagate as a
    /// wrapped error.
    fn automated_phase(
        config: &DecisionConfig,
        ctx: &mut ExecutionContext,
        path: &mut Vec<String>,
    ) -> Result<AutomatedPhase> {
        let conditions = ordered_conditions(config);

        let mut outcomes = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            let outcome = ConditionEvaluator::evaluate(condition, ctx);
            path.push(format!(
                "{} {} {} => {}",
                outcome.field,
                outcome.operator.symbol(),
                outcome.expected.as_display_string(),
                if outcome.passed { "PASS" } else { "FAIL" }
            ));
            outcomes.push(outcome);
        }

        let combined = match LogicCombinator::combine(
            &outcomes,
            config.logic,
            config.custom_logic.as_deref(),
        ) {
            Ok(combined) => combined,
            Err(e) => {
                tracing::warn!(decision = %config.id, error = %e, "combinator failed");
                if config.escalation_enabled {
                    ctx.escalate();
                    ctx.set_state(ExecutionState::Escalated);
                }
                ctx.append_audit("decision-error", "system", Some(e.to_string()));
                return Err(RuntimeError::DecisionFailed(e.to_string()));
            }
        };
        path.push(format!(
            "Logic {:?} => {}",
            config.logic,
            if combined { "PASS" } else { "FAIL" }
        ));

        let selected = OptionSelector::select(&config.options, &outcomes);
        match selected {
            Some(option) => path.push(format!("Selected option '{}'", option.name)),
            None => path.push("No matching option found".to_string()),
        }

        let selected_index =
            selected.and_then(|s| config.options.iter().position(|o| o.id == s.id));
        let alternatives = Self::alternatives(config, &outcomes, selected);
        let confidence = Self::confidence(&outcomes, selected);

        Ok(AutomatedPhase {
            outcomes,
            selected: selected_index,
            alternatives,
            confidence,
        })
    }

    /// Complete an automated decision, applying the timeout-behavior
    /// policy when nothing was selected.
    fn finish_automated(
        config: &DecisionConfig,
        ctx: &mut ExecutionContext,
        phase: AutomatedPhase,
        path: &mut Vec<String>,
        start: Instant,
    ) -> Result<DecisionResult> {
        let mut result = Self::base_result(config, Vec::new(), start);
        result.condition_outcomes = phase.outcomes;
        result.alternatives = phase.alternatives;
        result.confidence = phase.confidence;

        match phase.selected {
            Some(index) => {
                let option = &config.options[index];
                Self::apply_selection(&mut result, option);
                result.reason = format!("option '{}' matched", option.name);
            }
            None => match config.timeout_behavior {
                TimeoutBehavior::Default => {
                    if let Some(default_id) = &config.default_option {
                        let option = config
                            .option(default_id)
                            .ok_or_else(|| RuntimeError::UnknownOption(default_id.clone()))?;
                        path.push(format!("Applied default option '{}'", option.name));
                        Self::apply_selection(&mut result, option);
                        result.reason = "no option matched; default applied".to_string();
                    } else {
                        result.requires_manual_intervention = true;
                        result.reason = "no option matched and no default configured".to_string();
                        ctx.set_state(ExecutionState::WaitingApproval);
                    }
                }
                TimeoutBehavior::Fail => {
                    ctx.set_state(ExecutionState::Failed);
                    result.reason = "no option matched; decision failed".to_string();
                    path.push("Decision failed: no option matched".to_string());
                }
                TimeoutBehavior::Escalate => {
                    ctx.escalate();
                    ctx.set_state(ExecutionState::Escalated);
                    result.requires_escalation = true;
                    result.reason = "no option matched; escalated".to_string();
                    path.push(format!(
                        "Escalated to level {}",
                        ctx.escalation_level
                    ));
                }
            },
        }

        result.decision_path = path.clone();
        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Record a manual decision. Fails before any option handling when a
    /// required justification is missing.
    fn manual_decision(
        config: &DecisionConfig,
        _ctx: &mut ExecutionContext,
        manual: Option<&ManualChoice>,
        path: &mut Vec<String>,
        start: Instant,
    ) -> Result<DecisionResult> {
        let choice = manual.ok_or_else(|| {
            RuntimeError::MissingConfiguration(format!(
                "decision '{}' requires a manual choice",
                config.id
            ))
        })?;

        if config.requires_justification
            && choice
                .justification
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err(RuntimeError::JustificationRequired);
        }

        let option = config
            .option(&choice.option_id)
            .ok_or_else(|| RuntimeError::UnknownOption(choice.option_id.clone()))?;

        path.push(format!(
            "Manual decision by {}: selected '{}'",
            choice.decided_by, option.name
        ));

        let mut result = Self::base_result(config, path.clone(), start);
        Self::apply_selection(&mut result, option);
        result.is_automated = false;
        result.confidence = 100.0;
        result.decided_by = Some(choice.decided_by.clone());
        result.reason = choice
            .justification
            .clone()
            .unwrap_or_else(|| "manual decision".to_string());
        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn base_result(config: &DecisionConfig, path: Vec<String>, start: Instant) -> DecisionResult {
        DecisionResult {
            decision_id: config.id.clone(),
            selected_option: None,
            selected_option_name: None,
            is_automated: true,
            reason: String::new(),
            confidence: 0.0,
            duration_ms: start.elapsed().as_millis() as u64,
            decision_path: path,
            condition_outcomes: Vec::new(),
            alternatives: Vec::new(),
            requires_manual_intervention: false,
            requires_escalation: false,
            decided_by: None,
            timestamp: Utc::now(),
            next_step: None,
            terminate: false,
        }
    }

    fn apply_selection(result: &mut DecisionResult, option: &DecisionOption) {
        result.selected_option = Some(option.id.clone());
        result.selected_option_name = Some(option.name.clone());
        result.next_step = option.next_step.clone();
        result.terminate = option.terminate;
    }

    /// Ids of other options whose guards also fully passed
    fn alternatives(
        config: &DecisionConfig,
        outcomes: &[ConditionOutcome],
        selected: Option<&DecisionOption>,
    ) -> Vec<String> {
        config
            .options
            .iter()
            .filter(|option| Some(option.id.as_str()) != selected.map(|s| s.id.as_str()))
            .filter(|option| {
                !option.is_unconditioned()
                    && option.conditions.iter().all(|guard| {
                        outcomes
                            .iter()
                            .any(|o| o.condition_id == guard.id && o.passed)
                    })
            })
            .map(|option| option.id.clone())
            .collect()
    }

    /// Confidence: weighted pass fraction, penalized for errored
    /// conditions, boosted when a guarded option was chosen, clamped to
    /// [0, 100]. The empty condition set scores 0.
    fn confidence(outcomes: &[ConditionOutcome], selected: Option<&DecisionOption>) -> f64 {
        let base = LogicCombinator::combine_weighted(outcomes).score;

        let errored = outcomes.iter().filter(|o| o.error.is_some()).count();
        let penalty = if outcomes.is_empty() {
            0.0
        } else {
            ERROR_PENALTY * (errored as f64 / outcomes.len() as f64)
        };

        let bonus = match selected {
            Some(option) if !option.is_unconditioned() => SPECIFIC_MATCH_BONUS,
            _ => 0.0,
        };

        (base - penalty + bonus).clamp(0.0, 100.0)
    }
}

/// Adapter that runs a decision point as an engine work unit.
///
/// The full decision result is stored in the context variable
/// `last_decision` and returned as the execution output, so downstream
/// steps and hooks can route on it.
pub struct DecisionWork {
    config: DecisionConfig,
    manual: Option<ManualChoice>,
    force_manual: bool,
}

impl DecisionWork {
    pub fn new(config: DecisionConfig) -> Self {
        Self {
            config,
            manual: None,
            force_manual: false,
        }
    }

    /// Attach a manual choice for MANUAL mode or the HYBRID fallback
    pub fn with_manual_choice(mut self, choice: ManualChoice) -> Self {
        self.manual = Some(choice);
        self
    }

    /// Force the manual path even when automation would find a match
    pub fn with_force_manual(mut self, force: bool) -> Self {
        self.force_manual = force;
        self
    }
}

#[async_trait::async_trait]
impl crate::engine::WorkUnit for DecisionWork {
    async fn run(&self, ctx: &mut ExecutionContext) -> Result<sopflow_core::Value> {
        let result =
            DecisionEngine::decide(&self.config, ctx, self.manual.as_ref(), self.force_manual)?;

        let json = serde_json::to_value(&result)
            .map_err(|e| RuntimeError::WorkFailed(e.to_string()))?;
        let value: sopflow_core::Value = serde_json::from_value(json)
            .map_err(|e| RuntimeError::WorkFailed(e.to_string()))?;

        ctx.store_variable("last_decision", value.clone());
        Ok(value)
    }
}

/// Conditions evaluated in one pass: the decision's own conditions first,
/// then option guards not already present, in option order
fn ordered_conditions(config: &DecisionConfig) -> Vec<Condition> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::new();

    for cond in &config.conditions {
        if seen.insert(cond.id.as_str()) {
            ordered.push(cond.clone());
        }
    }
    for option in &config.options {
        for cond in &option.conditions {
            if seen.insert(cond.id.as_str()) {
                ordered.push(cond.clone());
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionMetadata;
    use sopflow_core::{ConditionOperator, LogicOperator, Value};
    use std::collections::HashMap;

    fn context(amount: f64, department: &str) -> ExecutionContext {
        let mut input = HashMap::new();
        input.insert("amount".to_string(), Value::Number(amount));
        input.insert(
            "department".to_string(),
            Value::String(department.to_string()),
        );
        ExecutionContext::new(ExecutionMetadata::new("sop-1")).with_input(input)
    }

    fn approval_config() -> DecisionConfig {
        let amount = Condition::new(
            "c-amount",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        )
        .with_weight(2.0);
        let dept = Condition::new(
            "c-dept",
            "input.department",
            ConditionOperator::Equals,
            Value::String("finance".to_string()),
        );

        DecisionConfig::new(
            "dp-approval",
            vec![
                DecisionOption::new("opt-approve", "Approve")
                    .with_priority(10)
                    .with_conditions(vec![amount.clone(), dept.clone()]),
                DecisionOption::new("opt-standard", "Standard").with_priority(1),
            ],
        )
        .with_conditions(vec![amount, dept])
        .with_logic(LogicOperator::And)
    }

    #[test]
    fn test_automated_selects_guarded_option() {
        let mut ctx = context(1500.0, "finance");
        let config = approval_config();

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();

        assert_eq!(result.selected_option.as_deref(), Some("opt-approve"));
        assert!(result.is_automated);
        assert!(result.confidence > 0.0);
        assert!(result.confidence <= 100.0);
        assert!(!result.requires_manual_intervention);
    }

    #[test]
    fn test_automated_falls_back_to_unconditioned() {
        let mut ctx = context(500.0, "hr");
        let config = approval_config();

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert_eq!(result.selected_option.as_deref(), Some("opt-standard"));
    }

    #[test]
    fn test_decision_path_shape() {
        let mut ctx = context(1500.0, "finance");
        let config = approval_config();

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();

        // One line per condition, one for the combinator, one for selection
        assert_eq!(result.decision_path.len(), 4);
        assert!(result.decision_path[0].contains("=> PASS"));
        assert!(result.decision_path[2].starts_with("Logic"));
        assert!(result.decision_path[3].contains("Approve"));
    }

    #[test]
    fn test_decision_appends_audit_entry() {
        let mut ctx = context(1500.0, "finance");
        let config = approval_config();

        DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(ctx.audit_trail.iter().any(|e| e.action == "decision"));
    }

    #[test]
    fn test_no_options_fails_fast() {
        let mut ctx = context(1.0, "hr");
        let config = DecisionConfig::new("dp-empty", vec![]);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false);
        assert!(matches!(
            result,
            Err(RuntimeError::MissingConfiguration(_))
        ));
        // Fail-fast: nothing was evaluated, nothing was audited
        assert!(ctx.audit_trail.is_empty());
    }

    #[test]
    fn test_timeout_behavior_default_substitutes() {
        let mut ctx = context(500.0, "hr");
        let guard = Condition::new(
            "c-amount",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![
                DecisionOption::new("a", "A").with_conditions(vec![guard.clone()]),
                DecisionOption::new("fallback", "Fallback")
                    .with_conditions(vec![guard.clone()]),
            ],
        )
        .with_conditions(vec![guard])
        .with_default_option("fallback");

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert_eq!(result.selected_option.as_deref(), Some("fallback"));
        assert!(result
            .decision_path
            .iter()
            .any(|line| line.contains("default option")));
    }

    #[test]
    fn test_timeout_behavior_fail_transitions_state() {
        let mut ctx = context(500.0, "hr");
        let guard = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![DecisionOption::new("a", "A").with_conditions(vec![guard.clone()])],
        )
        .with_conditions(vec![guard])
        .with_timeout_behavior(TimeoutBehavior::Fail);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(result.selected_option.is_none());
        assert_eq!(ctx.state, ExecutionState::Failed);
    }

    #[test]
    fn test_timeout_behavior_escalate_raises_level() {
        let mut ctx = context(500.0, "hr");
        let guard = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![DecisionOption::new("a", "A").with_conditions(vec![guard.clone()])],
        )
        .with_conditions(vec![guard])
        .with_timeout_behavior(TimeoutBehavior::Escalate);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(result.requires_escalation);
        assert_eq!(ctx.escalation_level, 1);
        assert_eq!(ctx.state, ExecutionState::Escalated);
    }

    #[test]
    fn test_manual_requires_justification() {
        let mut ctx = context(1.0, "hr");
        let mut config = approval_config().with_mode(DecisionMode::Manual);
        config.requires_justification = true;

        let choice = ManualChoice {
            option_id: "opt-standard".to_string(),
            decided_by: "alice".to_string(),
            justification: None,
            attachments: HashMap::new(),
        };

        let result = DecisionEngine::decide(&config, &mut ctx, Some(&choice), false);
        assert!(matches!(result, Err(RuntimeError::JustificationRequired)));
    }

    #[test]
    fn test_manual_decision_records_actor() {
        let mut ctx = context(1.0, "hr");
        let config = approval_config().with_mode(DecisionMode::Manual);

        let choice = ManualChoice {
            option_id: "opt-standard".to_string(),
            decided_by: "alice".to_string(),
            justification: Some("policy exception".to_string()),
            attachments: HashMap::new(),
        };

        let result = DecisionEngine::decide(&config, &mut ctx, Some(&choice), false).unwrap();
        assert!(!result.is_automated);
        assert_eq!(result.decided_by.as_deref(), Some("alice"));
        assert_eq!(result.reason, "policy exception");
        assert!(ctx
            .audit_trail
            .iter()
            .any(|e| e.action == "decision" && e.actor == "alice"));
    }

    #[test]
    fn test_manual_unknown_option() {
        let mut ctx = context(1.0, "hr");
        let config = approval_config().with_mode(DecisionMode::Manual);

        let choice = ManualChoice {
            option_id: "nope".to_string(),
            decided_by: "alice".to_string(),
            justification: None,
            attachments: HashMap::new(),
        };

        let result = DecisionEngine::decide(&config, &mut ctx, Some(&choice), false);
        assert!(matches!(result, Err(RuntimeError::UnknownOption(_))));
    }

    #[test]
    fn test_hybrid_automated_when_match_found() {
        let mut ctx = context(1500.0, "finance");
        let config = approval_config().with_mode(DecisionMode::Hybrid);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(result.is_automated);
        assert_eq!(result.selected_option.as_deref(), Some("opt-approve"));
    }

    #[test]
    fn test_hybrid_falls_back_to_manual() {
        let mut ctx = context(500.0, "hr");
        // All options guarded so nothing matches
        let guard = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![
                DecisionOption::new("a", "A").with_conditions(vec![guard.clone()]),
                DecisionOption::new("b", "B").with_conditions(vec![guard.clone()]),
            ],
        )
        .with_conditions(vec![guard])
        .with_mode(DecisionMode::Hybrid);

        let choice = ManualChoice {
            option_id: "b".to_string(),
            decided_by: "bob".to_string(),
            justification: Some("supervisor call".to_string()),
            attachments: HashMap::new(),
        };

        let result = DecisionEngine::decide(&config, &mut ctx, Some(&choice), false).unwrap();
        assert!(!result.is_automated);
        assert_eq!(result.selected_option.as_deref(), Some("b"));
        // Trail records both phases
        assert!(result
            .decision_path
            .iter()
            .any(|line| line.contains("No matching option")));
        assert!(result
            .decision_path
            .iter()
            .any(|line| line.contains("Manual decision")));
    }

    #[test]
    fn test_hybrid_without_choice_requests_intervention() {
        let mut ctx = context(500.0, "hr");
        let guard = Condition::new(
            "c",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![DecisionOption::new("a", "A").with_conditions(vec![guard.clone()])],
        )
        .with_conditions(vec![guard])
        .with_mode(DecisionMode::Hybrid);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(result.requires_manual_intervention);
        assert!(result.selected_option.is_none());
        assert_eq!(ctx.state, ExecutionState::WaitingApproval);
    }

    #[test]
    fn test_hybrid_force_manual_overrides_automation() {
        let mut ctx = context(1500.0, "finance");
        let config = approval_config().with_mode(DecisionMode::Hybrid);

        let choice = ManualChoice {
            option_id: "opt-standard".to_string(),
            decided_by: "carol".to_string(),
            justification: Some("override".to_string()),
            attachments: HashMap::new(),
        };

        let result = DecisionEngine::decide(&config, &mut ctx, Some(&choice), true).unwrap();
        assert!(!result.is_automated);
        assert_eq!(result.selected_option.as_deref(), Some("opt-standard"));
    }

    #[test]
    fn test_custom_logic_failure_escalates_and_propagates() {
        let mut ctx = context(1500.0, "finance");
        let mut config = approval_config().with_logic(LogicOperator::Custom);
        config.custom_logic = Some(r#"all("does-not-exist")"#.to_string());

        let result = DecisionEngine::decide(&config, &mut ctx, None, false);
        assert!(matches!(result, Err(RuntimeError::DecisionFailed(_))));
        assert_eq!(ctx.escalation_level, 1);
        assert!(ctx
            .audit_trail
            .iter()
            .any(|e| e.action == "decision-error"));
    }

    #[test]
    fn test_confidence_bounds_and_penalty() {
        // One condition errors (bad regex), one passes
        let mut ctx = context(1500.0, "finance");
        let bad = Condition::new(
            "c-bad",
            "input.department",
            ConditionOperator::Regex,
            Value::String("[unclosed".to_string()),
        );
        let good = Condition::new(
            "c-good",
            "input.amount",
            ConditionOperator::GreaterThan,
            Value::Number(1000.0),
        );
        let config = DecisionConfig::new(
            "dp-1",
            vec![
                DecisionOption::new("a", "A").with_conditions(vec![good.clone()]),
                DecisionOption::new("b", "B"),
            ],
        )
        .with_conditions(vec![bad, good])
        .with_logic(LogicOperator::Or);

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        assert!(result.confidence >= 0.0 && result.confidence <= 100.0);
        // base 50 - penalty 10 + bonus 10 = 50
        assert_eq!(result.confidence, 50.0);
    }

    #[test]
    fn test_confidence_empty_condition_set_is_bonus_only() {
        let mut ctx = context(1.0, "hr");
        let config = DecisionConfig::new(
            "dp-1",
            vec![DecisionOption::new("only", "Only")],
        );

        let result = DecisionEngine::decide(&config, &mut ctx, None, false).unwrap();
        // Unconditioned fallback selected; no conditions, no bonus
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.selected_option.as_deref(), Some("only"));
    }
}
