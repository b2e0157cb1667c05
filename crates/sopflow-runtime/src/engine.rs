//! Execution engine
//!
//! Drives one unit of work through its lifecycle: validation, pre hooks,
//! the work function with retry and timeout, post or error hooks, and
//! finally a bounded history record. The engine never panics a run into
//! the caller; every outcome is reported as an `ExecutionReport`.

use crate::context::{ExecutionContext, ExecutionState};
use crate::error::{Result, RuntimeError};
use crate::hooks::{HookPhase, HookRegistry};
use crate::result::{ExecutionMetrics, ExecutionReport, ExecutionSummary};
use crate::validation::ValidationFramework;
use async_trait::async_trait;
use chrono::Utc;
use sopflow_core::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Completed runs kept in the in-memory history
pub const HISTORY_LIMIT: usize = 100;

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Retries after the first failed attempt
    pub retry_attempts: u32,

    /// Delay between attempts
    pub retry_delay: Duration,

    /// Per-attempt timeout; `None` means unbounded
    pub timeout: Option<Duration>,

    /// Skip the validation pass entirely
    pub skip_validation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 0,
            retry_delay: Duration::from_millis(500),
            timeout: None,
            skip_validation: false,
        }
    }
}

/// The unit of work an execution runs
#[async_trait]
pub trait WorkUnit: Send + Sync {
    /// Perform the work, mutating the context as needed. The returned
    /// value becomes the execution output.
    async fn run(&self, ctx: &mut ExecutionContext) -> Result<Value>;
}

struct ActiveRun {
    cancelled: Arc<AtomicBool>,
}

/// Execution engine
pub struct ExecutionEngine {
    config: EngineConfig,
    hooks: HookRegistry,
    validation: ValidationFramework,
    active: Mutex<HashMap<Uuid, ActiveRun>>,
    history: Mutex<VecDeque<ExecutionSummary>>,
}

impl ExecutionEngine {
    /// Create an engine with the default hooks and compliance rules
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            hooks: HookRegistry::with_defaults(),
            validation: ValidationFramework::with_defaults(),
            active: Mutex::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Replace the hook registry, dropping the default audit hooks
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the validation framework, dropping the default compliance
    /// rules
    pub fn with_validation(mut self, validation: ValidationFramework) -> Self {
        self.validation = validation;
        self
    }

    /// Mutable access to the hook registry, for registration at setup time
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Mutable access to the validation framework, for registration at
    /// setup time
    pub fn validation_mut(&mut self) -> &mut ValidationFramework {
        &mut self.validation
    }

    /// Run one execution to completion and report the outcome
    pub async fn execute(&self, mut ctx: ExecutionContext, work: &dyn WorkUnit) -> ExecutionReport {
        let started = Instant::now();
        let mut logs = Vec::new();
        let mut metrics = ExecutionMetrics::default();

        let cancelled = Arc::new(AtomicBool::new(false));
        self.register(&ctx, Arc::clone(&cancelled));
        tracing::debug!(execution = %ctx.execution_id, step = %ctx.metadata.id, "execution started");

        // Validation gate
        let validation = if self.config.skip_validation {
            None
        } else {
            let validation_started = Instant::now();
            let report = self.validation.validate(&ctx);
            metrics.validation_ms = validation_started.elapsed().as_millis() as u64;

            if !report.is_valid {
                let error = RuntimeError::ValidationFailed {
                    error_count: report.errors.len(),
                };
                logs.push(format!("validation failed: {} error(s)", report.errors.len()));
                ctx.set_state(ExecutionState::Failed);
                self.hooks
                    .run_phase(
                        HookPhase::Error,
                        &mut ctx,
                        Some(&Value::String(error.to_string())),
                    )
                    .await;
                metrics.total_ms = started.elapsed().as_millis() as u64;
                return self.finalize(ctx, None, Some(error), Some(report), metrics, logs);
            }
            logs.push("validation passed".to_string());
            Some(report)
        };

        self.hooks.run_phase(HookPhase::Pre, &mut ctx, None).await;
        ctx.set_state(ExecutionState::InProgress);

        // Work loop with retry
        let work_started = Instant::now();
        let mut outcome: Result<Value> = Err(RuntimeError::WorkFailed(
            "work function never ran".to_string(),
        ));
        for attempt in 0..=self.config.retry_attempts {
            if cancelled.load(Ordering::SeqCst) {
                outcome = Err(RuntimeError::Cancelled);
                break;
            }
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
                metrics.retry_count = attempt;
            }

            outcome = self.run_attempt(work, &mut ctx).await;
            match &outcome {
                Ok(_) => {
                    logs.push(format!("attempt {} succeeded", attempt + 1));
                    break;
                }
                Err(e) => {
                    logs.push(format!("attempt {} failed: {}", attempt + 1, e));
                    tracing::debug!(execution = %ctx.execution_id, attempt = attempt + 1, error = %e, "attempt failed");
                }
            }
        }
        metrics.work_ms = work_started.elapsed().as_millis() as u64;

        // Cancellation is advisory: it wins over a late failure but not
        // over work that already completed
        if outcome.is_err() && cancelled.load(Ordering::SeqCst) {
            outcome = Err(RuntimeError::Cancelled);
        }

        let (output, error) = match outcome {
            Ok(value) => {
                ctx.set_state(ExecutionState::Completed);
                self.hooks
                    .run_phase(HookPhase::Post, &mut ctx, Some(&value))
                    .await;
                (Some(value), None)
            }
            Err(e) => {
                let state = if matches!(e, RuntimeError::Cancelled) {
                    ExecutionState::Cancelled
                } else {
                    ExecutionState::Failed
                };
                ctx.set_state(state);
                self.hooks
                    .run_phase(
                        HookPhase::Error,
                        &mut ctx,
                        Some(&Value::String(e.to_string())),
                    )
                    .await;
                (None, Some(e))
            }
        };

        metrics.total_ms = started.elapsed().as_millis() as u64;
        self.finalize(ctx, output, error, validation, metrics, logs)
    }

    /// Request cancellation of an in-flight run. The run leaves the
    /// active set immediately; the work itself is only asked to stop at
    /// the next attempt boundary, never interrupted mid-attempt.
    pub fn cancel(&self, execution_id: Uuid) -> bool {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        match active.remove(&execution_id) {
            Some(run) => {
                run.cancelled.store(true, Ordering::SeqCst);
                tracing::debug!(execution = %execution_id, "cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Ids of currently running executions
    pub fn list_active(&self) -> Vec<Uuid> {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.keys().copied().collect()
    }

    /// Completed-run history, oldest first, bounded by `HISTORY_LIMIT`
    pub fn history(&self) -> Vec<ExecutionSummary> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().cloned().collect()
    }

    /// Look up one completed run by execution id
    pub fn history_for(&self, execution_id: Uuid) -> Option<ExecutionSummary> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history
            .iter()
            .find(|s| s.execution_id == execution_id)
            .cloned()
    }

    async fn run_attempt(&self, work: &dyn WorkUnit, ctx: &mut ExecutionContext) -> Result<Value> {
        match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, work.run(ctx)).await {
                Ok(result) => result,
                Err(_) => Err(RuntimeError::Timeout {
                    ms: limit.as_millis() as u64,
                }),
            },
            None => work.run(ctx).await,
        }
    }

    fn register(&self, ctx: &ExecutionContext, cancelled: Arc<AtomicBool>) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.insert(ctx.execution_id, ActiveRun { cancelled });
    }

    fn finalize(
        &self,
        mut ctx: ExecutionContext,
        output: Option<Value>,
        error: Option<RuntimeError>,
        validation: Option<crate::validation::ValidationReport>,
        metrics: ExecutionMetrics,
        logs: Vec<String>,
    ) -> ExecutionReport {
        let success = error.is_none();

        {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            active.remove(&ctx.execution_id);
        }

        ctx.append_audit(
            "execution-finished",
            "system",
            Some(format!("state: {:?}", ctx.state)),
        );

        let summary = ExecutionSummary {
            execution_id: ctx.execution_id,
            metadata_id: ctx.metadata.id.clone(),
            state: ctx.state,
            success,
            duration_ms: metrics.total_ms,
            finished_at: Utc::now(),
        };
        {
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            history.push_back(summary);
            while history.len() > HISTORY_LIMIT {
                history.pop_front();
            }
        }

        tracing::debug!(
            execution = %ctx.execution_id,
            state = ?ctx.state,
            total_ms = metrics.total_ms,
            "execution finished"
        );

        ExecutionReport {
            execution_id: ctx.execution_id,
            success,
            output,
            error: error.map(|e| e.to_string()),
            state: ctx.state,
            metrics,
            validation,
            logs,
            context: ctx,
        }
    }
}
