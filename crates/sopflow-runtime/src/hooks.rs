//! Execution hooks
//!
//! Hooks observe the execution lifecycle at three phases: before the work
//! runs, after it succeeds, and when it fails. Hooks run in priority order
//! (higher first; registration order breaks ties) and a failing hook never
//! fails the run: its error is logged and the remaining hooks still fire.

use crate::context::ExecutionContext;
use crate::error::Result;
use async_trait::async_trait;
use sopflow_core::Value;
use std::sync::Arc;

/// Lifecycle phase a hook is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before the work function runs (after validation)
    Pre,
    /// After the work function succeeds; `data` carries its output
    Post,
    /// After the work function fails; `data` carries the error message
    Error,
}

/// An execution lifecycle observer
#[async_trait]
pub trait ExecutionHook: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run the hook. `data` is the work output (post) or the error
    /// message (error); pre hooks receive `None`.
    async fn run(&self, ctx: &mut ExecutionContext, data: Option<&Value>) -> Result<()>;
}

struct Registration {
    phase: HookPhase,
    priority: i32,
    seq: u64,
    hook: Arc<dyn ExecutionHook>,
}

/// Ordered hook registry
#[derive(Default)]
pub struct HookRegistry {
    entries: Vec<Registration>,
    next_seq: u64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the audit hooks
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HookPhase::Pre, 0, Arc::new(AuditHook::pre()));
        registry.register(HookPhase::Post, 0, Arc::new(AuditHook::post()));
        registry.register(HookPhase::Error, 0, Arc::new(AuditHook::error()));
        registry
    }

    /// Register a hook for a phase. Higher priority runs first; hooks at
    /// equal priority run in registration order.
    pub fn register(&mut self, phase: HookPhase, priority: i32, hook: Arc<dyn ExecutionHook>) {
        self.entries.push(Registration {
            phase,
            priority,
            seq: self.next_seq,
            hook,
        });
        self.next_seq += 1;
    }

    /// Hooks for one phase, in execution order
    fn hooks_for(&self, phase: HookPhase) -> Vec<&Registration> {
        let mut hooks: Vec<&Registration> =
            self.entries.iter().filter(|e| e.phase == phase).collect();
        hooks.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        hooks
    }

    /// Run every hook of a phase, isolating individual failures
    pub async fn run_phase(
        &self,
        phase: HookPhase,
        ctx: &mut ExecutionContext,
        data: Option<&Value>,
    ) {
        for entry in self.hooks_for(phase) {
            if let Err(e) = entry.hook.run(ctx, data).await {
                tracing::warn!(hook = entry.hook.name(), error = %e, "hook failed");
            }
        }
    }
}

/// Built-in hook that records lifecycle transitions in the audit trail
pub struct AuditHook {
    name: &'static str,
    action: &'static str,
}

impl AuditHook {
    pub fn pre() -> Self {
        Self {
            name: "audit-pre",
            action: "execution-started",
        }
    }

    pub fn post() -> Self {
        Self {
            name: "audit-post",
            action: "execution-completed",
        }
    }

    pub fn error() -> Self {
        Self {
            name: "audit-error",
            action: "execution-failed",
        }
    }
}

#[async_trait]
impl ExecutionHook for AuditHook {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, ctx: &mut ExecutionContext, data: Option<&Value>) -> Result<()> {
        let details = data.map(|v| v.as_display_string());
        ctx.append_audit(self.action, "system", details);
        Ok(())
    }
}
