use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::info;

/// Intake engine counters
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub sessions_started: AtomicU64,
    pub sessions_resumed: AtomicU64,
    pub transitions: AtomicU64,
    pub back_navigations: AtomicU64,
    pub completions: AtomicU64,
    pub abandonments: AtomicU64,
    pub stale_rejections: AtomicU64,
    pub business_rule_errors: AtomicU64,
    pub system_errors: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_resumed(&self) {
        self.sessions_resumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition(&self) {
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_back_navigation(&self) {
        self.back_navigations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self) {
        self.completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abandonment(&self) {
        self.abandonments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_rejection(&self) {
        self.stale_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_business_rule_error(&self) {
        self.business_rule_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_system_error(&self) {
        self.system_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_resumed: self.sessions_resumed.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            back_navigations: self.back_navigations.load(Ordering::Relaxed),
            completions: self.completions.load(Ordering::Relaxed),
            abandonments: self.abandonments.load(Ordering::Relaxed),
            stale_rejections: self.stale_rejections.load(Ordering::Relaxed),
            business_rule_errors: self.business_rule_errors.load(Ordering::Relaxed),
            system_errors: self.system_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            sessions_started = stats.sessions_started,
            transitions = stats.transitions,
            back_navigations = stats.back_navigations,
            completions = stats.completions,
            stale_rejections = stats.stale_rejections,
            business_rule_errors = stats.business_rule_errors,
            system_errors = stats.system_errors,
            "Workflow metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub sessions_started: u64,
    pub sessions_resumed: u64,
    pub transitions: u64,
    pub back_navigations: u64,
    pub completions: u64,
    pub abandonments: u64,
    pub stale_rejections: u64,
    pub business_rule_errors: u64,
    pub system_errors: u64,
}

/// Global metrics instance
static WORKFLOW_METRICS: LazyLock<Arc<WorkflowMetrics>> =
    LazyLock::new(|| Arc::new(WorkflowMetrics::new()));

pub fn workflow_metrics() -> Arc<WorkflowMetrics> {
    Arc::clone(&WORKFLOW_METRICS)
}

/// Span wrapping a single engine operation on a session
pub fn create_workflow_span(
    operation: &str,
    session_id: &str,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        operation = operation,
        session.id = session_id,
        correlation.id = correlation_id,
    )
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}
