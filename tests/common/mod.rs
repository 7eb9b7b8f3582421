// Shared helpers for engine integration tests

#![allow(dead_code)]

use dealer_intake::workflows::{FormData, LeadIdGenerator, WorkflowEngine, WorkflowResponse};
use dealer_intake::{InMemorySessionStore, SessionStore, StepId, WorkflowMetrics};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sequential lead ids so assertions do not depend on the clock
pub struct SequentialLeadIds(AtomicU64);

impl SequentialLeadIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }
}

impl LeadIdGenerator for SequentialLeadIds {
    fn next_id(&self) -> String {
        format!("LEAD-{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

pub fn form(value: Value) -> FormData {
    value.as_object().cloned().expect("form data must be a JSON object")
}

pub fn engine_with(store: Arc<dyn SessionStore>) -> WorkflowEngine {
    WorkflowEngine::new(store)
        .expect("canonical graph is valid")
        .with_lead_ids(Arc::new(SequentialLeadIds::new()))
        .with_metrics(Arc::new(WorkflowMetrics::new()))
}

pub fn memory_engine() -> (WorkflowEngine, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    (engine_with(store.clone()), store)
}

/// Submit a sequence of (step, data) pairs, asserting each one succeeds
pub async fn walk(
    engine: &WorkflowEngine,
    session: &str,
    steps: &[(&str, Value)],
) -> WorkflowResponse {
    let mut last = None;
    for (step, data) in steps {
        let response = engine.transition(session, step, &form(data.clone())).await;
        assert!(
            response.is_success(),
            "transition from {step} failed: {:?}",
            response.message
        );
        last = Some(response);
    }
    last.expect("walk needs at least one step")
}

pub fn step_of(response: &WorkflowResponse) -> StepId {
    response.step_id.expect("successful response carries a step id")
}
