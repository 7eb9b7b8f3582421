//! The workflow engine facade
//!
//! Orchestrates start, transition, back, status and abandon against the
//! step graph, the back-navigation table, the completion resolver and a
//! [`SessionStore`]. Every operation answers with a status-tagged
//! [`WorkflowResponse`]; failures are never propagated to the caller as
//! errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use super::back_navigation;
use super::context::FormData;
use super::errors::WorkflowError;
use super::graph::{definition, StepGraph};
use super::lead_id::{LeadIdGenerator, TimestampLeadIds};
use super::response::{
    BackRequest, ResponseStatus, StartRequest, TransitionRequest, WorkflowResponse,
};
use super::session_lock::SessionLocks;
use super::step::{StepId, StepNode, WorkflowType};
use super::templates::LEAD_ID_KEY;
use crate::config::IntakeConfig;
use crate::observability::{create_workflow_span, workflow_metrics, OperationTimer, WorkflowMetrics};
use crate::persistence::{open_store, SessionStatus, SessionStore, WorkflowSession};
use crate::telemetry::generate_correlation_id;

/// A single engine operation, as accepted from a transport
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EngineRequest {
    Start(StartRequest),
    Transition(TransitionRequest),
    Back(BackRequest),
    #[serde(rename_all = "camelCase")]
    Status { session_id: String },
    #[serde(rename_all = "camelCase")]
    Abandon { session_id: String },
}

impl EngineRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            EngineRequest::Start(_) => "start",
            EngineRequest::Transition(_) => "transition",
            EngineRequest::Back(_) => "back",
            EngineRequest::Status { .. } => "status",
            EngineRequest::Abandon { .. } => "abandon",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            EngineRequest::Start(req) => &req.session_id,
            EngineRequest::Transition(req) => &req.session_id,
            EngineRequest::Back(req) => &req.session_id,
            EngineRequest::Status { session_id } | EngineRequest::Abandon { session_id } => {
                session_id
            }
        }
    }
}

type Outcome = Result<(StepNode, SessionStatus), WorkflowError>;

pub struct WorkflowEngine {
    graph: &'static StepGraph,
    store: Arc<dyn SessionStore>,
    lead_ids: Arc<dyn LeadIdGenerator>,
    metrics: Arc<WorkflowMetrics>,
    locks: SessionLocks,
}

impl WorkflowEngine {
    pub fn new(store: Arc<dyn SessionStore>) -> Result<Self, WorkflowError> {
        Ok(Self {
            graph: StepGraph::canonical()?,
            store,
            lead_ids: Arc::new(TimestampLeadIds::default()),
            metrics: workflow_metrics(),
            locks: SessionLocks::new(),
        })
    }

    /// Engine wired from configuration: store backend and lead ids.
    pub async fn from_config(config: &IntakeConfig) -> anyhow::Result<Self> {
        let store = open_store(&config.storage).await?;
        let lead_ids: Arc<dyn LeadIdGenerator> =
            Arc::from(config.leads.strategy.build(&config.leads.prefix));
        Ok(Self::new(store)?.with_lead_ids(lead_ids))
    }

    pub fn with_lead_ids(mut self, lead_ids: Arc<dyn LeadIdGenerator>) -> Self {
        self.lead_ids = lead_ids;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<WorkflowMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn graph(&self) -> &'static StepGraph {
        self.graph
    }

    pub fn metrics(&self) -> &WorkflowMetrics {
        &self.metrics
    }

    /// Dispatch a transport request to the matching operation.
    pub async fn handle(&self, request: EngineRequest) -> WorkflowResponse {
        match request {
            EngineRequest::Start(req) => self.start(&req.session_id, &req.workflow_type).await,
            EngineRequest::Transition(req) => {
                self.transition(&req.session_id, &req.current_step, &req.data)
                    .await
            }
            EngineRequest::Back(req) => {
                self.back(&req.session_id, &req.current_step, req.came_from.as_deref())
                    .await
            }
            EngineRequest::Status { session_id } => self.status(&session_id).await,
            EngineRequest::Abandon { session_id } => self.abandon(&session_id).await,
        }
    }

    /// Open a session, or return the current node of an existing one.
    pub async fn start(&self, session_id: &str, workflow_type: &str) -> WorkflowResponse {
        self.run("start", session_id, self.do_start(session_id, workflow_type))
            .await
    }

    /// Advance the session along the first forward edge admitted by `data`.
    pub async fn transition(
        &self,
        session_id: &str,
        current_step: &str,
        data: &FormData,
    ) -> WorkflowResponse {
        self.run(
            "transition",
            session_id,
            self.do_transition(session_id, current_step, data),
        )
        .await
    }

    /// Step back to the canonical predecessor. Context is kept as is.
    pub async fn back(
        &self,
        session_id: &str,
        current_step: &str,
        came_from: Option<&str>,
    ) -> WorkflowResponse {
        self.run("back", session_id, self.do_back(session_id, current_step, came_from))
            .await
    }

    /// Read-only view of the session's current node.
    pub async fn status(&self, session_id: &str) -> WorkflowResponse {
        self.run("status", session_id, self.do_status(session_id))
            .await
    }

    pub async fn abandon(&self, session_id: &str) -> WorkflowResponse {
        self.run("abandon", session_id, self.do_abandon(session_id))
            .await
    }

    /// Every stored session, oldest first.
    pub async fn sessions(&self) -> Result<Vec<WorkflowSession>, WorkflowError> {
        Ok(self.store.list().await?)
    }

    async fn run(
        &self,
        operation: &'static str,
        session_id: &str,
        work: impl std::future::Future<Output = Outcome>,
    ) -> WorkflowResponse {
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span(operation, session_id, &correlation_id);
        let timer = OperationTimer::new(operation);
        let outcome = work.instrument(span.clone()).await;
        timer.finish();

        let _entered = span.enter();
        match outcome {
            Ok((node, status)) => WorkflowResponse::from_node(node, status),
            Err(err) => {
                match err.classification() {
                    ResponseStatus::SystemError => {
                        self.metrics.record_system_error();
                        error!(operation, session_id, error = %err, "Workflow operation failed");
                    }
                    _ => {
                        if matches!(err, WorkflowError::StaleStep { .. }) {
                            self.metrics.record_stale_rejection();
                        }
                        self.metrics.record_business_rule_error();
                        warn!(operation, session_id, error = %err, "Workflow operation rejected");
                    }
                }
                WorkflowResponse::from(&err)
            }
        }
    }

    async fn load(&self, session_id: &str) -> Result<WorkflowSession, WorkflowError> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| WorkflowError::SessionNotFound(session_id.to_string()))
    }

    fn render(&self, session: &WorkflowSession) -> (StepNode, SessionStatus) {
        (
            self.graph.render(session.current_step, &session.context),
            session.status,
        )
    }

    async fn do_start(&self, session_id: &str, workflow_type: &str) -> Outcome {
        let workflow_type: WorkflowType = workflow_type.parse()?;
        let _guard = self.locks.acquire(session_id).await;

        if let Some(existing) = self.store.get(session_id).await? {
            return Ok(self.resume(existing));
        }

        let session = WorkflowSession::new(session_id, workflow_type);
        if !self.store.create(&session).await? {
            // Another process created it between our read and write
            let existing = self.load(session_id).await?;
            return Ok(self.resume(existing));
        }
        self.metrics.record_session_started();
        info!(
            session_id,
            workflow_type = %workflow_type,
            entry = %session.current_step,
            "Started workflow session"
        );
        Ok(self.render(&session))
    }

    fn resume(&self, existing: WorkflowSession) -> (StepNode, SessionStatus) {
        self.metrics.record_session_resumed();
        info!(
            session_id = %existing.id,
            workflow_type = %existing.workflow_type,
            current_step = %existing.current_step,
            status = %existing.status,
            "Resumed existing workflow session"
        );
        self.render(&existing)
    }

    /// Write `updated` only if the stored record is still `previous`.
    async fn commit(
        &self,
        previous: &WorkflowSession,
        updated: &WorkflowSession,
    ) -> Result<(), WorkflowError> {
        if self.store.compare_and_swap(updated, previous.revision).await? {
            return Ok(());
        }
        let fresh = self.load(&previous.id).await?;
        debug!(
            session_id = %previous.id,
            expected_revision = previous.revision,
            stored_revision = fresh.revision,
            "Lost compare-and-swap on session"
        );
        Err(if fresh.status.is_closed() {
            WorkflowError::SessionClosed {
                session_id: previous.id.clone(),
                status: fresh.status,
            }
        } else if fresh.current_step != previous.current_step {
            WorkflowError::StaleStep {
                expected: fresh.current_step,
                actual: previous.current_step,
            }
        } else {
            WorkflowError::ConcurrentModification(previous.id.clone())
        })
    }

    async fn do_transition(
        &self,
        session_id: &str,
        current_step: &str,
        data: &FormData,
    ) -> Outcome {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.load(session_id).await?;
        let current: StepId = current_step.parse()?;

        if session.status.is_closed() {
            return Err(WorkflowError::SessionClosed {
                session_id: session_id.to_string(),
                status: session.status,
            });
        }
        if current != session.current_step {
            return Err(WorkflowError::StaleStep {
                expected: session.current_step,
                actual: current,
            });
        }

        // The lead reference is engine-owned; clients cannot supply it
        let mut submitted = data.clone();
        if submitted.remove(LEAD_ID_KEY).is_some() {
            debug!(session_id, "Ignoring client-supplied lead id");
        }

        let merged = session.context.merge(&submitted);
        let resolution = self.graph.next_step(current, &submitted, &merged)?;
        let mut context = resolution
            .marks
            .iter()
            .fold(merged, |ctx, (key, value)| ctx.with(key, Value::from(*value)));

        let terminal = definition(resolution.next).terminal;
        let status = if terminal {
            context = context.with(LEAD_ID_KEY, Value::from(self.lead_ids.next_id()));
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        };

        let updated = session.advanced(resolution.next, context, status);
        self.commit(&session, &updated).await?;

        self.metrics.record_transition();
        if terminal {
            self.metrics.record_completion();
        }
        info!(
            session_id,
            from = %current,
            to = %resolution.next,
            rule = ?resolution.classification.map(|c| c.rule),
            completed = terminal,
            "Workflow transition"
        );
        Ok(self.render(&updated))
    }

    async fn do_back(
        &self,
        session_id: &str,
        current_step: &str,
        came_from: Option<&str>,
    ) -> Outcome {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.load(session_id).await?;
        let current: StepId = current_step.parse()?;
        let hint = came_from.map(|step| step.parse::<StepId>()).transpose()?;

        if current != session.current_step {
            return Err(WorkflowError::StaleStep {
                expected: session.current_step,
                actual: current,
            });
        }
        let previous = back_navigation::previous_step(current, hint)?;
        if session.status.is_closed() {
            return Err(WorkflowError::SessionClosed {
                session_id: session_id.to_string(),
                status: session.status,
            });
        }

        let updated = session.advanced(previous, session.context.clone(), session.status);
        self.commit(&session, &updated).await?;

        self.metrics.record_back_navigation();
        info!(
            session_id,
            from = %current,
            to = %previous,
            hinted = hint.is_some(),
            "Workflow back navigation"
        );
        Ok(self.render(&updated))
    }

    async fn do_status(&self, session_id: &str) -> Outcome {
        let session = self.load(session_id).await?;
        Ok(self.render(&session))
    }

    async fn do_abandon(&self, session_id: &str) -> Outcome {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.load(session_id).await?;

        match session.status {
            SessionStatus::InProgress => {
                let updated = session.with_status(SessionStatus::Abandoned);
                match self.commit(&session, &updated).await {
                    Ok(()) => {}
                    // Abandoned concurrently; abandoning is idempotent
                    Err(WorkflowError::SessionClosed {
                        status: SessionStatus::Abandoned,
                        ..
                    }) => return self.do_status(session_id).await,
                    Err(err) => return Err(err),
                }
                self.metrics.record_abandonment();
                info!(session_id, step = %updated.current_step, "Workflow session abandoned");
                Ok(self.render(&updated))
            }
            SessionStatus::Abandoned => Ok(self.render(&session)),
            status => Err(WorkflowError::SessionClosed {
                session_id: session_id.to_string(),
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{InMemorySessionStore, MockSessionStore, StoreError};
    use serde_json::json;

    struct FixedLeadIds;

    impl LeadIdGenerator for FixedLeadIds {
        fn next_id(&self) -> String {
            "LEAD-TEST".to_string()
        }
    }

    fn engine() -> (WorkflowEngine, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = WorkflowEngine::new(store.clone())
            .unwrap()
            .with_lead_ids(Arc::new(FixedLeadIds))
            .with_metrics(Arc::new(WorkflowMetrics::new()));
        (engine, store)
    }

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap()
    }

    fn mocked(store: MockSessionStore) -> WorkflowEngine {
        WorkflowEngine::new(Arc::new(store))
            .unwrap()
            .with_lead_ids(Arc::new(FixedLeadIds))
            .with_metrics(Arc::new(WorkflowMetrics::new()))
    }

    #[tokio::test]
    async fn start_twice_returns_identical_documents() {
        let (engine, _) = engine();
        let first = engine.start("twice", "selling").await;
        let second = engine.start("twice", "selling").await;
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn client_cannot_choose_the_lead_id() {
        let (engine, store) = engine();
        engine.start("s1", "selling").await;
        for (step, data) in [
            ("intent-selection", json!({"intent": "selling", "lead_id": "MINE-1"})),
            ("has-buyer", json!({"has_buyer": "no_buyer"})),
            ("dealer-network", json!({})),
            ("selling-confirmation", json!({})),
        ] {
            assert!(engine.transition("s1", step, &form(data)).await.is_success());
        }
        let before = store.get("s1").await.unwrap().unwrap();
        assert!(before.context.get("lead_id").is_none());

        let done = engine
            .transition(
                "s1",
                "replacement-check",
                &form(json!({"replacement": "no_replacement", "lead_id": {"forged": true}})),
            )
            .await;
        assert_eq!(done.step_id, Some(StepId::DealerNetworkComplete));
        assert_eq!(done.data.unwrap()["leadId"], "LEAD-TEST");

        let stored = store.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.context.get("lead_id"), Some(&json!("LEAD-TEST")));
    }

    #[tokio::test]
    async fn lost_swap_reports_the_step_another_writer_chose() {
        let mut store = MockSessionStore::new();
        let stored = WorkflowSession::new("s1", WorkflowType::Selling);
        let moved = stored.advanced(StepId::HasBuyer, stored.context.clone(), stored.status);
        let mut reads = vec![moved, stored];
        store
            .expect_get()
            .times(2)
            .returning(move |_| Ok(reads.pop()));
        store
            .expect_compare_and_swap()
            .withf(|_, expected| *expected == 0)
            .times(1)
            .returning(|_, _| Ok(false));

        let engine = mocked(store);
        let response = engine
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;

        assert_eq!(response.status, ResponseStatus::BusinessRuleError);
        assert_eq!(
            response.message.as_deref(),
            Some("Step mismatch. Expected: has-buyer, got: intent-selection")
        );
        assert_eq!(engine.metrics().get_stats().stale_rejections, 1);
    }

    #[tokio::test]
    async fn load_failure_is_a_system_error() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Backend("connection reset".to_string())));
        store.expect_compare_and_swap().never();

        let response = mocked(store)
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;

        assert_eq!(response.status, ResponseStatus::SystemError);
        assert!(response.message.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn save_failure_is_a_system_error() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|id| Ok(Some(WorkflowSession::new(id, WorkflowType::Buying))));
        store
            .expect_compare_and_swap()
            .times(1)
            .returning(|_, _| Err(StoreError::Io(std::io::Error::other("disk full"))));

        let response = mocked(store)
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;

        assert_eq!(response.status, ResponseStatus::SystemError);
        assert!(response.step_id.is_none());
    }

    #[tokio::test]
    async fn start_does_not_write_when_session_exists() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|id| Ok(Some(WorkflowSession::new(id, WorkflowType::Selling))));
        store.expect_create().never();
        store.expect_upsert().never();

        let response = mocked(store).start("existing", "buying").await;
        assert_eq!(response.step_id, Some(StepId::IntentSelection));
    }

    #[tokio::test]
    async fn start_resumes_when_another_process_created_first() {
        let mut store = MockSessionStore::new();
        let mut reads = vec![Some(WorkflowSession::new("race", WorkflowType::Selling)), None];
        store
            .expect_get()
            .times(2)
            .returning(move |_| Ok(reads.pop().flatten()));
        store.expect_create().times(1).returning(|_| Ok(false));

        let engine = mocked(store);
        let response = engine.start("race", "buying").await;
        assert!(response.is_success());
        assert_eq!(engine.metrics().get_stats().sessions_started, 0);
        assert_eq!(engine.metrics().get_stats().sessions_resumed, 1);
    }

    #[tokio::test]
    async fn status_never_writes() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|id| Ok(Some(WorkflowSession::new(id, WorkflowType::Buying))));
        store.expect_upsert().never();
        store.expect_create().never();
        store.expect_compare_and_swap().never();

        assert!(mocked(store).status("read-only").await.is_success());
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let (engine, store) = engine();
        let first = engine.start("s1", "buying").await;
        assert_eq!(first.step_id, Some(StepId::IntentSelection));
        assert_eq!(first.session_status, Some(SessionStatus::InProgress));

        engine
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;
        let again = engine.start("s1", "selling").await;
        assert_eq!(again.step_id, Some(StepId::VehicleKnowledge));

        let stored = store.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.workflow_type, WorkflowType::Buying);
        assert_eq!(engine.metrics().get_stats().sessions_started, 1);
        assert_eq!(engine.metrics().get_stats().sessions_resumed, 1);
    }

    #[tokio::test]
    async fn unknown_workflow_type_creates_nothing() {
        let (engine, store) = engine();
        let response = engine.start("s1", "leasing").await;
        assert_eq!(response.status, ResponseStatus::BusinessRuleError);
        assert_eq!(response.message.as_deref(), Some("Invalid workflow type: leasing"));
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_step_leaves_state_untouched() {
        let (engine, store) = engine();
        engine.start("s1", "selling").await;
        engine
            .transition("s1", "intent-selection", &form(json!({"intent": "selling"})))
            .await;
        let before = store.get("s1").await.unwrap().unwrap();

        let response = engine
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;
        assert_eq!(response.status, ResponseStatus::BusinessRuleError);
        assert_eq!(
            response.message.as_deref(),
            Some("Step mismatch. Expected: has-buyer, got: intent-selection")
        );
        assert_eq!(store.get("s1").await.unwrap().unwrap(), before);
        assert_eq!(engine.metrics().get_stats().stale_rejections, 1);
    }

    #[tokio::test]
    async fn missing_session_and_unknown_step_are_system_errors() {
        let (engine, _) = engine();
        let missing = engine.transition("nope", "intent-selection", &FormData::new()).await;
        assert_eq!(missing.status, ResponseStatus::SystemError);
        assert_eq!(missing.message.as_deref(), Some("Workflow session not found: nope"));

        engine.start("s1", "buying").await;
        let unknown = engine.transition("s1", "teleport", &FormData::new()).await;
        assert_eq!(unknown.status, ResponseStatus::SystemError);
    }

    #[tokio::test]
    async fn reaching_a_terminal_completes_and_assigns_lead_id() {
        let (engine, store) = engine();
        engine.start("s1", "selling").await;
        for (step, data) in [
            ("intent-selection", json!({"intent": "selling"})),
            ("has-buyer", json!({"has_buyer": "has_buyer"})),
            ("buyer-type", json!({"buyer_type": "private"})),
            ("private-buyer", json!({"private_buyer_details": {"financing": "yes"}})),
            ("selling-confirmation", json!({})),
        ] {
            assert!(engine.transition("s1", step, &form(data)).await.is_success());
        }
        let done = engine
            .transition("s1", "replacement-check", &form(json!({"replacement": "no_replacement"})))
            .await;

        assert_eq!(done.step_id, Some(StepId::FinancingAssistanceComplete));
        assert_eq!(done.workflow_complete, Some(true));
        assert!(!done.can_go_back);
        assert_eq!(done.session_status, Some(SessionStatus::Completed));
        assert_eq!(done.data.unwrap()["leadId"], "LEAD-TEST");

        let stored = store.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        assert_eq!(stored.context.get("lead_id"), Some(&json!("LEAD-TEST")));

        let status = engine.status("s1").await;
        assert_eq!(status.data.unwrap()["leadId"], "LEAD-TEST");
    }

    #[tokio::test]
    async fn back_keeps_context_and_rejects_terminal() {
        let (engine, store) = engine();
        engine.start("s1", "buying").await;
        engine
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;

        let back = engine.back("s1", "vehicle-knowledge", None).await;
        assert_eq!(back.step_id, Some(StepId::IntentSelection));
        assert!(!back.can_go_back);
        let stored = store.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.context.get("intent"), Some(&json!("buying")));

        let entry = engine.back("s1", "intent-selection", None).await;
        assert_eq!(entry.status, ResponseStatus::BusinessRuleError);
    }

    #[tokio::test]
    async fn abandon_is_monotonic() {
        let (engine, _) = engine();
        engine.start("s1", "buying").await;

        let abandoned = engine.abandon("s1").await;
        assert_eq!(abandoned.session_status, Some(SessionStatus::Abandoned));
        assert!(engine.abandon("s1").await.is_success());

        let after = engine
            .transition("s1", "intent-selection", &form(json!({"intent": "buying"})))
            .await;
        assert_eq!(after.status, ResponseStatus::BusinessRuleError);
        assert_eq!(after.message.as_deref(), Some("Workflow session s1 is abandoned"));
    }

    #[tokio::test]
    async fn requests_dispatch_by_operation_tag() {
        let (engine, _) = engine();
        let start: EngineRequest = serde_json::from_value(json!({
            "operation": "start", "sessionId": "s9", "workflowType": "selling"
        }))
        .unwrap();
        assert_eq!(start.operation(), "start");
        assert_eq!(start.session_id(), "s9");
        assert!(engine.handle(start).await.is_success());

        let status: EngineRequest =
            serde_json::from_value(json!({"operation": "status", "sessionId": "s9"})).unwrap();
        let response = engine.handle(status).await;
        assert_eq!(response.step_id, Some(StepId::IntentSelection));
    }
}
