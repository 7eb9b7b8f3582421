use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;

use dealer_intake::persistence::SessionStatus;
use dealer_intake::workflows::{StepId, WorkflowEngine, WorkflowType};

use super::{print_json, Command};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSummary {
    session_id: String,
    workflow_type: WorkflowType,
    current_step: StepId,
    status: SessionStatus,
    updated_at: DateTime<Utc>,
}

pub struct SessionsCommand {
    engine: Arc<WorkflowEngine>,
}

impl SessionsCommand {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }
}

impl Command for SessionsCommand {
    async fn execute(&self) -> Result<ExitCode> {
        let summaries: Vec<SessionSummary> = self
            .engine
            .sessions()
            .await?
            .into_iter()
            .map(|session| SessionSummary {
                session_id: session.id,
                workflow_type: session.workflow_type,
                current_step: session.current_step,
                status: session.status,
                updated_at: session.updated_at,
            })
            .collect();
        print_json(&summaries)?;
        Ok(ExitCode::SUCCESS)
    }
}
