use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use dealer_intake::workflows::{
    BackRequest, EngineRequest, FormData, StartRequest, TransitionRequest, WorkflowEngine,
};

use super::{exit_code, print_json, Command};

/// Runs one engine operation and prints the response document
pub struct SessionCommand {
    engine: Arc<WorkflowEngine>,
    request: EngineRequest,
}

impl SessionCommand {
    pub fn new(engine: Arc<WorkflowEngine>, request: EngineRequest) -> Self {
        Self { engine, request }
    }

    pub fn start(engine: Arc<WorkflowEngine>, session: String, workflow_type: String) -> Self {
        Self::new(
            engine,
            EngineRequest::Start(StartRequest {
                session_id: session,
                workflow_type,
            }),
        )
    }

    pub fn transition(
        engine: Arc<WorkflowEngine>,
        session: String,
        step: String,
        data: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            engine,
            EngineRequest::Transition(TransitionRequest {
                session_id: session,
                current_step: step,
                data: parse_form_data(data)?,
            }),
        ))
    }

    pub fn back(
        engine: Arc<WorkflowEngine>,
        session: String,
        step: String,
        came_from: Option<String>,
    ) -> Self {
        Self::new(
            engine,
            EngineRequest::Back(BackRequest {
                session_id: session,
                current_step: step,
                came_from,
            }),
        )
    }

    /// Request document from `--request`, or stdin when absent
    pub fn from_document(engine: Arc<WorkflowEngine>, request: Option<String>) -> Result<Self> {
        let raw = match request {
            Some(raw) => raw,
            None => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("Failed to read request from stdin")?;
                raw
            }
        };
        let request: EngineRequest =
            serde_json::from_str(&raw).context("Request is not a valid engine request document")?;
        Ok(Self::new(engine, request))
    }
}

fn parse_form_data(raw: &str) -> Result<FormData> {
    match serde_json::from_str::<Value>(raw).context("--data is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--data must be a JSON object, got {other}"),
    }
}

impl Command for SessionCommand {
    async fn execute(&self) -> Result<ExitCode> {
        tracing::debug!(
            operation = self.request.operation(),
            session_id = self.request.session_id(),
            "Executing CLI request"
        );
        let response = self.engine.handle(self.request.clone()).await;
        print_json(&response)?;
        Ok(exit_code(&response))
    }
}
