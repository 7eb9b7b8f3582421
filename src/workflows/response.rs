// Transport-agnostic request and response documents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::WorkflowError;
use super::step::{StepId, StepNode, TotalSteps};
use crate::persistence::SessionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    /// Produced by upstream field validators, never by the engine itself
    ValidationError,
    BusinessRuleError,
    SystemError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub session_id: String,
    pub workflow_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub session_id: String,
    pub current_step: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackRequest {
    pub session_id: String,
    pub current_step: String,
    /// Which predecessor the forward path came through, for steps with several
    #[serde(default)]
    pub came_from: Option<String>,
}

/// The document every engine operation answers with.
///
/// Successful responses carry the node configuration; failures carry only the
/// status and a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<StepId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<TotalSteps>,
    #[serde(default)]
    pub can_go_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_step: Option<StepId>,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WorkflowResponse {
    pub fn from_node(node: StepNode, session_status: SessionStatus) -> Self {
        Self {
            step_id: Some(node.step_id),
            component_name: Some(node.component_name),
            data: Some(node.data),
            step_number: Some(node.step_number),
            total_steps: Some(node.total_steps),
            can_go_back: node.can_go_back,
            previous_step: node.previous_step,
            status: ResponseStatus::Success,
            workflow_complete: node.workflow_complete.then_some(true),
            session_status: Some(session_status),
            message: None,
        }
    }

    pub fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            step_id: None,
            component_name: None,
            data: None,
            step_number: None,
            total_steps: None,
            can_go_back: false,
            previous_step: None,
            status,
            workflow_complete: None,
            session_status: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl From<&WorkflowError> for WorkflowResponse {
    fn from(err: &WorkflowError) -> Self {
        WorkflowResponse::failure(err.classification(), err.to_string())
    }
}
