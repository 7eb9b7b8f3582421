use anyhow::Result;
use serde::Serialize;
use std::process::ExitCode;

use dealer_intake::workflows::{ResponseStatus, WorkflowResponse};

pub mod graph;
pub mod session;
pub mod sessions;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<ExitCode>;
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 0 on success, 2 for rejected requests, 1 for system faults
pub fn exit_code(response: &WorkflowResponse) -> ExitCode {
    match response.status {
        ResponseStatus::Success => ExitCode::SUCCESS,
        ResponseStatus::ValidationError | ResponseStatus::BusinessRuleError => ExitCode::from(2),
        ResponseStatus::SystemError => ExitCode::FAILURE,
    }
}
