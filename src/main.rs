use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;

use cli::commands::graph::GraphCommand;
use cli::commands::session::SessionCommand;
use cli::commands::sessions::SessionsCommand;
use cli::commands::Command;
use cli::{Cli, Commands};
use dealer_intake::config::{config, IntakeConfig};
use dealer_intake::telemetry::{init_telemetry, shutdown_telemetry};
use dealer_intake::workflows::{EngineRequest, WorkflowEngine};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let _ = IntakeConfig::load_env_file();
            IntakeConfig::load_from(Some(path))?
        }
        None => config()?.clone(),
    };
    cli.apply_overrides(&mut config);
    init_telemetry(&config.observability)?;

    let code = tokio::runtime::Runtime::new()?.block_on(async { run(cli.command, &config).await });
    shutdown_telemetry();
    code
}

async fn run(command: Commands, config: &IntakeConfig) -> Result<ExitCode> {
    let engine = Arc::new(WorkflowEngine::from_config(config).await?);
    let code = match command {
        Commands::Start {
            session,
            workflow_type,
        } => {
            SessionCommand::start(engine.clone(), session, workflow_type)
                .execute()
                .await
        }
        Commands::Transition {
            session,
            step,
            data,
        } => {
            SessionCommand::transition(engine.clone(), session, step, &data)?
                .execute()
                .await
        }
        Commands::Back {
            session,
            step,
            came_from,
        } => {
            SessionCommand::back(engine.clone(), session, step, came_from)
                .execute()
                .await
        }
        Commands::Status { session } => {
            SessionCommand::new(engine.clone(), EngineRequest::Status { session_id: session })
                .execute()
                .await
        }
        Commands::Abandon { session } => {
            SessionCommand::new(engine.clone(), EngineRequest::Abandon { session_id: session })
                .execute()
                .await
        }
        Commands::Handle { request } => {
            SessionCommand::from_document(engine.clone(), request)?
                .execute()
                .await
        }
        Commands::Sessions => SessionsCommand::new(engine.clone()).execute().await,
        Commands::Graph { json } => GraphCommand::new(json).execute().await,
    };

    if config.observability.metrics_enabled {
        engine.metrics().log_stats();
    }
    code
}
