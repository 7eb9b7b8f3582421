// Dealer intake library: the lead-intake workflow engine and its session stores
// This exposes the core components for the CLI, tests and embedding transports

pub mod config;
pub mod database;
pub mod observability;
pub mod persistence;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, IntakeConfig};
pub use observability::{create_workflow_span, workflow_metrics, OperationTimer, WorkflowMetrics};
pub use persistence::{
    FileSessionStore, InMemorySessionStore, SessionStatus, SessionStore, StoreError,
    WorkflowSession,
};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflows::{
    EngineRequest, ResponseStatus, StepId, WorkflowEngine, WorkflowError, WorkflowResponse,
    WorkflowType,
};

#[cfg(feature = "database")]
pub use database::SqliteSessionStore;
