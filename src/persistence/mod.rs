//! Session state storage
//!
//! One record per session id holding the workflow type, the current step,
//! the accumulated context and the lifecycle status. Backends implement
//! [`SessionStore`]; the engine only ever sees the trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::workflows::{StepId, WorkflowContext, WorkflowType};

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

/// Errors raised by session store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Lifecycle of a session. Only `InProgress` accepts mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
            SessionStatus::Error => "error",
        }
    }

    /// No transition leaves a closed status.
    pub fn is_closed(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            "error" => Ok(SessionStatus::Error),
            other => Err(StoreError::Corrupt(format!("unknown session status: {other}"))),
        }
    }
}

/// Persisted record of one intake session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    pub id: String,
    pub workflow_type: WorkflowType,
    pub current_step: StepId,
    pub context: WorkflowContext,
    pub status: SessionStatus,
    /// Bumped on every change; stores compare it before replacing a record
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new(id: impl Into<String>, workflow_type: WorkflowType) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            workflow_type,
            current_step: workflow_type.entry_step(),
            context: WorkflowContext::new(),
            status: SessionStatus::InProgress,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this record moved to `step` with `context`, stamped now.
    pub fn advanced(&self, step: StepId, context: WorkflowContext, status: SessionStatus) -> Self {
        Self {
            current_step: step,
            context,
            status,
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: SessionStatus) -> Self {
        Self {
            status,
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Storage seam for session records.
///
/// `get` returns a complete snapshot; `upsert` replaces the whole record
/// unconditionally. Backends never expose a partially written record.
///
/// The engine writes through `create` and `compare_and_swap`, which must be
/// atomic against every other writer of the same backend, including other
/// processes sharing it.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<WorkflowSession>, StoreError>;

    async fn upsert(&self, session: &WorkflowSession) -> Result<(), StoreError>;

    /// Store a new record. `false` when the id is already taken.
    async fn create(&self, session: &WorkflowSession) -> Result<bool, StoreError>;

    /// Replace the record only if its stored revision is `expected_revision`.
    /// `false` when the record changed or vanished in the meantime.
    async fn compare_and_swap(
        &self,
        session: &WorkflowSession,
        expected_revision: u64,
    ) -> Result<bool, StoreError>;

    /// Returns whether a record was removed
    async fn delete(&self, session_id: &str) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<WorkflowSession>, StoreError>;
}

/// Build the store selected by `config`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    info!(backend = ?config.backend, "Opening session store");
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemorySessionStore::new())),
        StorageBackend::File => Ok(Arc::new(FileSessionStore::new(&config.directory))),
        #[cfg(feature = "database")]
        StorageBackend::Sqlite => {
            let database = config.database.as_ref().ok_or_else(|| {
                StoreError::Backend(
                    "sqlite backend selected without [storage.database]".to_string(),
                )
            })?;
            Ok(Arc::new(crate::database::SqliteSessionStore::connect(database).await?))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Sqlite => Err(StoreError::Backend(
            "sqlite backend requires the `database` feature".to_string(),
        )),
    }
}
