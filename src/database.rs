#[cfg(feature = "database")]
use async_trait::async_trait;
#[cfg(feature = "database")]
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Row, SqlitePool};
#[cfg(feature = "database")]
use tracing::info;

#[cfg(feature = "database")]
use crate::config::DatabaseConfig;
#[cfg(feature = "database")]
use crate::persistence::{SessionStatus, SessionStore, StoreError, WorkflowSession};
#[cfg(feature = "database")]
use crate::workflows::{StepId, WorkflowContext, WorkflowType};

#[cfg(feature = "database")]
/// SQLite-backed session store
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteSessionStore {
    /// Open the database, creating it and running migrations if configured
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if !sqlx::Sqlite::database_exists(&config.url).await? {
            info!("Creating database at {}", config.url);
            sqlx::Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        if config.auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

#[cfg(feature = "database")]
fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<WorkflowSession, StoreError> {
    let workflow_type: String = row.try_get("workflow_type")?;
    let current_step: String = row.try_get("current_step")?;
    let context: String = row.try_get("context")?;
    let status: String = row.try_get("status")?;
    let revision: i64 = row.try_get("revision")?;

    Ok(WorkflowSession {
        id: row.try_get("session_id")?,
        workflow_type: workflow_type
            .parse::<WorkflowType>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        current_step: current_step
            .parse::<StepId>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        context: serde_json::from_str::<WorkflowContext>(&context)?,
        status: status.parse::<SessionStatus>()?,
        revision: u64::try_from(revision)
            .map_err(|_| StoreError::Corrupt(format!("negative revision {revision}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(feature = "database")]
fn revision_column(revision: u64) -> Result<i64, StoreError> {
    i64::try_from(revision)
        .map_err(|_| StoreError::Backend(format!("revision {revision} overflows")))
}

#[cfg(feature = "database")]
#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<WorkflowSession>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, workflow_type, current_step, context, status, revision,
                   created_at, updated_at
            FROM workflow_sessions
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn upsert(&self, session: &WorkflowSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO workflow_sessions
                (session_id, workflow_type, current_step, context, status, revision,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(session_id) DO UPDATE SET
                current_step = excluded.current_step,
                context = excluded.context,
                status = excluded.status,
                revision = excluded.revision,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.id)
        .bind(session.workflow_type.as_str())
        .bind(session.current_step.as_str())
        .bind(serde_json::to_string(&session.context)?)
        .bind(session.status.as_str())
        .bind(revision_column(session.revision)?)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create(&self, session: &WorkflowSession) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO workflow_sessions
                (session_id, workflow_type, current_step, context, status, revision,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(session_id) DO NOTHING
            "#,
        )
        .bind(&session.id)
        .bind(session.workflow_type.as_str())
        .bind(session.current_step.as_str())
        .bind(serde_json::to_string(&session.context)?)
        .bind(session.status.as_str())
        .bind(revision_column(session.revision)?)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn compare_and_swap(
        &self,
        session: &WorkflowSession,
        expected_revision: u64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE workflow_sessions
            SET current_step = ?1, context = ?2, status = ?3, revision = ?4, updated_at = ?5
            WHERE session_id = ?6 AND revision = ?7
            "#,
        )
        .bind(session.current_step.as_str())
        .bind(serde_json::to_string(&session.context)?)
        .bind(session.status.as_str())
        .bind(revision_column(session.revision)?)
        .bind(session.updated_at)
        .bind(&session.id)
        .bind(revision_column(expected_revision)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM workflow_sessions WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<WorkflowSession>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, workflow_type, current_step, context, status, revision,
                   created_at, updated_at
            FROM workflow_sessions
            ORDER BY created_at ASC, session_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }
}
