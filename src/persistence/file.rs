use async_trait::async_trait;
use fd_lock::RwLock;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{SessionStore, StoreError, WorkflowSession};

const SESSION_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

/// One JSON document per session under a directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers see either the old or the new record. Every write holds
/// an advisory lock on `<session>.lock`, which serialises writers across
/// processes sharing the directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    directory: PathBuf,
}

impl FileSessionStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{SESSION_EXTENSION}", file_stem(session_id)))
    }

    fn lock_path(&self, session_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{LOCK_EXTENSION}", file_stem(session_id)))
    }

    /// Run `work` on a blocking thread while holding the session's write lock.
    async fn locked<T, F>(&self, session: &WorkflowSession, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTarget) -> Result<T, StoreError> + Send + 'static,
    {
        let target = WriteTarget {
            directory: self.directory.clone(),
            path: self.session_path(&session.id),
            session_id: session.id.clone(),
            contents: serde_json::to_vec_pretty(session)?,
        };
        let lock_path = self.lock_path(&session.id);

        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&target.directory)?;
            let lock_file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            let mut lock = RwLock::new(lock_file);
            let guard = lock.write()?;
            let result = work(&target);
            drop(guard);
            result
        })
        .await
        .map_err(|err| StoreError::Backend(format!("session write task failed: {err}")))?
    }
}

/// Everything a locked write needs, owned so it can cross into a blocking task
struct WriteTarget {
    directory: PathBuf,
    path: PathBuf,
    session_id: String,
    contents: Vec<u8>,
}

impl WriteTarget {
    fn current(&self) -> Result<Option<WorkflowSession>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(raw) => decode(&self.path, &raw, &self.session_id).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self) -> Result<(), StoreError> {
        let tmp_path = self
            .directory
            .join(format!(".{}.tmp", Uuid::new_v4().simple()));

        let written = std::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&self.contents)?;
                file.sync_all()
            });
        if let Err(err) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        if let Err(err) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        sync_dir(&self.directory)?;
        debug!(session_id = %self.session_id, path = %self.path.display(), "Persisted session");
        Ok(())
    }
}

fn decode(path: &Path, raw: &[u8], session_id: &str) -> Result<WorkflowSession, StoreError> {
    let session: WorkflowSession = serde_json::from_slice(raw)?;
    if session.id != session_id {
        return Err(StoreError::Corrupt(format!(
            "{} holds session {}",
            path.display(),
            session.id
        )));
    }
    Ok(session)
}

/// Map a session id onto a safe file stem.
///
/// Alphanumerics, `-` and `_` pass through; every other byte becomes `%XX`,
/// which keeps distinct ids distinct.
fn file_stem(session_id: &str) -> String {
    let mut stem = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<WorkflowSession>, StoreError> {
        let path = self.session_path(session_id);
        match fs::read(&path).await {
            Ok(raw) => decode(&path, &raw, session_id).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn upsert(&self, session: &WorkflowSession) -> Result<(), StoreError> {
        self.locked(session, |target| target.write()).await
    }

    async fn create(&self, session: &WorkflowSession) -> Result<bool, StoreError> {
        self.locked(session, |target| {
            if target.current()?.is_some() {
                return Ok(false);
            }
            target.write()?;
            Ok(true)
        })
        .await
    }

    async fn compare_and_swap(
        &self,
        session: &WorkflowSession,
        expected_revision: u64,
    ) -> Result<bool, StoreError> {
        self.locked(session, move |target| match target.current()? {
            Some(stored) if stored.revision == expected_revision => {
                target.write()?;
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        let removed = match fs::remove_file(self.session_path(session_id)).await {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = fs::remove_file(self.lock_path(session_id)).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<WorkflowSession>, StoreError> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SESSION_EXTENSION) {
                continue;
            }
            let raw = fs::read(&path).await?;
            match serde_json::from_slice::<WorkflowSession>(&raw) {
                Ok(session) => sessions.push(session),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable session file")
                }
            }
        }
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SessionStatus;
    use crate::workflows::{StepId, WorkflowType};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn file_stems_are_safe_and_distinct() {
        assert_eq!(file_stem("abc-123_x"), "abc-123_x");
        assert_eq!(file_stem("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_ne!(file_stem("a/b"), file_stem("a_b"));
    }

    #[tokio::test]
    async fn persists_and_reloads_full_record() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        let session = WorkflowSession::new("lead/42", WorkflowType::Selling);
        let context = session
            .context
            .merge(json!({"intent": "selling"}).as_object().unwrap());
        let moved = session.advanced(StepId::HasBuyer, context, SessionStatus::InProgress);
        store.upsert(&moved).await.unwrap();

        let loaded = store.get("lead/42").await.unwrap().unwrap();
        assert_eq!(loaded, moved);
        assert!(dir.path().join("lead%2F42.json").exists());
    }

    #[tokio::test]
    async fn missing_directory_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("not-yet"));
        assert!(store.get("nobody").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.delete("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        for id in ["a", "b", "c"] {
            store
                .upsert(&WorkflowSession::new(id, WorkflowType::Buying))
                .await
                .unwrap();
        }
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(names.iter().all(|name| !name.ends_with(".tmp")));
        assert_eq!(names.iter().filter(|name| name.ends_with(".json")).count(), 3);
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn swap_is_refused_once_another_writer_moved_the_record() {
        let dir = TempDir::new().unwrap();
        let mine = FileSessionStore::new(dir.path());
        let theirs = FileSessionStore::new(dir.path());

        let session = WorkflowSession::new("shared", WorkflowType::Selling);
        assert!(mine.create(&session).await.unwrap());
        assert!(!theirs.create(&session).await.unwrap());

        let buying = session.advanced(
            StepId::VehicleKnowledge,
            session.context.clone(),
            SessionStatus::InProgress,
        );
        let selling =
            session.advanced(StepId::HasBuyer, session.context.clone(), SessionStatus::InProgress);
        assert!(theirs.compare_and_swap(&selling, 0).await.unwrap());
        assert!(!mine.compare_and_swap(&buying, 0).await.unwrap());

        let stored = mine.get("shared").await.unwrap().unwrap();
        assert_eq!(stored.current_step, StepId::HasBuyer);
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn delete_removes_the_lock_file_too() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        store
            .upsert(&WorkflowSession::new("bye", WorkflowType::Buying))
            .await
            .unwrap();
        assert!(dir.path().join("bye.lock").exists());

        assert!(store.delete("bye").await.unwrap());
        assert!(!dir.path().join("bye.lock").exists());
        assert!(store.get("bye").await.unwrap().is_none());
    }
}
