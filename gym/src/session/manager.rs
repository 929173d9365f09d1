//! Supervised training sessions

use crate::session::TrainingJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// Unique session identifier
pub type SessionId = Uuid;

/// Default upper bound on a session's run time
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Finished sessions kept for status queries before the oldest are dropped
pub const DEFAULT_FINISHED_RETENTION: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        *self != SessionStatus::Running
    }
}

/// Metadata for a running or finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub kind: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

struct SessionHandle {
    info: SessionInfo,
    /// Present while running; sending `true` cancels the session
    cancel: Option<watch::Sender<bool>>,
    status: watch::Receiver<SessionStatus>,
}

/// Registry of training sessions
///
/// Each session runs its job on its own tokio task under a timeout. Clones
/// share the same registry. Running sessions are always kept; at most
/// `retention` finished ones are, newest first.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    timeout: Duration,
    retention: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl SessionManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout,
            retention: DEFAULT_FINISHED_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Spawn a job and return its session id
    pub async fn start(&self, job: Box<dyn TrainingJob>) -> SessionId {
        let id = Uuid::new_v4();
        let kind = job.kind().to_string();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(SessionStatus::Running);

        let info = SessionInfo {
            id,
            kind: kind.clone(),
            status: SessionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        };
        {
            let mut sessions = self.sessions.write().await;
            trim_finished(&mut sessions, self.retention);
            sessions.insert(
                id,
                SessionHandle {
                    info,
                    cancel: Some(cancel_tx),
                    status: status_rx,
                },
            );
        }
        info!("Session {} started ({})", id, kind);

        let sessions = Arc::clone(&self.sessions);
        let timeout = self.timeout;
        tokio::spawn(async move {
            let (status, error) = tokio::select! {
                outcome = tokio::time::timeout(timeout, job.run()) => match outcome {
                    Ok(Ok(())) => (SessionStatus::Completed, None),
                    Ok(Err(e)) => (SessionStatus::Failed, Some(format!("{:#}", e))),
                    Err(_) => (
                        SessionStatus::TimedOut,
                        Some(format!("timed out after {}s", timeout.as_secs_f64())),
                    ),
                },
                _ = cancelled(cancel_rx) => (SessionStatus::Cancelled, None),
            };

            match status {
                SessionStatus::Completed => info!("Session {} completed", id),
                SessionStatus::Cancelled => info!("Session {} cancelled", id),
                _ => warn!("Session {} {:?}: {}", id, status, error.as_deref().unwrap_or("")),
            }

            if let Some(handle) = sessions.write().await.get_mut(&id) {
                handle.info.status = status;
                handle.info.finished_at = Some(Utc::now());
                handle.info.error = error;
                handle.cancel = None;
            }
            let _ = status_tx.send(status);
        });

        id
    }

    /// Request termination; false if the session is unknown or already finished
    pub async fn stop(&self, id: SessionId) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(&id).and_then(|h| h.cancel.as_ref()) {
            Some(cancel) => {
                info!("Stopping session {}", id);
                cancel.send(true).is_ok()
            }
            None => false,
        }
    }

    pub async fn status(&self, id: SessionId) -> Option<SessionInfo> {
        self.sessions.read().await.get(&id).map(|h| h.info.clone())
    }

    /// All sessions, oldest first
    pub async fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .sessions
            .read()
            .await
            .values()
            .map(|h| h.info.clone())
            .collect();
        infos.sort_by_key(|i| i.started_at);
        infos
    }

    pub async fn running(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|h| h.info.status == SessionStatus::Running)
            .count()
    }

    /// Drop every finished session; returns how many were removed
    pub async fn prune_finished(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, h| !h.info.status.is_finished());
        before - sessions.len()
    }

    /// Wait until the session finishes and return its final info
    pub async fn wait(&self, id: SessionId) -> Option<SessionInfo> {
        let mut status = self.sessions.read().await.get(&id)?.status.clone();
        loop {
            if status.borrow_and_update().is_finished() {
                break;
            }
            if status.changed().await.is_err() {
                break;
            }
        }
        self.status(id).await
    }
}

/// Keep only the `keep` most recently finished sessions
fn trim_finished(sessions: &mut HashMap<SessionId, SessionHandle>, keep: usize) {
    let mut finished: Vec<(DateTime<Utc>, SessionId)> = sessions
        .values()
        .filter(|h| h.info.status.is_finished())
        .map(|h| (h.info.finished_at.unwrap_or(h.info.started_at), h.info.id))
        .collect();
    if finished.len() <= keep {
        return;
    }
    finished.sort();
    let excess = finished.len() - keep;
    for (_, id) in &finished[..excess] {
        sessions.remove(id);
    }
}

/// Resolves once `true` is sent; never resolves if the sender goes away
async fn cancelled(mut rx: watch::Receiver<bool>) {
    while rx.changed().await.is_ok() {
        if *rx.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await
}
