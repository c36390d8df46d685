//! Demo session metadata: one JSON file per session.

use chrono::{DateTime, Utc};
use meetpilot_core::{Error, Paths, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl DemoSession {
    fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ended_at: None,
            is_active: true,
        }
    }
}

pub struct SessionStore {
    paths: Paths,
}

impl SessionStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Create and persist a new active session.
    pub fn create(&self) -> Result<DemoSession> {
        let session = DemoSession::new();
        self.write(&session)?;
        info!(session_id = %session.session_id, "Created new session");
        Ok(session)
    }

    pub fn get(&self, session_id: &str) -> Result<Option<DemoSession>> {
        let path = self.paths.session_meta_file(session_id);
        if !path.exists() {
            debug!(session_id = %session_id, "Session not found");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let session: DemoSession = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    /// End a session. Returns false when the session does not exist or has
    /// already ended.
    pub fn end(&self, session_id: &str) -> Result<bool> {
        let Some(mut session) = self.get(session_id)? else {
            warn!(session_id = %session_id, "Cannot end unknown session");
            return Ok(false);
        };
        if !session.is_active {
            return Ok(false);
        }
        session.is_active = false;
        session.ended_at = Some(Utc::now());
        self.write(&session)?;
        info!(session_id = %session_id, "Ended session");
        Ok(true)
    }

    pub fn list(&self) -> Result<Vec<DemoSession>> {
        let dir = self.paths.sessions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<DemoSession>(&content) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unreadable session file");
                }
            }
        }
        sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(sessions)
    }

    fn write(&self, session: &DemoSession) -> Result<()> {
        let path = self.paths.session_meta_file(&session.session_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| Error::Storage(format!("Failed to serialize session: {}", e)))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
