//! Session-scoped state: create on session start, destroy on session end.
//!
//! Each session owns an independent regimen, transcript, and view state —
//! nothing is shared across sessions. One interaction at a time per
//! session: handlers hold the session's state lock for the whole user
//! action, LLM call included, so a second request on the same session
//! waits for the first to finish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::{Regimen, Transcript};
use crate::view::SessionView;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error("session table lock poisoned")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// SessionContext
// ═══════════════════════════════════════════════════════════

/// The mutable heart of one session, behind the session lock.
pub struct SessionState {
    pub regimen: Regimen,
    pub transcript: Transcript,
    pub view: SessionView,
}

impl SessionState {
    fn new() -> Self {
        let regimen = Regimen::default();
        let view = SessionView::new(&regimen);
        Self {
            regimen,
            transcript: Transcript::new(),
            view,
        }
    }
}

/// One user session. Created empty, never persisted, destroyed on
/// session end or idle sweep.
pub struct SessionContext {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Serializes interactions. A tokio mutex so the guard may be held
    /// across the blocking LLM call without stalling the runtime.
    pub state: tokio::sync::Mutex<SessionState>,
    last_activity: Mutex<Instant>,
}

impl SessionContext {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: tokio::sync::Mutex::new(SessionState::new()),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// Update the last activity timestamp.
    pub fn update_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    /// Seconds since the last interaction.
    pub fn idle_secs(&self) -> u64 {
        self.last_activity
            .lock()
            .map(|last| last.elapsed().as_secs())
            .unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════
// SessionRegistry
// ═══════════════════════════════════════════════════════════

/// All live sessions, keyed by id. Lookups touch the session's activity
/// timestamp; the sweeper destroys sessions idle past the window.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<SessionContext>>>,
    idle_timeout_secs: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_idle_timeout(config::SESSION_IDLE_SECS)
    }

    pub fn with_idle_timeout(idle_timeout_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout_secs,
        }
    }

    /// Create a fresh, empty session.
    pub fn create(&self) -> Result<Arc<SessionContext>, SessionError> {
        let context = Arc::new(SessionContext::new());
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        sessions.insert(context.id, Arc::clone(&context));
        tracing::info!(session_id = %context.id, "session created");
        Ok(context)
    }

    /// Look up a live session and mark it active.
    pub fn get(&self, id: &Uuid) -> Result<Arc<SessionContext>, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::LockPoisoned)?;
        let context = sessions
            .get(id)
            .cloned()
            .ok_or(SessionError::NotFound(*id))?;
        context.update_activity();
        Ok(context)
    }

    /// Destroy a session. Its regimen and transcript go with it.
    pub fn remove(&self, id: &Uuid) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        sessions
            .remove(id)
            .map(|_| tracing::info!(session_id = %id, "session destroyed"))
            .ok_or(SessionError::NotFound(*id))
    }

    /// Destroy every session idle past the window. Returns how many.
    pub fn sweep_idle(&self) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let timeout = self.idle_timeout_secs;
        let before = sessions.len();
        sessions.retain(|id, context| {
            let keep = context.idle_secs() <= timeout;
            if !keep {
                tracing::info!(session_id = %id, "idle session swept");
            }
            keep
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
