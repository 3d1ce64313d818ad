//! In-memory session store for the HTTP surface.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::ChatSession;
use crate::models::GenerationSettings;

/// Shared handle to one session. The lock serializes submissions.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// Live sessions keyed by id. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session under a fresh id.
    pub fn create(&self, settings: GenerationSettings) -> (String, SessionHandle) {
        let id = format!("session_{}", ulid::Ulid::new());
        let handle = self.initialize(&id, settings);
        (id, handle)
    }

    /// Return the session for `id`, creating it with a greeting if absent.
    ///
    /// Never replaces an existing session.
    pub fn initialize(&self, id: &str, settings: GenerationSettings) -> SessionHandle {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(session_id = %id, model = settings.model.label, "Session created");
                Arc::new(Mutex::new(ChatSession::new(id, settings)))
            })
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
