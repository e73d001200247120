use crate::domain::ports::SessionStore;
use crate::domain::session::{SavedSession, SessionId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for saved sessions.
///
/// Uses `Arc<RwLock<HashMap<SessionId, SavedSession>>>` so clones share the same map,
/// which lets a recreated controller find what the previous one saved.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SavedSession>>>,
}

impl InMemorySessionStore {
    /// Creates a new, empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, id: &SessionId, session: &SavedSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SavedSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn remove(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }
}
