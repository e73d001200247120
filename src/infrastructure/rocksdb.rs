use crate::domain::ports::SessionStore;
use crate::domain::session::{SavedSession, SessionId};
use crate::error::{FlowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing saved sessions.
pub const CF_SESSIONS: &str = "sessions";

/// A persistent session store implementation using RocksDB.
///
/// Sessions are stored as JSON under their id in a dedicated Column Family.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbSessionStore {
    db: Arc<DB>,
}

impl RocksDbSessionStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "sessions" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_sessions = ColumnFamilyDescriptor::new(CF_SESSIONS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_sessions])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> FlowError {
        FlowError::InternalError(Box::new(std::io::Error::other(
            "Sessions column family not found",
        )))
    }
}

#[async_trait]
impl SessionStore for RocksDbSessionStore {
    async fn save(&self, id: &SessionId, session: &SavedSession) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_SESSIONS)
            .ok_or_else(Self::missing_cf)?;

        let value = serde_json::to_vec(session)?;
        self.db.put_cf(&cf, id.as_str().as_bytes(), value)?;

        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SavedSession>> {
        let cf = self
            .db
            .cf_handle(CF_SESSIONS)
            .ok_or_else(Self::missing_cf)?;

        match self.db.get_cf(&cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &SessionId) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_SESSIONS)
            .ok_or_else(Self::missing_cf)?;

        self.db.delete_cf(&cf, id.as_str().as_bytes())?;
        Ok(())
    }
}
