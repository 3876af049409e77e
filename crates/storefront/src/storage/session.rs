//! Session-backed visitor storage.
//!
//! Each visitor's tower-sessions record plays the role browser local storage
//! plays in a single-page app: a durable, per-visitor key-value map. Handlers
//! extract a [`SessionStorage`] snapshot, let a store mutate it
//! synchronously, then [`flush`](SessionStorage::flush) the written keys.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;

use super::{KeyValueStorage, MemoryStorage, StorageError, keys};

/// Snapshot of the visitor's stored keys, written back on [`flush`](Self::flush).
pub struct SessionStorage {
    session: Session,
    snapshot: MemoryStorage,
}

impl SessionStorage {
    /// Read every storage key from the session.
    ///
    /// Unreadable entries are skipped, so a corrupt session behaves like an
    /// empty one.
    pub async fn load(session: Session) -> Self {
        let mut snapshot = MemoryStorage::new();
        for key in keys::ALL {
            match session.get::<String>(key).await {
                Ok(Some(value)) => snapshot = snapshot.with_entry(key, value),
                Ok(None) => {}
                Err(e) => tracing::warn!(key, error = %e, "Ignoring unreadable session entry"),
            }
        }
        Self { session, snapshot }
    }

    /// Persist every key written since the snapshot was taken.
    ///
    /// Write failures are logged and dropped; the response still reflects
    /// the in-memory state.
    pub async fn flush(mut self) {
        for (key, value) in self.snapshot.take_dirty() {
            if let Err(e) = self.session.insert(&key, value).await {
                tracing::warn!(key = %key, error = %e, "Failed to persist session entry");
            }
        }
    }
}

impl KeyValueStorage for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.snapshot.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.snapshot.set(key, value)
    }
}

impl<S> FromRequestParts<S> for SessionStorage
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::load(session).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use diwan_core::Theme;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::stores::PreferenceStore;

    #[tokio::test]
    async fn test_flush_persists_written_keys() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let mut storage = SessionStorage::load(session.clone()).await;
        {
            let mut preferences = PreferenceStore::initialize(&mut storage, Theme::Light);
            preferences.toggle_theme();
        }
        storage.flush().await;

        assert_eq!(
            session.get::<String>(keys::THEME).await.unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(session.get::<String>(keys::LANGUAGE).await.unwrap(), None);

        let restored = SessionStorage::load(session).await;
        assert_eq!(restored.get(keys::THEME).as_deref(), Some("dark"));
    }
}
