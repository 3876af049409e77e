//! Contact message records.
//!
//! The contact form is the only write the storefront makes to the database.
//! Handlers reach the store through the [`ContactRecords`] trait so tests can
//! swap in [`MemoryContactRecords`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diwan_core::Email;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// Identifier assigned to a stored contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContactMessageId(Uuid);

impl ContactMessageId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ContactMessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated contact message ready to be stored.
///
/// Status defaults to `new` and the timestamp is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

/// Insert-only record store for contact messages.
#[async_trait]
pub trait ContactRecords: Send + Sync {
    /// Store one message and return its id.
    async fn insert(&self, message: NewContactMessage) -> Result<ContactMessageId, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed contact records.
#[derive(Clone)]
pub struct PgContactRecords {
    pool: PgPool,
}

impl PgContactRecords {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRecords for PgContactRecords {
    async fn insert(&self, message: NewContactMessage) -> Result<ContactMessageId, RepositoryError> {
        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO storefront.contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = %id, created_at = %created_at, "Stored contact message");
        Ok(ContactMessageId::new(id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory contact records for tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryContactRecords {
    messages: Mutex<Vec<(ContactMessageId, NewContactMessage)>>,
    failing: AtomicBool,
}

impl MemoryContactRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts and pings fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copies of every stored message, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<NewContactMessage> {
        self.messages
            .lock()
            .map(|messages| messages.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "record store is offline".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactRecords for MemoryContactRecords {
    async fn insert(&self, message: NewContactMessage) -> Result<ContactMessageId, RepositoryError> {
        self.check_available()?;
        let id = ContactMessageId::new(Uuid::new_v4());
        self.messages
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_owned()))?
            .push((id, message));
        Ok(id)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message() -> NewContactMessage {
        NewContactMessage {
            name: "Layla".to_owned(),
            email: Email::parse("layla@example.com").unwrap(),
            subject: "Delivery time".to_owned(),
            message: "How long does delivery to Amman take?".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_memory_records_store_messages() {
        let records = MemoryContactRecords::new();
        let first = records.insert(message()).await.unwrap();
        let second = records.insert(message()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(records.messages().len(), 2);
        assert!(records.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_records_failure_toggle() {
        let records = MemoryContactRecords::new();
        records.set_failing(true);

        assert!(matches!(
            records.insert(message()).await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(records.ping().await.is_err());
        assert!(records.messages().is_empty());

        records.set_failing(false);
        assert!(records.insert(message()).await.is_ok());
    }
}
