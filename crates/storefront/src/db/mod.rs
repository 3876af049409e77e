//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `diwan_storefront`
//!
//! The product catalog lives in memory; the database holds only what
//! visitors leave behind:
//!
//! ## Tables
//!
//! - `contact_messages` - Contact form submissions
//! - `tower_sessions.session` - Tower-sessions storage (cart, wishlist,
//!   language, theme per visitor)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p diwan-cli -- migrate
//! ```

pub mod contact_messages;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contact_messages::{
    ContactMessageId, ContactRecords, MemoryContactRecords, NewContactMessage, PgContactRecords,
};

/// Errors raised by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The record store refused or could not take the write.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
