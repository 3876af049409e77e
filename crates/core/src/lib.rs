//! Diwan Core - Shared domain types.
//!
//! This crate provides the types shared by every Diwan component:
//! - `storefront` - Public-facing bilingual furniture store (JSON API)
//! - `cli` - Command-line tools for migrations and offline catalog queries
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product catalog entries, prices, locale selections, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
