//! Visitor state stores.
//!
//! Stores are plain values constructed from an injected
//! [`KeyValueStorage`](crate::storage::KeyValueStorage). Every mutator runs
//! synchronously to completion, recomputes derived values, and persists the
//! affected collection before returning.
//!
//! - [`PreferenceStore`] - language and theme
//! - [`ShopStore`] - cart and wishlist

pub mod preferences;
pub mod shop;

pub use preferences::{PreferenceStore, Preferences};
pub use shop::{CartEntry, ShopStore};
