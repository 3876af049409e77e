//! Core types for Diwan.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::ProductId;
pub use locale::{Language, Localized, TextDirection, Theme, UnknownVariant};
pub use price::{Price, PriceError};
pub use product::{Dimensions, Product};
