//! Business logic services for storefront.
//!
//! # Services
//!
//! - `contact` - Contact form validation and submission

pub mod contact;

pub use contact::{ContactError, ContactForm, ContactService, ValidationErrors};
