//! Catalog identifiers.
//!
//! Products are keyed by opaque strings assigned by the catalog source
//! (`"1"`, `"sofa-oak-3"`, ...). Wrapping them keeps cart and wishlist
//! lookups from accidentally comparing against arbitrary strings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a catalog product.
///
/// # Example
///
/// ```rust
/// use diwan_core::ProductId;
///
/// let id = ProductId::new("1");
/// assert_eq!(id.as_str(), "1");
/// assert_eq!(id, ProductId::from("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ProductId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let back: ProductId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_compares_with_str() {
        assert!(ProductId::new("7") == *"7");
        assert!(ProductId::new("7") != *"8");
    }
}
