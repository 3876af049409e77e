//! Product catalog held in memory.
//!
//! The catalog is loaded once at startup, either from a JSON file named by
//! `DIWAN_CATALOG_PATH` or from the bundled sample catalog, and is never
//! mutated afterwards. Listing views go through [`filter::apply`], driven by
//! criteria hydrated from URL query parameters in [`query`].

pub mod filter;
pub mod query;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use diwan_core::{Language, Product, ProductId};
use thiserror::Error;

pub use filter::{FilterCriteria, PriceRange, SortKey};
pub use query::CatalogQuery;

/// Bundled sample catalog (six products).
const SAMPLE_CATALOG: &str = include_str!("../../content/products.json");

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),
}

/// Immutable, cheaply cloneable product list.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Build a catalog from products, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            products: products.into(),
        })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or ids repeat.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = ?path, products = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// The bundled sample catalog.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled file is corrupt.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json(SAMPLE_CATALOG)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == *id)
    }

    /// Unique category labels in the given language, in first-seen order.
    #[must_use]
    pub fn categories(&self, language: Language) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|product| product.category_label(language))
            .filter(|label| seen.insert(*label))
            .collect()
    }

    /// The first `limit` featured products (home page rail).
    #[must_use]
    pub fn featured(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.featured)
            .take(limit)
            .collect()
    }

    /// The first `limit` new arrivals (home page rail).
    #[must_use]
    pub fn new_arrivals(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.is_new)
            .take(limit)
            .collect()
    }

    /// Up to `limit` other products in the same category.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|other| other.id != product.id && other.category.en == product.category.en)
            .take(limit)
            .collect()
    }

    /// Filter and sort the catalog.
    #[must_use]
    pub fn search(&self, criteria: &FilterCriteria, language: Language) -> Vec<&Product> {
        filter::apply(&self.products, criteria, language)
    }
}
