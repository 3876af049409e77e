//! Offline catalog queries.
//!
//! Runs the storefront's filter engine over a catalog file with the same
//! query parameters the `/api/products` route accepts, and prints one JSON
//! product per line.

use std::io::Write;
use std::path::Path;

use diwan_core::Language;
use diwan_storefront::catalog::{Catalog, CatalogError, CatalogQuery};

/// Errors raised by the catalog command.
#[derive(Debug, thiserror::Error)]
pub enum CatalogCommandError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filter `file` (or the bundled sample) with `query` and write JSON lines.
///
/// # Errors
///
/// Returns `CatalogCommandError` if the catalog cannot be loaded or the
/// output cannot be written.
pub fn run(
    file: Option<&Path>,
    language: Language,
    query: &str,
    out: &mut impl Write,
) -> Result<usize, CatalogCommandError> {
    let catalog = match file {
        Some(path) => Catalog::load(path)?,
        None => Catalog::sample()?,
    };

    let criteria = CatalogQuery::parse(query).into_criteria();
    let products = catalog.search(&criteria, language);

    for product in &products {
        serde_json::to_writer(&mut *out, product)?;
        writeln!(out)?;
    }

    tracing::info!(
        matched = products.len(),
        total = catalog.len(),
        query = %CatalogQuery::from_criteria(&criteria).to_query_string(),
        "Catalog query complete"
    );
    Ok(products.len())
}
