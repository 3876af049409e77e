//! Product route handlers.
//!
//! Listings are filtered in the visitor's active language, so category
//! labels in the query must match that language.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
};
use diwan_core::{Language, Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::CatalogQuery;
use crate::error::{AppError, Result};
use crate::routes::preferences::active_language;
use crate::state::AppState;
use crate::storage::session::SessionStorage;
use crate::stores::ShopStore;

/// Products shown per home page rail.
const HOME_RAIL_SIZE: usize = 3;

/// Related products shown on a detail page.
const RELATED_LIMIT: usize = 4;

/// Filtered product listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub language: Language,
    /// Canonical query string for the applied criteria (shareable URL).
    pub query: String,
    pub total: usize,
    pub products: Vec<Product>,
}

/// Category labels for the filter sidebar.
#[derive(Debug, Serialize)]
pub struct CategoriesView {
    pub language: Language,
    pub categories: Vec<String>,
}

/// Home page rails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub featured: Vec<Product>,
    pub new_arrivals: Vec<Product>,
}

/// Product detail page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub product: Product,
    pub related: Vec<Product>,
    pub in_wishlist: bool,
}

fn owned(products: Vec<&Product>) -> Vec<Product> {
    products.into_iter().cloned().collect()
}

/// Product listing with search, filters, and sort from the query string.
#[instrument(skip(state, storage, headers))]
pub async fn index(
    State(state): State<AppState>,
    mut storage: SessionStorage,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Json<ProductListView> {
    let language = active_language(&mut storage, &headers);
    let criteria = CatalogQuery::parse(raw.as_deref().unwrap_or_default()).into_criteria();
    let products = owned(state.catalog().search(&criteria, language));

    Json(ProductListView {
        language,
        query: CatalogQuery::from_criteria(&criteria).to_query_string(),
        total: products.len(),
        products,
    })
}

/// Unique category labels in the active language.
#[instrument(skip(state, storage, headers))]
pub async fn categories(
    State(state): State<AppState>,
    mut storage: SessionStorage,
    headers: HeaderMap,
) -> Json<CategoriesView> {
    let language = active_language(&mut storage, &headers);
    let categories = state
        .catalog()
        .categories(language)
        .into_iter()
        .map(str::to_owned)
        .collect();

    Json(CategoriesView {
        language,
        categories,
    })
}

/// Featured products and new arrivals.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Json<HomeView> {
    let catalog = state.catalog();
    Json(HomeView {
        featured: owned(catalog.featured(HOME_RAIL_SIZE)),
        new_arrivals: owned(catalog.new_arrivals(HOME_RAIL_SIZE)),
    })
}

/// Product detail with related products.
#[instrument(skip(state, storage), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    mut storage: SessionStorage,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let catalog = state.catalog();
    let product = catalog
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let in_wishlist = ShopStore::restore(&mut storage).is_in_wishlist(&id);

    Ok(Json(ProductView {
        product: product.clone(),
        related: owned(catalog.related(product, RELATED_LIMIT)),
        in_wishlist,
    }))
}
