//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Each mutating handler restores
//! the [`ShopStore`], applies one operation, and flushes the written keys
//! before responding.

use axum::{Json, extract::State};
use diwan_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::storage::KeyValueStorage;
use crate::storage::session::SessionStorage;
use crate::stores::{CartEntry, ShopStore};

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub total: Price,
    pub items_count: u32,
}

impl<S: KeyValueStorage> From<&ShopStore<S>> for CartView {
    fn from(store: &ShopStore<S>) -> Self {
        Self {
            entries: store.cart().to_vec(),
            total: store.cart_total(),
            items_count: store.cart_items_count(),
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    /// Units to add (default 1).
    pub quantity: Option<u32>,
}

/// Update quantity request. Zero or less removes the entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Request naming one product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Display the cart.
#[instrument(skip(storage))]
pub async fn show(mut storage: SessionStorage) -> Json<CartView> {
    Json(CartView::from(&ShopStore::restore(&mut storage)))
}

/// Add a catalog product to the cart.
///
/// Returns 404 when the product is not in the catalog.
#[instrument(skip(state, storage), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    mut storage: SessionStorage,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .find(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;
    let quantity = request.quantity.unwrap_or(1);

    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.add_to_cart_quantity(product, quantity);
        CartView::from(&shop)
    };
    storage.flush().await;

    let units = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", request.product_id.as_str()),
            ("quantity", units.as_str()),
        ]),
    );
    tracing::info!(quantity, items = view.items_count, "Added to cart");

    Ok(Json(view))
}

/// Set the quantity of a cart entry.
///
/// Returns 400 when the quantity does not fit a cart line.
#[instrument(skip(storage), fields(product_id = %request.product_id))]
pub async fn update(
    mut storage: SessionStorage,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    if request.quantity > i64::from(u32::MAX) {
        return Err(AppError::BadRequest(format!(
            "quantity {} exceeds {}",
            request.quantity,
            u32::MAX
        )));
    }

    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.update_quantity(&request.product_id, request.quantity);
        CartView::from(&shop)
    };
    storage.flush().await;
    Ok(Json(view))
}

/// Remove a cart entry.
#[instrument(skip(storage), fields(product_id = %request.product_id))]
pub async fn remove(
    mut storage: SessionStorage,
    Json(request): Json<ProductRequest>,
) -> Json<CartView> {
    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.remove_from_cart(&request.product_id);
        CartView::from(&shop)
    };
    storage.flush().await;
    Json(view)
}

/// Empty the cart.
#[instrument(skip(storage))]
pub async fn clear(mut storage: SessionStorage) -> Json<CartView> {
    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.clear_cart();
        CartView::from(&shop)
    };
    storage.flush().await;
    Json(view)
}
