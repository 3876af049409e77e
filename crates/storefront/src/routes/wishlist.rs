//! Wishlist route handlers.

use axum::{Json, extract::State};
use diwan_core::Product;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::cart::{CartView, ProductRequest};
use crate::state::AppState;
use crate::storage::KeyValueStorage;
use crate::storage::session::SessionStorage;
use crate::stores::ShopStore;

/// Wishlist display data.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistView {
    pub products: Vec<Product>,
    pub count: usize,
}

impl<S: KeyValueStorage> From<&ShopStore<S>> for WishlistView {
    fn from(store: &ShopStore<S>) -> Self {
        Self {
            products: store.wishlist().to_vec(),
            count: store.wishlist().len(),
        }
    }
}

/// Result of moving a wishlisted product into the cart.
#[derive(Debug, Serialize)]
pub struct MoveToCartView {
    /// `false` when the product was not on the wishlist.
    pub moved: bool,
    pub cart: CartView,
    pub wishlist: WishlistView,
}

/// Display the wishlist.
#[instrument(skip(storage))]
pub async fn show(mut storage: SessionStorage) -> Json<WishlistView> {
    Json(WishlistView::from(&ShopStore::restore(&mut storage)))
}

/// Add a catalog product to the wishlist (idempotent).
#[instrument(skip(state, storage), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    mut storage: SessionStorage,
    Json(request): Json<ProductRequest>,
) -> Result<Json<WishlistView>> {
    let product = state
        .catalog()
        .find(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.add_to_wishlist(product);
        WishlistView::from(&shop)
    };
    storage.flush().await;
    Ok(Json(view))
}

/// Remove a product from the wishlist.
#[instrument(skip(storage), fields(product_id = %request.product_id))]
pub async fn remove(
    mut storage: SessionStorage,
    Json(request): Json<ProductRequest>,
) -> Json<WishlistView> {
    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        shop.remove_from_wishlist(&request.product_id);
        WishlistView::from(&shop)
    };
    storage.flush().await;
    Json(view)
}

/// Add one unit of a wishlisted product to the cart, keeping it wishlisted.
#[instrument(skip(storage), fields(product_id = %request.product_id))]
pub async fn move_to_cart(
    mut storage: SessionStorage,
    Json(request): Json<ProductRequest>,
) -> Json<MoveToCartView> {
    let view = {
        let mut shop = ShopStore::restore(&mut storage);
        let moved = shop.move_to_cart(&request.product_id);
        MoveToCartView {
            moved,
            cart: CartView::from(&shop),
            wishlist: WishlistView::from(&shop),
        }
    };
    storage.flush().await;
    Json(view)
}
