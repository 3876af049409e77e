//! Cart and wishlist store.
//!
//! The store is the single source of truth for a visitor's cart and
//! wishlist. Cart totals are recomputed from the full entry list after every
//! cart mutation instead of being patched incrementally.

use diwan_core::{Price, Product, ProductId};
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStorage, keys, load_json, save_json};

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: Product,
    /// Always at least 1 while the entry exists.
    pub quantity: u32,
}

impl CartEntry {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Holds and persists the cart and wishlist.
pub struct ShopStore<S> {
    storage: S,
    cart: Vec<CartEntry>,
    wishlist: Vec<Product>,
    cart_total: Price,
    cart_items_count: u32,
}

impl<S: KeyValueStorage> ShopStore<S> {
    /// Restore the cart and wishlist from storage.
    ///
    /// Absent or malformed data yields an empty collection. Restored data is
    /// normalized: zero-quantity entries are dropped and duplicate products
    /// are merged, so the store invariants hold even for hand-edited storage.
    pub fn restore(storage: S) -> Self {
        let cart = load_json::<Vec<CartEntry>>(&storage, keys::CART)
            .map(normalize_cart)
            .unwrap_or_default();
        let wishlist = load_json::<Vec<Product>>(&storage, keys::WISHLIST)
            .map(normalize_wishlist)
            .unwrap_or_default();

        let mut store = Self {
            storage,
            cart,
            wishlist,
            cart_total: Price::ZERO,
            cart_items_count: 0,
        };
        store.recompute_totals();
        store
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Cart entries in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[CartEntry] {
        &self.cart
    }

    /// Sum of every line's price times quantity.
    #[must_use]
    pub const fn cart_total(&self) -> Price {
        self.cart_total
    }

    /// Sum of every line's quantity.
    #[must_use]
    pub const fn cart_items_count(&self) -> u32 {
        self.cart_items_count
    }

    /// Add one unit of `product`.
    ///
    /// An existing entry is incremented in place; a new product is appended.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.add_units(product, 1);
        self.commit_cart();
    }

    /// Add `quantity` units of `product` in one mutation.
    ///
    /// Equivalent to calling [`add_to_cart`](Self::add_to_cart) `quantity`
    /// times. Zero is a no-op.
    pub fn add_to_cart_quantity(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.add_units(product, quantity);
        self.commit_cart();
    }

    /// Remove the entry for `product_id`, if any.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        let before = self.cart.len();
        self.cart.retain(|entry| entry.product.id != *product_id);
        if self.cart.len() != before {
            self.commit_cart();
        }
    }

    /// Set the quantity of an existing entry.
    ///
    /// A quantity of zero or less removes the entry. Unknown products and
    /// quantities above `u32::MAX` are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return;
        }

        let Ok(quantity) = u32::try_from(quantity) else {
            tracing::warn!(%product_id, quantity, "Ignoring out-of-range cart quantity");
            return;
        };
        if let Some(entry) = self.entry_mut(product_id) {
            entry.quantity = quantity;
            self.commit_cart();
        }
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.commit_cart();
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Wishlist products in insertion order.
    #[must_use]
    pub fn wishlist(&self) -> &[Product] {
        &self.wishlist
    }

    /// Append `product` unless it is already wishlisted.
    pub fn add_to_wishlist(&mut self, product: &Product) {
        if self.is_in_wishlist(&product.id) {
            return;
        }
        self.wishlist.push(product.clone());
        self.commit_wishlist();
    }

    /// Remove `product_id` from the wishlist, if present.
    pub fn remove_from_wishlist(&mut self, product_id: &ProductId) {
        let before = self.wishlist.len();
        self.wishlist.retain(|product| product.id != *product_id);
        if self.wishlist.len() != before {
            self.commit_wishlist();
        }
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|product| product.id == *product_id)
    }

    /// Add one unit of a wishlisted product to the cart.
    ///
    /// The product stays on the wishlist. Returns `false` when the product
    /// is not wishlisted.
    pub fn move_to_cart(&mut self, product_id: &ProductId) -> bool {
        let Some(product) = self
            .wishlist
            .iter()
            .find(|product| product.id == *product_id)
            .cloned()
        else {
            return false;
        };
        self.add_to_cart(&product);
        true
    }

    /// Release the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn entry_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.cart
            .iter_mut()
            .find(|entry| entry.product.id == *product_id)
    }

    fn add_units(&mut self, product: &Product, quantity: u32) {
        if let Some(entry) = self.entry_mut(&product.id) {
            entry.quantity = entry.quantity.saturating_add(quantity);
        } else {
            self.cart.push(CartEntry {
                product: product.clone(),
                quantity,
            });
        }
    }

    fn recompute_totals(&mut self) {
        self.cart_total = self.cart.iter().map(CartEntry::line_total).sum();
        self.cart_items_count = self
            .cart
            .iter()
            .fold(0_u32, |count, entry| count.saturating_add(entry.quantity));
    }

    fn commit_cart(&mut self) {
        self.recompute_totals();
        save_json(&mut self.storage, keys::CART, &self.cart);
    }

    fn commit_wishlist(&mut self) {
        save_json(&mut self.storage, keys::WISHLIST, &self.wishlist);
    }
}

/// Drop empty lines and merge duplicate products, keeping first-seen order.
fn normalize_cart(entries: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut cart: Vec<CartEntry> = Vec::with_capacity(entries.len());
    for entry in entries.into_iter().filter(|entry| entry.quantity > 0) {
        match cart
            .iter_mut()
            .find(|existing| existing.product.id == entry.product.id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(entry.quantity),
            None => cart.push(entry),
        }
    }
    cart
}

/// Drop duplicate products, keeping the first occurrence.
fn normalize_wishlist(products: Vec<Product>) -> Vec<Product> {
    let mut wishlist: Vec<Product> = Vec::with_capacity(products.len());
    for product in products {
        if !wishlist.iter().any(|existing| existing.id == product.id) {
            wishlist.push(product);
        }
    }
    wishlist
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;

    fn catalog() -> Catalog {
        Catalog::sample().unwrap()
    }

    fn product(catalog: &Catalog, id: &str) -> Product {
        catalog.find(&ProductId::new(id)).unwrap().clone()
    }

    fn recomputed_total<S: KeyValueStorage>(store: &ShopStore<S>) -> Price {
        store
            .cart()
            .iter()
            .map(|entry| entry.product.price * entry.quantity)
            .sum()
    }

    #[test]
    fn test_add_twice_yields_single_entry() {
        let catalog = catalog();
        let chair = product(&catalog, "1");
        let mut store = ShopStore::restore(MemoryStorage::new());

        store.add_to_cart(&chair);
        store.add_to_cart(&chair);

        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart()[0].quantity, 2);
        assert_eq!(store.cart_total(), Price::from_units(1598));
        assert_eq!(store.cart_items_count(), 2);
    }

    #[test]
    fn test_new_products_are_appended() {
        let catalog = catalog();
        let mut store = ShopStore::restore(MemoryStorage::new());

        store.add_to_cart(&product(&catalog, "3"));
        store.add_to_cart(&product(&catalog, "1"));
        store.add_to_cart(&product(&catalog, "3"));

        let ids: Vec<&str> = store.cart().iter().map(|e| e.product.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_update_to_zero_matches_remove() {
        let catalog = catalog();
        let mut updated = ShopStore::restore(MemoryStorage::new());
        let mut removed = ShopStore::restore(MemoryStorage::new());
        for store in [&mut updated, &mut removed] {
            store.add_to_cart(&product(&catalog, "1"));
            store.add_to_cart(&product(&catalog, "2"));
        }

        updated.update_quantity(&ProductId::new("1"), 0);
        removed.remove_from_cart(&ProductId::new("1"));

        assert_eq!(updated.cart(), removed.cart());
        assert_eq!(updated.cart_total(), removed.cart_total());

        updated.update_quantity(&ProductId::new("2"), -3);
        assert!(updated.cart().is_empty());
    }

    #[test]
    fn test_update_missing_entry_is_noop() {
        let mut store = ShopStore::restore(MemoryStorage::new());
        store.update_quantity(&ProductId::new("9"), 4);
        store.remove_from_cart(&ProductId::new("9"));
        assert!(store.cart().is_empty());
        assert_eq!(store.into_storage().dirty_keys().count(), 0);
    }

    #[test]
    fn test_update_out_of_range_quantity_is_ignored() {
        let catalog = catalog();
        let mut store = ShopStore::restore(MemoryStorage::new());
        store.add_to_cart(&product(&catalog, "1"));

        store.update_quantity(&ProductId::new("1"), i64::from(u32::MAX) + 1);
        assert_eq!(store.cart()[0].quantity, 1);
        assert_eq!(store.cart_items_count(), 1);

        store.update_quantity(&ProductId::new("1"), i64::from(u32::MAX));
        assert_eq!(store.cart()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_totals_never_drift() {
        let catalog = catalog();
        let mut store = ShopStore::restore(MemoryStorage::new());

        store.add_to_cart(&product(&catalog, "1"));
        assert_eq!(store.cart_total(), recomputed_total(&store));
        store.add_to_cart_quantity(&product(&catalog, "2"), 3);
        assert_eq!(store.cart_total(), recomputed_total(&store));
        store.update_quantity(&ProductId::new("1"), 5);
        assert_eq!(store.cart_total(), recomputed_total(&store));
        store.remove_from_cart(&ProductId::new("2"));
        assert_eq!(store.cart_total(), recomputed_total(&store));
        store.add_to_cart(&product(&catalog, "6"));
        assert_eq!(store.cart_total(), Price::from_units(5 * 799 + 2299));
        assert_eq!(store.cart_items_count(), 6);
        store.clear_cart();
        assert_eq!(store.cart_total(), Price::ZERO);
        assert_eq!(store.cart_items_count(), 0);
    }

    #[test]
    fn test_add_quantity_matches_repeated_adds() {
        let catalog = catalog();
        let table = product(&catalog, "2");
        let mut bulk = ShopStore::restore(MemoryStorage::new());
        let mut single = ShopStore::restore(MemoryStorage::new());

        bulk.add_to_cart_quantity(&table, 3);
        for _ in 0..3 {
            single.add_to_cart(&table);
        }
        assert_eq!(bulk.cart(), single.cart());

        bulk.add_to_cart_quantity(&table, 0);
        assert_eq!(bulk.cart_items_count(), 3);
    }

    #[test]
    fn test_wishlist_is_idempotent() {
        let catalog = catalog();
        let bed = product(&catalog, "4");
        let mut store = ShopStore::restore(MemoryStorage::new());

        store.add_to_wishlist(&bed);
        store.add_to_wishlist(&bed);
        assert_eq!(store.wishlist().len(), 1);
        assert!(store.is_in_wishlist(&bed.id));

        store.remove_from_wishlist(&bed.id);
        store.remove_from_wishlist(&bed.id);
        assert!(!store.is_in_wishlist(&bed.id));
    }

    #[test]
    fn test_move_to_cart_keeps_wishlist_entry() {
        let catalog = catalog();
        let shelf = product(&catalog, "5");
        let mut store = ShopStore::restore(MemoryStorage::new());

        assert!(!store.move_to_cart(&shelf.id));
        store.add_to_wishlist(&shelf);
        assert!(store.move_to_cart(&shelf.id));

        assert_eq!(store.cart_items_count(), 1);
        assert!(store.is_in_wishlist(&shelf.id));
    }

    #[test]
    fn test_state_survives_reload() {
        let catalog = catalog();
        let mut storage = MemoryStorage::new();
        {
            let mut store = ShopStore::restore(&mut storage);
            store.add_to_cart_quantity(&product(&catalog, "1"), 2);
            store.add_to_wishlist(&product(&catalog, "6"));
        }

        let reloaded = ShopStore::restore(&mut storage);
        assert_eq!(reloaded.cart_items_count(), 2);
        assert_eq!(reloaded.cart_total(), Price::from_units(1598));
        assert_eq!(reloaded.wishlist()[0].id, ProductId::new("6"));
    }

    #[test]
    fn test_invalid_json_restores_empty() {
        let storage = MemoryStorage::new()
            .with_entry(keys::CART, "[{\"product\": ")
            .with_entry(keys::WISHLIST, "null");
        let store = ShopStore::restore(storage);
        assert!(store.cart().is_empty());
        assert!(store.wishlist().is_empty());
        assert_eq!(store.cart_total(), Price::ZERO);
    }

    #[test]
    fn test_restore_normalizes_entries() {
        let catalog = catalog();
        let chair = product(&catalog, "1");
        let table = product(&catalog, "2");
        let persisted = vec![
            CartEntry {
                product: chair.clone(),
                quantity: 1,
            },
            CartEntry {
                product: table.clone(),
                quantity: 0,
            },
            CartEntry {
                product: chair.clone(),
                quantity: 2,
            },
        ];
        let storage = MemoryStorage::new()
            .with_entry(keys::CART, serde_json::to_string(&persisted).unwrap())
            .with_entry(
                keys::WISHLIST,
                serde_json::to_string(&vec![table.clone(), table]).unwrap(),
            );

        let store = ShopStore::restore(storage);
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart()[0].quantity, 3);
        assert_eq!(store.cart_total(), Price::from_units(3 * 799));
        assert_eq!(store.wishlist().len(), 1);
    }

    #[test]
    fn test_mutations_persist_only_touched_collection() {
        let catalog = catalog();
        let mut store = ShopStore::restore(MemoryStorage::new());
        store.add_to_wishlist(&product(&catalog, "2"));

        let storage = store.into_storage();
        assert_eq!(storage.dirty_keys().collect::<Vec<_>>(), vec!["wishlist"]);
    }
}
