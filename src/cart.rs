//! Cart

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::products::Sku;

/// Errors related to cart mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An explicit quantity was negative or too large to hold.
    #[error("Invalid quantity {quantity} for {sku}")]
    InvalidQuantity {
        /// SKU the quantity was set for
        sku: Sku,

        /// Rejected quantity
        quantity: i64,
    },
}

/// Per-SKU quantities a shopper intends to purchase.
///
/// Quantities are never negative. A SKU set to zero is dropped from the map,
/// so an absent SKU and a zero quantity are indistinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    quantities: FxHashMap<Sku, u32>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from `(sku, quantity)` pairs, applied in order with
    /// [`CartState::set_quantity`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for the first negative quantity.
    pub fn from_quantities<S: Into<Sku>>(
        quantities: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new();

        for (sku, quantity) in quantities {
            cart.set_quantity(sku, quantity)?;
        }

        Ok(cart)
    }

    /// Set the quantity of a SKU. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is negative or
    /// exceeds `u32::MAX`. The cart is left unchanged.
    pub fn set_quantity(&mut self, sku: impl Into<Sku>, quantity: i64) -> Result<(), CartError> {
        let sku = sku.into();

        let Ok(quantity) = u32::try_from(quantity) else {
            return Err(CartError::InvalidQuantity { sku, quantity });
        };

        debug!(%sku, quantity, "set cart quantity");

        self.store(sku, quantity);

        Ok(())
    }

    /// Change the quantity of a SKU by `delta`, clamping at zero.
    ///
    /// A decrement larger than the current quantity floors at zero rather
    /// than failing. Increments past `u32::MAX` saturate.
    pub fn adjust_quantity(&mut self, sku: impl Into<Sku>, delta: i64) {
        let sku = sku.into();
        let current = i64::from(self.quantity(sku.as_str()));

        let adjusted = current
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX));

        let quantity = u32::try_from(adjusted).unwrap_or(u32::MAX);

        debug!(%sku, delta, quantity, "adjusted cart quantity");

        self.store(sku, quantity);
    }

    /// Remove a SKU from the cart.
    pub fn remove_item(&mut self, sku: impl Into<Sku>) {
        let sku = sku.into();

        debug!(%sku, "removed cart item");

        self.quantities.remove(&sku);
    }

    /// Get the quantity of a SKU; zero if it is not in the cart.
    pub fn quantity(&self, sku: &str) -> u32 {
        self.quantities.get(sku).copied().unwrap_or(0)
    }

    /// Sum of all quantities in the cart.
    pub fn total_units(&self) -> u64 {
        self.quantities.values().copied().map(u64::from).sum()
    }

    /// Iterate over `(sku, quantity)` pairs with non-zero quantity, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Sku, u32)> {
        self.quantities.iter().map(|(sku, quantity)| (sku, *quantity))
    }

    /// Number of distinct SKUs in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Remove every item from the cart.
    pub fn clear(&mut self) {
        self.quantities.clear();
    }

    fn store(&mut self, sku: Sku, quantity: u32) {
        if quantity == 0 {
            self.quantities.remove(&sku);
        } else {
            self.quantities.insert(sku, quantity);
        }
    }
}
