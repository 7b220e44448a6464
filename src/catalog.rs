//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::{Product, Sku};

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency (sku, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(Sku, &'static str, &'static str),

    /// A product with the same SKU is already in the catalog.
    #[error("Duplicate SKU {0}")]
    DuplicateSku(Sku),

    /// A product's unit price is zero or negative.
    #[error("Product {0} must have a positive price")]
    NonPositivePrice(Sku),
}

/// Priced products available to a cart, keyed by SKU.
///
/// All products share the catalog currency. The catalog is read-only while a
/// cart is being priced; the engine only ever borrows it.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    products: FxHashMap<Sku, Product<'a>>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Catalog {
            products: FxHashMap::default(),
            currency,
        }
    }

    /// Create a new catalog with the given products.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if any product is rejected by [`Catalog::insert`].
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        products
            .into_iter()
            .try_for_each(|product| catalog.insert(product))?;

        Ok(catalog)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CurrencyMismatch`]: the price is not in the catalog currency.
    /// - [`CatalogError::NonPositivePrice`]: the price is zero or negative.
    /// - [`CatalogError::DuplicateSku`]: the SKU is already present.
    pub fn insert(&mut self, product: Product<'a>) -> Result<(), CatalogError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.sku,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if product.price.to_minor_units() <= 0 {
            return Err(CatalogError::NonPositivePrice(product.sku));
        }

        if self.products.contains_key(&product.sku) {
            return Err(CatalogError::DuplicateSku(product.sku));
        }

        self.products.insert(product.sku.clone(), product);

        Ok(())
    }

    /// Get a product by SKU.
    pub fn get(&self, sku: &str) -> Option<&Product<'a>> {
        self.products.get(sku)
    }

    /// Get the unit price of a product by SKU.
    pub fn unit_price(&self, sku: &str) -> Option<&Money<'a, Currency>> {
        self.products.get(sku).map(|product| &product.price)
    }

    /// Iterate over the products in the catalog, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// Get the number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
