//! Fixtures
//!
//! YAML catalogs, discount schedules and carts, loaded from
//! `<base>/catalogs`, `<base>/schedules` and `<base>/carts`.

use std::{fs, path::PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{CartError, CartState},
    catalog::{Catalog, CatalogError},
    discounts::{DiscountError, DiscountSchedule},
    fixtures::{carts::CartFixture, catalogs::CatalogFixture, schedules::ScheduleFixture},
    pricing::PricingEngine,
};

pub mod carts;
pub mod catalogs;
pub mod schedules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// Fixture file path
        path: PathBuf,

        /// Underlying IO error
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Catalog has no currency and no products to infer one from
    #[error("Catalog has no currency and no products")]
    NoCurrency,

    /// No catalog loaded yet
    #[error("No catalog loaded; load a catalog before its schedule or pricing")]
    NoCatalog,

    /// Catalog construction error
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Discount schedule construction error
    #[error("Invalid discount schedule: {0}")]
    Discount(#[from] DiscountError),

    /// Cart construction error
    #[error("Invalid cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Option<Catalog<'a>>,
    schedule: Option<DiscountSchedule<'a>>,
    cart: CartState,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            schedule: None,
            cart: CartState::new(),
        }
    }

    /// Load a catalog from `catalogs/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// products do not form a valid catalog.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = self.read("catalogs", name)?;
        let catalog = Catalog::try_from(fixture)?;

        info!(
            name,
            products = catalog.len(),
            currency = catalog.currency().iso_alpha_code,
            "loaded catalog fixture"
        );

        self.catalog = Some(catalog);

        Ok(self)
    }

    /// Load a discount schedule from `schedules/<name>.yml`, in the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded, if the file cannot be read
    /// or parsed, or if the tiers do not form a valid schedule.
    pub fn load_schedule(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.catalog()?.currency();

        let fixture: ScheduleFixture = self.read("schedules", name)?;
        let schedule = fixture.try_into_schedule(currency)?;

        info!(name, tiers = schedule.tiers().len(), "loaded schedule fixture");

        self.schedule = Some(schedule);

        Ok(self)
    }

    /// Load a cart from `carts/<name>.yml`, replacing the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// quantity is negative.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;
        let cart = CartState::try_from(fixture)?;

        info!(name, skus = cart.len(), units = cart.total_units(), "loaded cart fixture");

        self.cart = cart;

        Ok(self)
    }

    /// Load a complete fixture set (catalog, schedule and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_catalog(name)?
            .load_schedule(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog has been loaded.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Get the loaded discount schedule, if any
    pub fn schedule(&self) -> Option<&DiscountSchedule<'a>> {
        self.schedule.as_ref()
    }

    /// Build a pricing engine from the loaded schedule, or the standard
    /// schedule in the catalog currency when none was loaded.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog has been loaded.
    pub fn engine(&self) -> Result<PricingEngine<'a>, FixtureError> {
        let currency = self.catalog()?.currency();

        Ok(PricingEngine::new(
            self.schedule
                .clone()
                .unwrap_or_else(|| DiscountSchedule::standard(currency)),
        ))
    }

    /// Get the loaded cart
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Get the loaded cart for mutation
    pub fn cart_mut(&mut self) -> &mut CartState {
        &mut self.cart
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let path = self.base_path.join(kind).join(format!("{name}.yml"));

        let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(serde_norway::from_str(&contents)?)
    }
}
