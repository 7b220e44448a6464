//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartState},
    catalog::{Catalog, CatalogError},
    discounts::{DiscountError, DiscountSchedule, DiscountTier, TierHint},
    fixtures::{Fixture, FixtureError},
    pricing::{LineItem, PricingEngine, PricingError, PricingResult, price},
    products::{Product, Sku},
    receipt::{Receipt, ReceiptError},
};
