//! Tally
//!
//! Tally prices shopping carts against a fixed catalog and a tiered bulk-discount schedule.
//!
//! ```
//! use rusty_money::{Money, iso::GBP};
//! use tally::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::with_products(
//!     [Product::new("9Ah", "9Ah Battery Pack", Money::from_minor(12_500, GBP))],
//!     GBP,
//! )?;
//!
//! let mut cart = CartState::new();
//! cart.set_quantity("9Ah", 24)?;
//!
//! let result = PricingEngine::standard(GBP).price(&cart, &catalog)?;
//!
//! assert_eq!(result.total().to_minor_units(), 255_000);
//! # Ok(())
//! # }
//! ```

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
