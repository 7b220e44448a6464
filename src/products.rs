//! Products

use std::{borrow::Borrow, fmt};

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

/// Stock-keeping unit identifier, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Create a new SKU.
    pub fn new(sku: impl Into<String>) -> Self {
        Self(sku.into())
    }

    /// Return the SKU as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sku {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Sku {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Sku {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product SKU
    pub sku: Sku,

    /// Product name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a new product.
    pub fn new(sku: impl Into<Sku>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn sku_displays_inner_string() {
        assert_eq!(Sku::from("9Ah").to_string(), "9Ah");
    }

    #[test]
    fn sku_map_can_be_queried_by_str() {
        let mut map = FxHashMap::default();
        map.insert(Sku::from("15Ah"), 5_u32);

        assert_eq!(map.get("15Ah"), Some(&5));
    }

    #[test]
    fn new_product_keeps_fields() {
        let product = Product::new("6Ah", "6Ah Battery Pack", Money::from_minor(9500, GBP));

        assert_eq!(product.sku.as_str(), "6Ah");
        assert_eq!(product.name, "6Ah Battery Pack");
        assert_eq!(product.price.to_minor_units(), 9500);
    }
}
