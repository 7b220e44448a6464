//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{catalog::Catalog, fixtures::FixtureError, products::Product};

/// Wrapper for catalog products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Catalog currency code; inferred from the first product when omitted
    #[serde(default)]
    pub currency: Option<String>,

    /// Map of SKU -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Unit price (e.g., "95 GBP")
    pub price: String,
}

impl TryFrom<CatalogFixture> for Catalog<'_> {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let mut parsed = fixture
            .products
            .into_iter()
            .map(|(sku, product)| {
                let (minor_units, currency) = parse_price(&product.price)?;

                Ok((sku, product.name, minor_units, currency))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        parsed.sort_by(|a, b| a.0.cmp(&b.0));

        let currency = match fixture.currency.as_deref() {
            Some(code) => parse_currency(code)?,
            None => parsed
                .first()
                .map(|(_, _, _, currency)| *currency)
                .ok_or(FixtureError::NoCurrency)?,
        };

        let products = parsed
            .into_iter()
            .map(|(sku, name, minor_units, product_currency)| {
                Product::new(sku, name, Money::from_minor(minor_units, product_currency))
            });

        Ok(Catalog::with_products(products, currency)?)
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// Amounts are never rounded: "95.999 GBP" is rejected rather than loaded
/// as 96.00.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, if it has more decimal
/// places than the currency's minor unit, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.normalize().scale() > currency.exponent {
        return Err(FixtureError::InvalidPrice(format!(
            "More than {} decimal places in {s}",
            currency.exponent
        )));
    }

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|factor| amount.checked_mul(Decimal::from(factor)))
        .and_then(|value| value.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything other than GBP, USD or EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
