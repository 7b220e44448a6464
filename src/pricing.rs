//! Pricing
//!
//! Turns a [`CartState`] and a [`Catalog`] into a [`PricingResult`]. Pricing
//! is pure and recomputed on every call; nothing is cached between calls.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::CartState,
    catalog::Catalog,
    discounts::{
        DiscountError, DiscountSchedule, DiscountTier, TierHint, percent_of_minor, percent_points,
    },
    products::Sku,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Line or subtotal arithmetic exceeded the range of minor units.
    #[error("cart total overflowed")]
    Overflow,

    /// Catalog currency differs from the discount schedule currency (catalog currency, schedule currency).
    #[error("Catalog has currency {0}, but discount schedule has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    /// Line SKU
    pub sku: Sku,

    /// Units of the SKU in the cart
    pub quantity: u32,

    /// Catalog unit price
    pub unit_price: Money<'a, Currency>,

    /// `quantity` x `unit_price`
    pub line_total: Money<'a, Currency>,
}

/// Outcome of pricing a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    lines: Vec<LineItem<'a>>,
    unpriced: SmallVec<[Sku; 2]>,
    subtotal: Money<'a, Currency>,
    discount_percentage: Percentage,
    discount_amount: Money<'a, Currency>,
    total: Money<'a, Currency>,
    next_tier: Option<TierHint<'a>>,
    currency: &'static Currency,
}

impl<'a> PricingResult<'a> {
    /// Priced lines, ordered by SKU.
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Cart SKUs missing from the catalog, ordered by SKU. They contribute nothing.
    pub fn unpriced(&self) -> &[Sku] {
        &self.unpriced
    }

    /// Total cost before discount.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Discount applied to the subtotal, as a fraction.
    pub fn discount_percentage(&self) -> Percentage {
        self.discount_percentage
    }

    /// Discount applied to the subtotal, in percent points (0, 10, 15, 20 with the standard schedule).
    pub fn discount_percent_points(&self) -> Decimal {
        percent_points(self.discount_percentage)
    }

    /// Amount taken off the subtotal.
    pub fn discount_amount(&self) -> Money<'a, Currency> {
        self.discount_amount
    }

    /// Amount payable after discount.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Next tier the cart could reach, if any.
    pub fn next_tier(&self) -> Option<&TierHint<'a>> {
        self.next_tier.as_ref()
    }

    /// Units across all priced lines.
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Prices carts against a discount schedule.
#[derive(Debug, Clone)]
pub struct PricingEngine<'a> {
    schedule: DiscountSchedule<'a>,
}

impl<'a> PricingEngine<'a> {
    /// Create an engine with the given schedule.
    pub fn new(schedule: DiscountSchedule<'a>) -> Self {
        Self { schedule }
    }

    /// Create an engine with the standard bulk schedule.
    pub fn standard(currency: &'static Currency) -> Self {
        Self::new(DiscountSchedule::standard(currency))
    }

    /// Return the discount schedule.
    pub fn schedule(&self) -> &DiscountSchedule<'a> {
        &self.schedule
    }

    /// Price a cart.
    ///
    /// Line totals and the subtotal are exact in minor units. The discount is
    /// the only rounded amount (half away from zero), and the total is the
    /// subtotal less the discount.
    ///
    /// # Errors
    ///
    /// - [`PricingError::CurrencyMismatch`]: the catalog and schedule currencies differ.
    /// - [`PricingError::Overflow`]: a line total or the subtotal does not fit in minor units.
    /// - [`PricingError::Discount`]: the discount could not be calculated.
    pub fn price(
        &self,
        cart: &CartState,
        catalog: &Catalog<'a>,
    ) -> Result<PricingResult<'a>, PricingError> {
        let currency = catalog.currency();

        if currency != self.schedule.currency() {
            return Err(PricingError::CurrencyMismatch(
                currency.iso_alpha_code,
                self.schedule.currency().iso_alpha_code,
            ));
        }

        let mut lines = Vec::with_capacity(cart.len());
        let mut unpriced: SmallVec<[Sku; 2]> = SmallVec::new();

        for (sku, quantity) in cart.iter() {
            let Some(unit_price) = catalog.unit_price(sku.as_str()) else {
                debug!(%sku, quantity, "sku not in catalog, skipping");

                unpriced.push(sku.clone());

                continue;
            };

            let line_minor = unit_price
                .to_minor_units()
                .checked_mul(i64::from(quantity))
                .ok_or(PricingError::Overflow)?;

            lines.push(LineItem {
                sku: sku.clone(),
                quantity,
                unit_price: *unit_price,
                line_total: Money::from_minor(line_minor, currency),
            });
        }

        lines.sort_by(|a, b| a.sku.cmp(&b.sku));
        unpriced.sort();

        let subtotal_minor = lines
            .iter()
            .try_fold(0_i64, |acc, line| {
                acc.checked_add(line.line_total.to_minor_units())
            })
            .ok_or(PricingError::Overflow)?;

        let subtotal = Money::from_minor(subtotal_minor, currency);

        let discount_percentage = self
            .schedule
            .select(&subtotal)
            .map_or_else(|| Percentage::from(Decimal::ZERO), DiscountTier::percentage);

        let discount_minor = percent_of_minor(&discount_percentage, subtotal_minor)?;

        let total_minor = subtotal_minor
            .checked_sub(discount_minor)
            .ok_or(PricingError::Overflow)?;

        debug!(
            lines = lines.len(),
            unpriced = unpriced.len(),
            subtotal = subtotal_minor,
            discount = discount_minor,
            total = total_minor,
            "priced cart"
        );

        Ok(PricingResult {
            lines,
            unpriced,
            subtotal,
            discount_percentage,
            discount_amount: Money::from_minor(discount_minor, currency),
            total: Money::from_minor(total_minor, currency),
            next_tier: self.schedule.next_tier(&subtotal),
            currency,
        })
    }
}

/// Price a cart with the standard bulk schedule in the catalog currency.
///
/// # Errors
///
/// See [`PricingEngine::price`].
pub fn price<'a>(
    cart: &CartState,
    catalog: &Catalog<'a>,
) -> Result<PricingResult<'a>, PricingError> {
    PricingEngine::standard(catalog.currency()).price(cart, catalog)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn batteries<'a>() -> Result<Catalog<'a>, crate::catalog::CatalogError> {
        Catalog::with_products(
            [
                Product::new("6Ah", "6Ah Battery Pack", Money::from_minor(9_500, GBP)),
                Product::new("9Ah", "9Ah Battery Pack", Money::from_minor(12_500, GBP)),
                Product::new("15Ah", "15Ah Battery Pack", Money::from_minor(24_500, GBP)),
            ],
            GBP,
        )
    }

    #[test]
    fn empty_cart_prices_to_zero() -> TestResult {
        let result = price(&CartState::new(), &batteries()?)?;

        assert_eq!(result.subtotal().to_minor_units(), 0);
        assert_eq!(result.discount_percent_points(), Decimal::ZERO);
        assert_eq!(result.discount_amount().to_minor_units(), 0);
        assert_eq!(result.total().to_minor_units(), 0);
        assert!(result.lines().is_empty());

        Ok(())
    }

    #[test]
    fn empty_catalog_prices_to_zero() -> TestResult {
        let cart = CartState::from_quantities([("6Ah", 4)])?;

        let result = price(&cart, &Catalog::new(GBP))?;

        assert_eq!(result.total().to_minor_units(), 0);
        assert_eq!(result.unpriced(), &[Sku::from("6Ah")]);

        Ok(())
    }

    #[test]
    fn lines_are_sorted_by_sku() -> TestResult {
        let cart = CartState::from_quantities([("9Ah", 1), ("15Ah", 1), ("6Ah", 1)])?;

        let result = price(&cart, &batteries()?)?;

        let skus: Vec<&str> = result.lines().iter().map(|line| line.sku.as_str()).collect();

        assert_eq!(skus, vec!["15Ah", "6Ah", "9Ah"]);

        Ok(())
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() -> TestResult {
        let cart = CartState::from_quantities([("15Ah", 3)])?;

        let result = price(&cart, &batteries()?)?;
        let line = result.lines().first().ok_or("expected a line")?;

        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price.to_minor_units(), 24_500);
        assert_eq!(line.line_total.to_minor_units(), 73_500);
        assert_eq!(result.total_units(), 3);

        Ok(())
    }

    #[test]
    fn unknown_skus_contribute_nothing() -> TestResult {
        let cart = CartState::from_quantities([("9Ah", 2), ("20Ah", 7), ("12Ah", 1)])?;

        let result = price(&cart, &batteries()?)?;

        assert_eq!(result.subtotal().to_minor_units(), 25_000);
        assert_eq!(result.unpriced(), &[Sku::from("12Ah"), Sku::from("20Ah")]);
        assert_eq!(result.total_units(), 2);

        Ok(())
    }

    #[test]
    fn discount_is_rounded_half_up() -> TestResult {
        let catalog = Catalog::with_products(
            [Product::new("cell", "Cell", Money::from_minor(100_005, GBP))],
            GBP,
        )?;
        let cart = CartState::from_quantities([("cell", 1)])?;

        let result = price(&cart, &catalog)?;

        // 10% of 1000.05 is 100.005
        assert_eq!(result.discount_amount().to_minor_units(), 10_001);
        assert_eq!(result.total().to_minor_units(), 90_004);

        Ok(())
    }

    #[test]
    fn custom_schedule_is_used() -> TestResult {
        let schedule = DiscountSchedule::new(
            [DiscountTier::new(
                Money::from_minor(10_000, GBP),
                Percentage::from(Decimal::new(5, 2)),
            )],
            GBP,
        )?;
        let engine = PricingEngine::new(schedule);
        let cart = CartState::from_quantities([("6Ah", 2)])?;

        let result = engine.price(&cart, &batteries()?)?;

        assert_eq!(result.subtotal().to_minor_units(), 19_000);
        assert_eq!(result.discount_percent_points(), Decimal::from(5));
        assert_eq!(result.discount_amount().to_minor_units(), 950);
        assert!(result.next_tier().is_none());

        Ok(())
    }

    #[test]
    fn next_tier_is_reported() -> TestResult {
        let cart = CartState::from_quantities([("6Ah", 10)])?;

        let result = price(&cart, &batteries()?)?;
        let hint = result.next_tier().ok_or("expected a next tier")?;

        assert_eq!(hint.shortfall.to_minor_units(), 5_000);
        assert_eq!(percent_points(hint.tier.percentage()), Decimal::from(10));

        Ok(())
    }

    #[test]
    fn schedule_currency_mismatch_errors() -> TestResult {
        let engine = PricingEngine::standard(USD);

        let result = engine.price(&CartState::new(), &batteries()?);

        assert_eq!(
            result.err(),
            Some(PricingError::CurrencyMismatch(
                GBP.iso_alpha_code,
                USD.iso_alpha_code
            ))
        );

        Ok(())
    }

    #[test]
    fn line_overflow_errors() -> TestResult {
        let catalog = Catalog::with_products(
            [Product::new("bulk", "Bulk", Money::from_minor(i64::MAX / 2, GBP))],
            GBP,
        )?;
        let cart = CartState::from_quantities([("bulk", 3)])?;

        assert_eq!(price(&cart, &catalog).err(), Some(PricingError::Overflow));

        Ok(())
    }
}
