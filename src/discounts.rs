//! Discounts
//!
//! Bulk-discount tiers selected by subtotal threshold, and the percentage
//! arithmetic shared by the pricing engine.

use std::cmp::Reverse;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

/// Errors specific to discount calculations and schedules.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percentage outside of 0% to 100%.
    #[error("discount percentage must be between 0% and 100%, got {0}%")]
    InvalidPercentage(Decimal),

    /// Tier threshold currency differs from the schedule currency (threshold currency, schedule currency).
    #[error("Tier threshold has currency {0}, but schedule has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Tier threshold is negative.
    #[error("Tier threshold must not be negative, got {0} minor units")]
    NegativeThreshold(i64),

    /// Two tiers share a threshold.
    #[error("Duplicate tier threshold of {0} minor units")]
    DuplicateThreshold(i64),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Rounds half away from zero to the nearest minor unit.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Convert a fractional percentage (e.g. 0.15) to percent points (e.g. 15).
pub fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// A single discount tier: subtotals at or above `threshold` get `percentage` off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountTier<'a> {
    threshold: Money<'a, Currency>,
    percentage: Percentage,
}

impl<'a> DiscountTier<'a> {
    /// Create a new tier.
    pub fn new(threshold: Money<'a, Currency>, percentage: Percentage) -> Self {
        Self {
            threshold,
            percentage,
        }
    }

    /// Return the minimum subtotal for this tier.
    pub fn threshold(&self) -> &Money<'a, Currency> {
        &self.threshold
    }

    /// Return the discount percentage as a fraction.
    pub fn percentage(&self) -> Percentage {
        self.percentage
    }
}

/// Next tier above a subtotal, and how much more spend reaches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierHint<'a> {
    /// The tier that would apply next
    pub tier: DiscountTier<'a>,

    /// Amount the subtotal must grow by to reach the tier
    pub shortfall: Money<'a, Currency>,
}

/// Descending threshold table of discount tiers.
///
/// Tiers are held highest threshold first; the first tier whose threshold is
/// at or below a subtotal wins. There is no interpolation between tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountSchedule<'a> {
    tiers: SmallVec<[DiscountTier<'a>; 4]>,
    currency: &'static Currency,
}

impl<'a> DiscountSchedule<'a> {
    /// Create a schedule from tiers in any order.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::CurrencyMismatch`]: a threshold is not in `currency`.
    /// - [`DiscountError::NegativeThreshold`]: a threshold is below zero.
    /// - [`DiscountError::InvalidPercentage`]: a percentage is outside 0% to 100%.
    /// - [`DiscountError::DuplicateThreshold`]: two tiers share a threshold.
    pub fn new(
        tiers: impl IntoIterator<Item = DiscountTier<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, DiscountError> {
        let mut tiers: SmallVec<[DiscountTier<'a>; 4]> = tiers.into_iter().collect();

        for tier in &tiers {
            let tier_currency = tier.threshold.currency();

            if tier_currency != currency {
                return Err(DiscountError::CurrencyMismatch(
                    tier_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            let threshold_minor = tier.threshold.to_minor_units();

            if threshold_minor < 0 {
                return Err(DiscountError::NegativeThreshold(threshold_minor));
            }

            let fraction = tier.percentage * Decimal::ONE;

            if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(DiscountError::InvalidPercentage(percent_points(
                    tier.percentage,
                )));
            }
        }

        tiers.sort_by_key(|tier| Reverse(tier.threshold.to_minor_units()));

        if let Some(pair) = tiers
            .windows(2)
            .find(|pair| pair_thresholds_equal(pair))
            .and_then(|pair| pair.first())
        {
            return Err(DiscountError::DuplicateThreshold(
                pair.threshold.to_minor_units(),
            ));
        }

        Ok(Self { tiers, currency })
    }

    /// The default bulk schedule: 10% from 1000, 15% from 2500, 20% from 5000.
    pub fn standard(currency: &'static Currency) -> Self {
        let tier = |major: i64, percent: i64| {
            DiscountTier::new(
                Money::from_minor(major * 100, currency),
                Percentage::from(Decimal::new(percent, 2)),
            )
        };

        Self {
            tiers: smallvec![tier(5_000, 20), tier(2_500, 15), tier(1_000, 10)],
            currency,
        }
    }

    /// A schedule that never discounts.
    pub fn none(currency: &'static Currency) -> Self {
        Self {
            tiers: SmallVec::new(),
            currency,
        }
    }

    /// Return the tiers, highest threshold first.
    pub fn tiers(&self) -> &[DiscountTier<'a>] {
        &self.tiers
    }

    /// Return the schedule currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Select the tier that applies to a subtotal, if any.
    ///
    /// Amounts are compared in minor units; callers are expected to have
    /// checked the subtotal is in the schedule currency.
    pub fn select(&self, subtotal: &Money<'_, Currency>) -> Option<&DiscountTier<'a>> {
        let subtotal_minor = subtotal.to_minor_units();

        self.tiers
            .iter()
            .find(|tier| tier.threshold.to_minor_units() <= subtotal_minor)
    }

    /// Find the lowest tier above a subtotal, with the remaining spend needed to reach it.
    pub fn next_tier(&self, subtotal: &Money<'_, Currency>) -> Option<TierHint<'a>> {
        let subtotal_minor = subtotal.to_minor_units();

        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.threshold.to_minor_units() > subtotal_minor)
            .map(|tier| TierHint {
                tier: *tier,
                shortfall: Money::from_minor(
                    tier.threshold.to_minor_units() - subtotal_minor,
                    self.currency,
                ),
            })
    }
}

fn pair_thresholds_equal(pair: &[DiscountTier<'_>]) -> bool {
    match pair {
        [a, b] => a.threshold.to_minor_units() == b.threshold.to_minor_units(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, GBP)
    }

    fn percent(points: i64) -> Percentage {
        Percentage::from(Decimal::new(points, 2))
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        assert_eq!(percent_of_minor(&percent(15), 342_500)?, 51_375);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        // 10% of 1.05 is 0.105
        assert_eq!(percent_of_minor(&percent(10), 105)?, 11);

        // 10% of 1.04 is 0.104
        assert_eq!(percent_of_minor(&percent(10), 104)?, 10);

        Ok(())
    }

    #[test]
    fn percent_points_scales_fraction() {
        assert_eq!(percent_points(percent(15)), Decimal::from(15));
        assert_eq!(percent_points(Percentage::from(Decimal::ZERO)), Decimal::ZERO);
    }

    #[test]
    fn standard_schedule_is_descending() {
        let schedule = DiscountSchedule::standard(GBP);

        let thresholds: Vec<i64> = schedule
            .tiers()
            .iter()
            .map(|tier| tier.threshold().to_minor_units())
            .collect();

        assert_eq!(thresholds, vec![500_000, 250_000, 100_000]);
    }

    #[test]
    fn select_uses_highest_matching_threshold() {
        let schedule = DiscountSchedule::standard(GBP);

        let selected = |minor| {
            schedule
                .select(&gbp(minor))
                .map(|tier| percent_points(tier.percentage()))
        };

        assert_eq!(selected(99_999), None);
        assert_eq!(selected(100_000), Some(Decimal::from(10)));
        assert_eq!(selected(249_999), Some(Decimal::from(10)));
        assert_eq!(selected(250_000), Some(Decimal::from(15)));
        assert_eq!(selected(499_999), Some(Decimal::from(15)));
        assert_eq!(selected(500_000), Some(Decimal::from(20)));
        assert_eq!(selected(10_000_000), Some(Decimal::from(20)));
    }

    #[test]
    fn none_schedule_never_selects() {
        let schedule = DiscountSchedule::none(GBP);

        assert!(schedule.select(&gbp(10_000_000)).is_none());
        assert!(schedule.next_tier(&gbp(0)).is_none());
    }

    #[test]
    fn new_sorts_tiers() -> TestResult {
        let schedule = DiscountSchedule::new(
            [
                DiscountTier::new(gbp(100_000), percent(10)),
                DiscountTier::new(gbp(500_000), percent(20)),
                DiscountTier::new(gbp(250_000), percent(15)),
            ],
            GBP,
        )?;

        assert_eq!(schedule, DiscountSchedule::standard(GBP));

        Ok(())
    }

    #[test]
    fn new_rejects_currency_mismatch() {
        let result = DiscountSchedule::new(
            [DiscountTier::new(Money::from_minor(100, USD), percent(10))],
            GBP,
        );

        assert_eq!(
            result.err(),
            Some(DiscountError::CurrencyMismatch(
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn new_rejects_negative_threshold() {
        let result = DiscountSchedule::new([DiscountTier::new(gbp(-1), percent(10))], GBP);

        assert_eq!(result.err(), Some(DiscountError::NegativeThreshold(-1)));
    }

    #[test]
    fn new_rejects_percentage_over_one_hundred() {
        let result = DiscountSchedule::new([DiscountTier::new(gbp(100), percent(150))], GBP);

        assert_eq!(
            result.err(),
            Some(DiscountError::InvalidPercentage(Decimal::from(150)))
        );
    }

    #[test]
    fn new_rejects_duplicate_threshold() {
        let result = DiscountSchedule::new(
            [
                DiscountTier::new(gbp(100_000), percent(10)),
                DiscountTier::new(gbp(100_000), percent(12)),
            ],
            GBP,
        );

        assert_eq!(result.err(), Some(DiscountError::DuplicateThreshold(100_000)));
    }

    #[test]
    fn next_tier_reports_shortfall() -> TestResult {
        let schedule = DiscountSchedule::standard(GBP);

        let hint = schedule.next_tier(&gbp(300_000)).ok_or("expected a next tier")?;

        assert_eq!(hint.tier.threshold().to_minor_units(), 500_000);
        assert_eq!(hint.shortfall.to_minor_units(), 200_000);

        let hint = schedule.next_tier(&gbp(0)).ok_or("expected a next tier")?;

        assert_eq!(hint.tier.threshold().to_minor_units(), 100_000);

        Ok(())
    }

    #[test]
    fn next_tier_is_none_at_top_tier() {
        let schedule = DiscountSchedule::standard(GBP);

        assert!(schedule.next_tier(&gbp(500_000)).is_none());
    }
}
