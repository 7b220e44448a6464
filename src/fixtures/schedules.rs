//! Discount Schedule Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    discounts::{DiscountSchedule, DiscountTier},
    fixtures::{FixtureError, catalogs::parse_price},
};

/// Wrapper for discount tiers in YAML
#[derive(Debug, Deserialize)]
pub struct ScheduleFixture {
    /// Tiers in any order
    #[serde(default)]
    pub tiers: Vec<TierFixture>,
}

/// Discount Tier Fixture
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Minimum subtotal (e.g., "1000 GBP")
    pub threshold: String,

    /// Discount (e.g., "10%" or "0.10")
    pub discount: String,
}

impl ScheduleFixture {
    /// Build a schedule in the given currency.
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold or discount cannot be parsed, or if the
    /// tiers do not form a valid schedule in `currency`.
    pub fn try_into_schedule<'a>(
        self,
        currency: &'static Currency,
    ) -> Result<DiscountSchedule<'a>, FixtureError> {
        let tiers = self
            .tiers
            .iter()
            .map(|tier| {
                let (minor_units, tier_currency) = parse_price(&tier.threshold)?;

                Ok(DiscountTier::new(
                    Money::from_minor(minor_units, tier_currency),
                    parse_percentage(&tier.discount)?,
                ))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(DiscountSchedule::new(tiers, currency)?)
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::discounts::{DiscountError, percent_points};

    use super::*;

    #[test]
    fn parse_percentage_accepts_percentage_format() -> TestResult {
        assert_eq!(percent_points(parse_percentage("15%")?), Decimal::from(15));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> TestResult {
        assert_eq!(percent_points(parse_percentage("0.15")?), Decimal::from(15));

        Ok(())
    }

    #[test]
    fn parse_percentage_handles_whitespace() -> TestResult {
        assert_eq!(percent_points(parse_percentage("  20 %  ")?), Decimal::from(20));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("invalid");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn schedule_fixture_builds_standard_schedule() -> TestResult {
        let yaml = r#"
tiers:
  - threshold: 1000 GBP
    discount: 10%
  - threshold: 2500 GBP
    discount: 15%
  - threshold: 5000 GBP
    discount: 20%
"#;

        let fixture: ScheduleFixture = serde_norway::from_str(yaml)?;
        let schedule = fixture.try_into_schedule(GBP)?;

        assert_eq!(schedule, DiscountSchedule::standard(GBP));

        Ok(())
    }

    #[test]
    fn schedule_fixture_without_tiers_is_empty() -> TestResult {
        let fixture: ScheduleFixture = serde_norway::from_str("{}")?;
        let schedule = fixture.try_into_schedule(GBP)?;

        assert!(schedule.tiers().is_empty());

        Ok(())
    }

    #[test]
    fn schedule_fixture_rejects_currency_mismatch() -> TestResult {
        let yaml = r#"
tiers:
  - threshold: 1000 USD
    discount: 10%
"#;

        let fixture: ScheduleFixture = serde_norway::from_str(yaml)?;

        assert!(matches!(
            fixture.try_into_schedule(GBP),
            Err(FixtureError::Discount(DiscountError::CurrencyMismatch(code, _))) if code == USD.iso_alpha_code
        ));

        Ok(())
    }
}
