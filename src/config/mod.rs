//! CLI configuration module

use std::path::PathBuf;

use clap::{Args, Parser};
use tally::cart::{CartError, CartState};

use crate::config::observability::LoggingConfig;

pub(crate) mod observability;

/// Tally CLI configuration
#[derive(Debug, Parser)]
#[command(
    name = "tally",
    about = "Price a cart against a tiered bulk-discount schedule",
    long_about = None
)]
pub(crate) struct CliConfig {
    /// Fixture selection.
    #[command(flatten)]
    pub fixtures: FixtureArgs,

    /// Cart edits applied after the cart fixture is loaded.
    #[command(flatten)]
    pub cart: CartArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Fixture selection settings.
#[derive(Debug, Args)]
pub(crate) struct FixtureArgs {
    /// Directory holding `catalogs/`, `schedules/` and `carts/`
    #[arg(long, env = "TALLY_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Catalog fixture name
    #[arg(short, long, env = "TALLY_CATALOG", default_value = "batteries")]
    pub catalog: String,

    /// Discount schedule fixture name (standard schedule when omitted)
    #[arg(short, long, env = "TALLY_SCHEDULE")]
    pub schedule: Option<String>,

    /// Cart fixture name (empty cart when omitted)
    #[arg(long = "cart")]
    pub cart: Option<String>,
}

/// Cart edits.
///
/// Every `--set` is applied before any `--adjust`, whatever their order on
/// the command line.
#[derive(Debug, Args)]
pub(crate) struct CartArgs {
    /// Set a quantity, e.g. `--set 9Ah=24`. Applied before all adjustments
    #[arg(long = "set", value_name = "SKU=QTY", value_parser = parse_sku_value)]
    pub set: Vec<SkuValue>,

    /// Adjust a quantity, clamping at zero, e.g. `--adjust 6Ah=-5`. Applied after all sets
    #[arg(long = "adjust", value_name = "SKU=DELTA", value_parser = parse_sku_value)]
    pub adjust: Vec<SkuValue>,
}

impl CartArgs {
    /// Apply the edits to a cart: all sets, then all adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a negative `--set` value.
    pub(crate) fn apply(&self, cart: &mut CartState) -> Result<(), CartError> {
        for edit in &self.set {
            cart.set_quantity(edit.sku.as_str(), edit.value)?;
        }

        for edit in &self.adjust {
            cart.adjust_quantity(edit.sku.as_str(), edit.value);
        }

        Ok(())
    }
}

/// A `SKU=N` command line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkuValue {
    pub sku: String,
    pub value: i64,
}

fn parse_sku_value(s: &str) -> Result<SkuValue, String> {
    let (sku, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SKU=N, got `{s}`"))?;

    let sku = sku.trim();

    if sku.is_empty() {
        return Err(format!("missing SKU in `{s}`"));
    }

    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid number in `{s}`: {err}"))?;

    Ok(SkuValue {
        sku: sku.to_string(),
        value,
    })
}
