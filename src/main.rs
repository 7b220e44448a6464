//! Tally CLI
//!
//! Loads a catalog, discount schedule and cart from fixtures, applies any
//! command line edits, and prints the priced cart.

use std::io;

use anyhow::Result;
use tracing::info;

use tally::{fixtures::Fixture, receipt::Receipt};

use crate::config::CliConfig;

mod config;
mod observability;

/// Tally CLI entry point
pub fn main() -> Result<()> {
    let config = CliConfig::load().unwrap_or_else(|err| err.exit());

    observability::init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures.fixtures_dir);

    fixture.load_catalog(&config.fixtures.catalog)?;

    if let Some(schedule) = config.fixtures.schedule.as_deref() {
        fixture.load_schedule(schedule)?;
    }

    if let Some(cart) = config.fixtures.cart.as_deref() {
        fixture.load_cart(cart)?;
    }

    config.cart.apply(fixture.cart_mut())?;

    let engine = fixture.engine()?;
    let catalog = fixture.catalog()?;
    let result = engine.price(fixture.cart(), catalog)?;

    info!(
        units = result.total_units(),
        total = %result.total(),
        "priced cart"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(&result, catalog).write_to(&mut handle)?;

    Ok(())
}
