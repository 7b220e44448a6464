//! Cart Fixtures

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{cart::CartState, fixtures::FixtureError};

/// Wrapper for cart quantities in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Map of SKU -> quantity
    #[serde(default)]
    pub items: BTreeMap<String, i64>,
}

impl TryFrom<CartFixture> for CartState {
    type Error = FixtureError;

    fn try_from(fixture: CartFixture) -> Result<Self, Self::Error> {
        Ok(CartState::from_quantities(fixture.items)?)
    }
}
