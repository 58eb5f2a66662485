//! Fixtures
//!
//! Catalogs are described in YAML under `fixtures/catalog/<name>.yml`. The storefront's own
//! catalog is also compiled into the crate so the binary works without a fixtures directory.

use std::{fs, path::PathBuf};

use rusty_money::Money;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError, CatalogItem, GuideId},
    fixtures::catalog::{CatalogFixture, ScheduleFixture},
    pricing::{BundleSchedule, ScheduleError},
};

pub mod catalog;

const BUNDLED_CATALOG_YAML: &str = include_str!("../../fixtures/catalog/thinkery.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the catalog and one of its prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Invalid bundle schedule
    #[error("Invalid bundle schedule: {0}")]
    Schedule(#[from] ScheduleError),

    /// A standard guide priced differently from the schedule's base price
    #[error("Guide {id} is priced at {found}, but standard guides cost {expected}")]
    NonStandardPrice {
        /// Offending guide
        id: GuideId,

        /// Base price from the bundle schedule
        expected: String,

        /// Price listed for the guide
        found: String,
    },

    /// Catalog construction error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a named catalog from `<base>/catalog/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the catalog is invalid.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog<'static>, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));

        load_catalog_file(file_path)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a catalog from a YAML file path
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the catalog is invalid.
pub fn load_catalog_file(path: impl Into<PathBuf>) -> Result<Catalog<'static>, FixtureError> {
    let contents = fs::read_to_string(path.into())?;

    parse_catalog(&contents)
}

/// Parse a catalog from YAML
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price or currency is invalid, the schedule is
/// malformed, a standard guide is not priced at the schedule's base price, or two guides share
/// an id.
pub fn parse_catalog(contents: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;
    let currency = catalog::parse_currency(&fixture.currency)?;

    let schedule = match fixture.pricing {
        Some(schedule) => build_schedule(&schedule, currency)?,
        None => BundleSchedule::standard(),
    };

    let mut result = Catalog::with_schedule(currency, schedule);

    for guide_fixture in fixture.guides {
        let item: CatalogItem<'static> = guide_fixture.try_into()?;
        let item_currency = item.price().currency();

        if item_currency != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                item_currency.iso_alpha_code.to_string(),
            ));
        }

        let base_price = result.schedule().base_price();

        if !item.id().is_master() && item.price().to_minor_units() != base_price {
            return Err(FixtureError::NonStandardPrice {
                id: item.id(),
                expected: Money::from_minor(base_price, currency).to_string(),
                found: item.price().to_string(),
            });
        }

        result.insert(item)?;
    }

    Ok(result)
}

/// The storefront's own catalog, compiled into the crate.
///
/// # Errors
///
/// Returns an error if the bundled YAML is invalid.
pub fn bundled_catalog() -> Result<Catalog<'static>, FixtureError> {
    parse_catalog(BUNDLED_CATALOG_YAML)
}

fn build_schedule(
    fixture: &ScheduleFixture,
    currency: &'static rusty_money::iso::Currency,
) -> Result<BundleSchedule, FixtureError> {
    let base_price = minor_in(&fixture.base_price, currency)?;
    let block_price = minor_in(&fixture.block_price, currency)?;

    let remainder_prices = fixture
        .remainder_prices
        .iter()
        .map(|price| minor_in(price, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BundleSchedule::new(
        base_price,
        block_price,
        &remainder_prices,
    )?)
}

fn minor_in(price: &str, currency: &'static rusty_money::iso::Currency) -> Result<i64, FixtureError> {
    let (minor_units, price_currency) = catalog::parse_price(price)?;

    if price_currency == currency {
        Ok(minor_units)
    } else {
        Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            price_currency.iso_alpha_code.to_string(),
        ))
    }
}
