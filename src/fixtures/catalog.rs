//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    catalog::{CatalogItem, GuideId},
    fixtures::FixtureError,
};

/// Wrapper for a catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO currency code every price must use (e.g. "USD")
    pub currency: String,

    /// Optional bundle schedule; the standard schedule is used when omitted
    #[serde(default)]
    pub pricing: Option<ScheduleFixture>,

    /// Guides in display order
    pub guides: Vec<GuideFixture>,
}

/// Bundle Schedule Fixture
#[derive(Debug, Deserialize)]
pub struct ScheduleFixture {
    /// Reference unit price (e.g., "10.00 USD")
    pub base_price: String,

    /// Price of one complete block (e.g., "40.00 USD")
    pub block_price: String,

    /// Price of each leftover count, starting with zero leftovers
    pub remainder_prices: Vec<String>,
}

/// Guide Fixture
#[derive(Debug, Deserialize)]
pub struct GuideFixture {
    /// Guide id; 0 is the master guide
    pub id: u32,

    /// Guide title
    pub title: String,

    /// Guide description
    #[serde(default)]
    pub description: String,

    /// Guide price (e.g., "10.00 USD")
    pub price: String,

    /// Page count
    #[serde(default)]
    pub pages: u32,

    /// Emoji shown next to the title
    #[serde(default)]
    pub emoji: String,

    /// Keywords for cover prompts and placeholder artwork
    #[serde(default)]
    pub image_keywords: Option<String>,
}

impl TryFrom<GuideFixture> for CatalogItem<'_> {
    type Error = FixtureError;

    fn try_from(fixture: GuideFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        let mut item = CatalogItem::new(
            GuideId::new(fixture.id),
            fixture.title,
            Money::from_minor(minor_units, currency),
        )
        .with_description(fixture.description)
        .with_pages(fixture.pages)
        .with_emoji(fixture.emoji);

        if let Some(keywords) = fixture.image_keywords {
            item = item.with_image_keywords(keywords);
        }

        Ok(item)
    }
}

/// Parse price string (e.g., "2.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, parse_currency(currency_code)?))
}

/// Parse an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes the storefront does not sell in.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
