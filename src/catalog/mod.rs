//! Catalog

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::BundleSchedule;

pub mod keywords;

/// Identity of a guide. Id `0` is reserved for the master guide.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GuideId(u32);

impl GuideId {
    /// The all-inclusive master guide.
    pub const MASTER: GuideId = GuideId(0);

    /// Wrap a raw id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw id.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the master guide.
    pub const fn is_master(self) -> bool {
        self.0 == Self::MASTER.0
    }
}

impl From<u32> for GuideId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for GuideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable guide.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem<'a> {
    id: GuideId,
    title: String,
    description: String,
    price: Money<'a, Currency>,
    pages: u32,
    emoji: String,
    image_keywords: Option<String>,
    artwork_url: Option<String>,
}

impl<'a> CatalogItem<'a> {
    /// Creates a guide with a title and price and no display metadata.
    pub fn new(id: GuideId, title: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            price,
            pages: 0,
            emoji: String::new(),
            image_keywords: None,
            artwork_url: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the page count.
    #[must_use]
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    /// Sets the emoji shown next to the title.
    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    /// Sets the keywords used for cover prompts and placeholder artwork.
    #[must_use]
    pub fn with_image_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.image_keywords = Some(keywords.into());
        self
    }

    /// Sets resolved cover artwork.
    #[must_use]
    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Returns the guide id
    pub fn id(&self) -> GuideId {
        self.id
    }

    /// Returns the title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the nominal price of the guide
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the page count
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Returns the emoji
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Returns the image keywords, if any were given
    pub fn image_keywords(&self) -> Option<&str> {
        self.image_keywords.as_deref()
    }

    /// Returns the resolved artwork, if any
    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    /// Prompt theme for cover generation: the keywords, or the title when there are none.
    pub fn cover_theme(&self) -> &str {
        self.image_keywords.as_deref().unwrap_or(&self.title)
    }

    /// Resolved artwork, or a keyword placeholder image of the given size.
    pub fn artwork_or_placeholder(&self, width: u32, height: u32) -> String {
        if let Some(url) = &self.artwork_url {
            return url.clone();
        }

        let keywords = self.image_keywords.clone().unwrap_or_else(|| {
            keywords::placeholder_keywords(&self.title, keywords::CARD_KEYWORD_LIMIT)
        });

        keywords::placeholder_url(&keywords, width, height)
    }
}

/// Errors related to catalog construction and updates.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Two guides share an id.
    #[error("Guide {0} is already in the catalog")]
    DuplicateGuide(GuideId),

    /// A guide's currency differs from the catalog currency (id, guide currency, catalog currency).
    #[error("Guide {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(GuideId, &'static str, &'static str),

    /// No guide with this id exists.
    #[error("Guide {0} not found")]
    GuideNotFound(GuideId),
}

/// The seller's catalog, in display order.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    items: Vec<CatalogItem<'a>>,
    index: FxHashMap<GuideId, usize>,
    currency: &'static Currency,
    schedule: BundleSchedule,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced with the standard bundle schedule.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_schedule(currency, BundleSchedule::standard())
    }

    /// Create an empty catalog with a custom bundle schedule.
    pub fn with_schedule(currency: &'static Currency, schedule: BundleSchedule) -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
            currency,
            schedule,
        }
    }

    /// Create a catalog from a list of guides.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids or currency mismatches.
    pub fn with_items(
        items: impl IntoIterator<Item = CatalogItem<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        items
            .into_iter()
            .try_for_each(|item| catalog.insert(item))?;

        Ok(catalog)
    }

    /// Append a guide.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateGuide`] if the id is taken, or
    /// [`CatalogError::CurrencyMismatch`] if the guide is priced in another currency.
    pub fn insert(&mut self, item: CatalogItem<'a>) -> Result<(), CatalogError> {
        if self.index.contains_key(&item.id()) {
            return Err(CatalogError::DuplicateGuide(item.id()));
        }

        let item_currency = item.price().currency();

        if item_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                item.id(),
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        self.index.insert(item.id(), self.items.len());
        self.items.push(item);

        Ok(())
    }

    /// Look up a guide by id.
    pub fn get(&self, id: GuideId) -> Option<&CatalogItem<'a>> {
        self.index.get(&id).and_then(|idx| self.items.get(*idx))
    }

    /// The master guide, if the catalog sells one.
    pub fn master(&self) -> Option<&CatalogItem<'a>> {
        self.get(GuideId::MASTER)
    }

    /// Attach resolved artwork to a guide.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GuideNotFound`] if the id is unknown.
    pub fn set_artwork(&mut self, id: GuideId, url: impl Into<String>) -> Result<(), CatalogError> {
        let item = self
            .index
            .get(&id)
            .and_then(|idx| self.items.get_mut(*idx))
            .ok_or(CatalogError::GuideNotFound(id))?;

        item.artwork_url = Some(url.into());

        Ok(())
    }

    /// Iterate over the guides in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem<'a>> {
        self.items.iter()
    }

    /// Get the number of guides.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Bundle schedule the catalog is sold under.
    pub fn schedule(&self) -> &BundleSchedule {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn guides<'a>() -> [CatalogItem<'a>; 3] {
        [
            CatalogItem::new(GuideId::MASTER, "Master Guide", Money::from_minor(19900, USD)),
            CatalogItem::new(GuideId::new(1), "Dark Psychology", Money::from_minor(1000, USD)),
            CatalogItem::new(GuideId::new(2), "How to Win Friends", Money::from_minor(1000, USD)),
        ]
    }

    #[test]
    fn guide_id_master() {
        assert!(GuideId::MASTER.is_master());
        assert!(GuideId::new(0).is_master());
        assert!(!GuideId::new(7).is_master());
        assert_eq!(GuideId::from(7).get(), 7);
        assert_eq!(GuideId::new(12).to_string(), "12");
    }

    #[test]
    fn with_items_keeps_order_and_indexes() -> TestResult {
        let catalog = Catalog::with_items(guides(), USD)?;

        let ids: Vec<u32> = catalog.iter().map(|item| item.id().get()).collect();

        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get(GuideId::new(2)).map(CatalogItem::title),
            Some("How to Win Friends")
        );
        assert_eq!(
            catalog.master().map(|item| item.price().to_minor_units()),
            Some(19900)
        );
        assert!(catalog.get(GuideId::new(99)).is_none());

        Ok(())
    }

    #[test]
    fn insert_rejects_duplicate_ids() -> TestResult {
        let mut catalog = Catalog::with_items(guides(), USD)?;

        let result = catalog.insert(CatalogItem::new(
            GuideId::new(1),
            "Imposter",
            Money::from_minor(1000, USD),
        ));

        assert_eq!(result, Err(CatalogError::DuplicateGuide(GuideId::new(1))));
        assert_eq!(catalog.len(), 3);

        Ok(())
    }

    #[test]
    fn insert_rejects_other_currencies() {
        let mut catalog = Catalog::new(USD);

        let result = catalog.insert(CatalogItem::new(
            GuideId::new(1),
            "Pounds",
            Money::from_minor(1000, GBP),
        ));

        assert_eq!(
            result,
            Err(CatalogError::CurrencyMismatch(
                GuideId::new(1),
                GBP.iso_alpha_code,
                USD.iso_alpha_code
            ))
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn set_artwork_updates_single_guide() -> TestResult {
        let mut catalog = Catalog::with_items(guides(), USD)?;

        catalog.set_artwork(GuideId::new(1), "data:image/jpeg;base64,AAAA")?;

        assert_eq!(
            catalog.get(GuideId::new(1)).and_then(CatalogItem::artwork_url),
            Some("data:image/jpeg;base64,AAAA")
        );
        assert_eq!(
            catalog.get(GuideId::new(2)).and_then(CatalogItem::artwork_url),
            None
        );

        Ok(())
    }

    #[test]
    fn set_artwork_unknown_guide_errors() -> TestResult {
        let mut catalog = Catalog::with_items(guides(), USD)?;

        let result = catalog.set_artwork(GuideId::new(42), "url");

        assert_eq!(result, Err(CatalogError::GuideNotFound(GuideId::new(42))));

        Ok(())
    }

    #[test]
    fn cover_theme_prefers_keywords() {
        let plain = CatalogItem::new(GuideId::new(3), "Publishing", Money::from_minor(1000, USD));
        let tagged = plain.clone().with_image_keywords("book,press");

        assert_eq!(plain.cover_theme(), "Publishing");
        assert_eq!(tagged.cover_theme(), "book,press");
    }

    #[test]
    fn artwork_or_placeholder_prefers_resolved_artwork() {
        let item = CatalogItem::new(
            GuideId::new(4),
            "How to Stop Your Baby from Crying at Night",
            Money::from_minor(1000, USD),
        );

        assert_eq!(
            item.artwork_or_placeholder(400, 300),
            "https://source.unsplash.com/400x300/?stop,baby,crying"
        );

        let keyworded = item.clone().with_image_keywords("baby,moon");

        assert_eq!(
            keyworded.artwork_or_placeholder(100, 100),
            "https://source.unsplash.com/100x100/?baby,moon"
        );

        let resolved = keyworded.with_artwork_url("https://img/1.jpg");

        assert_eq!(resolved.artwork_or_placeholder(100, 100), "https://img/1.jpg");
    }

    #[test]
    fn builder_sets_display_metadata() {
        let item = CatalogItem::new(GuideId::new(5), "Habits", Money::from_minor(1000, USD))
            .with_description("Build better habits.")
            .with_pages(10)
            .with_emoji("🔄");

        assert_eq!(item.description(), "Build better habits.");
        assert_eq!(item.pages(), 10);
        assert_eq!(item.emoji(), "🔄");
        assert_eq!(item.image_keywords(), None);
    }
}
