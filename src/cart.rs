//! Cart
//!
//! The cart owns the ordered, id-unique list of guides a customer intends to buy and the quote
//! for exactly those lines. Every mutation recomputes the quote before returning, so a caller
//! can never observe a quote from a half-updated cart.

use rustc_hash::FxHashSet;
use rusty_money::iso::Currency;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, CatalogItem, GuideId},
    pricing::{self, BundleSchedule, PriceQuote},
};

/// Result of adding a guide to the cart. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The guide was appended.
    Added,

    /// The guide was already in the cart; nothing changed.
    AlreadyInCart,

    /// The guide is priced in another currency; nothing changed.
    CurrencyMismatch,
}

/// Cart
#[derive(Debug)]
pub struct CartStore<'a> {
    lines: Vec<CatalogItem<'a>>,
    ids: FxHashSet<GuideId>,
    currency: &'static Currency,
    schedule: BundleSchedule,
    quote: PriceQuote<'a>,
    publisher: watch::Sender<PriceQuote<'a>>,
}

impl<'a> CartStore<'a> {
    /// Create an empty cart priced with the standard bundle schedule.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_schedule(currency, BundleSchedule::standard())
    }

    /// Create an empty cart with a custom bundle schedule.
    pub fn with_schedule(currency: &'static Currency, schedule: BundleSchedule) -> Self {
        let quote = PriceQuote::empty(currency);
        let (publisher, _receiver) = watch::channel(quote.clone());

        CartStore {
            lines: Vec::new(),
            ids: FxHashSet::default(),
            currency,
            schedule,
            quote,
            publisher,
        }
    }

    /// Create an empty cart using the catalog's currency and bundle schedule.
    pub fn for_catalog(catalog: &Catalog<'_>) -> Self {
        Self::with_schedule(catalog.currency(), catalog.schedule().clone())
    }

    /// Add a guide to the end of the cart, unless a guide with the same id is already there.
    pub fn add(&mut self, item: CatalogItem<'a>) -> AddOutcome {
        let id = item.id();

        if self.ids.contains(&id) {
            debug!(guide = %id, "guide already in cart");

            return AddOutcome::AlreadyInCart;
        }

        if item.price().currency() != self.currency {
            warn!(
                guide = %id,
                item_currency = item.price().currency().iso_alpha_code,
                cart_currency = self.currency.iso_alpha_code,
                "ignoring guide priced in another currency"
            );

            return AddOutcome::CurrencyMismatch;
        }

        self.ids.insert(id);
        self.lines.push(item);
        self.recompute();

        debug!(guide = %id, lines = self.lines.len(), "guide added to cart");

        AddOutcome::Added
    }

    /// Remove the guide with this id. Returns false when it was not in the cart.
    pub fn remove(&mut self, id: GuideId) -> bool {
        if !self.ids.remove(&id) {
            debug!(guide = %id, "guide not in cart");

            return false;
        }

        self.lines.retain(|line| line.id() != id);
        self.recompute();

        debug!(guide = %id, lines = self.lines.len(), "guide removed from cart");

        true
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }

        self.lines.clear();
        self.ids.clear();
        self.recompute();

        debug!("cart cleared");
    }

    /// Quote for the current lines.
    pub fn quote(&self) -> &PriceQuote<'a> {
        &self.quote
    }

    /// Watch every quote the cart publishes, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<PriceQuote<'a>> {
        self.publisher.subscribe()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CatalogItem<'a>] {
        &self.lines
    }

    /// Check if a guide is in the cart.
    pub fn contains(&self, id: GuideId) -> bool {
        self.ids.contains(&id)
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Bundle schedule the cart is priced with.
    pub fn schedule(&self) -> &BundleSchedule {
        &self.schedule
    }

    fn recompute(&mut self) {
        self.quote = pricing::quote(&self.lines, &self.schedule, self.currency);
        self.publisher.send_replace(self.quote.clone());
    }
}
