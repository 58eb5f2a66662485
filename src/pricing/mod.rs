//! Pricing
//!
//! Turns a cart into a [`PriceQuote`]. The master guide is charged at its own price and every
//! other guide is priced by count through a [`BundleSchedule`]. Quoting is pure: the same lines
//! always produce the same quote, regardless of their order.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::catalog::CatalogItem;

pub mod message;
pub mod schedule;

pub use message::QuoteMessage;
pub use schedule::{BundleSchedule, ScheduleError};

/// Subtotal, total, savings and message for one cart state.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote<'a> {
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
    savings: Money<'a, Currency>,
    message: QuoteMessage<'a>,
}

impl<'a> PriceQuote<'a> {
    /// Quote for an empty cart: everything zero, no message.
    pub fn empty(currency: &'static Currency) -> Self {
        Self {
            subtotal: Money::from_minor(0, currency),
            total: Money::from_minor(0, currency),
            savings: Money::from_minor(0, currency),
            message: QuoteMessage::None,
        }
    }

    /// Sum of the pre-discount prices.
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// Amount due after bundle pricing.
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Difference between subtotal and total.
    pub fn savings(&self) -> &Money<'a, Currency> {
        &self.savings
    }

    /// Upsell or celebration message.
    pub fn message(&self) -> &QuoteMessage<'a> {
        &self.message
    }

    /// Returns true when any bundle discount applies.
    pub fn has_savings(&self) -> bool {
        self.savings.to_minor_units() > 0
    }

    /// Savings as a fraction of the subtotal; zero for an empty cart.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        let savings_dec = Decimal::from_i64(self.savings.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Percentage::from(savings_dec / subtotal_dec)
    }
}

/// Cart lines split into the master guide and the count of standard guides.
#[derive(Debug, Clone, Copy)]
struct Partition<'l, 'a> {
    master: Option<&'l CatalogItem<'a>>,
    standard_count: usize,
}

fn partition<'l, 'a>(items: &'l [CatalogItem<'a>]) -> Partition<'l, 'a> {
    let master = items.iter().find(|item| item.id().is_master());
    let standard_count = items.iter().filter(|item| !item.id().is_master()).count();

    Partition {
        master,
        standard_count,
    }
}

/// Price a cart.
///
/// Lines are expected to be unique by id, as the cart guarantees. Standard guides contribute the
/// schedule's reference price to the subtotal and their tiered price to the total; the master
/// guide contributes its own price to both.
pub fn quote<'a>(
    items: &[CatalogItem<'a>],
    schedule: &BundleSchedule,
    currency: &'static Currency,
) -> PriceQuote<'a> {
    if items.is_empty() {
        return PriceQuote::empty(currency);
    }

    let Partition {
        master,
        standard_count,
    } = partition(items);

    let master_minor = master.map_or(0, |item| item.price().to_minor_units());

    let standard_subtotal = schedule.subtotal(standard_count);
    let standard_total = schedule.total(standard_count);

    let subtotal = standard_subtotal.saturating_add(master_minor);
    let total = standard_total.saturating_add(master_minor);

    PriceQuote {
        subtotal: Money::from_minor(subtotal, currency),
        total: Money::from_minor(total, currency),
        savings: Money::from_minor(subtotal.saturating_sub(total), currency),
        message: select_message(master.is_some(), standard_count, schedule, currency),
    }
}

fn select_message<'a>(
    has_master: bool,
    standard_count: usize,
    schedule: &BundleSchedule,
    currency: &'static Currency,
) -> QuoteMessage<'a> {
    match (has_master, standard_count) {
        (true, 0) => QuoteMessage::LibraryUnlocked,
        (true, _) => QuoteMessage::MasterWithBundle,
        (false, 0) => QuoteMessage::None,
        (false, count) if count < schedule.block_size() => {
            match schedule.marginal_price(count) {
                0 => QuoteMessage::NextOneFree(count + 1),
                marginal => QuoteMessage::AddOneMore(Money::from_minor(marginal, currency)),
            }
        }
        (false, count) => match schedule.discount(count) {
            0 => QuoteMessage::None,
            discount => QuoteMessage::BundleSavings(Money::from_minor(discount, currency)),
        },
    }
}
