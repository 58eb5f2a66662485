//! Bundle Schedule
//!
//! Standard guides are priced by count, not by their nominal price. Complete blocks cost a flat
//! block price and the leftover count is looked up in a small remainder table, so the schedule
//! repeats with a period equal to the block size.

use smallvec::{SmallVec, smallvec};
use thiserror::Error;

/// Errors raised when a bundle schedule is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The remainder table was empty, so there is no block size.
    #[error("remainder table must have at least one entry")]
    EmptyBlock,

    /// A price was negative (minor units).
    #[error("price {0} is negative")]
    NegativePrice(i64),

    /// The price for zero leftover items was not zero.
    #[error("remainder price for 0 items must be zero, got {0}")]
    NonZeroEmptyRemainder(i64),

    /// A remainder price was cheaper than the one for fewer items.
    #[error("remainder price for {count} items ({price}) is lower than for {previous} items")]
    DecreasingRemainder {
        /// Leftover count with the offending price
        count: usize,
        /// Offending price in minor units
        price: i64,
        /// Leftover count with the higher price
        previous: usize,
    },

    /// A remainder price was more expensive than a complete block.
    #[error("remainder price for {count} items ({price}) exceeds the block price ({block_price})")]
    RemainderAboveBlock {
        /// Leftover count with the offending price
        count: usize,
        /// Offending price in minor units
        price: i64,
        /// Block price in minor units
        block_price: i64,
    },
}

/// Count-based tier pricing for standard guides. All amounts are minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSchedule {
    base_price: i64,
    block_price: i64,
    remainder_prices: SmallVec<[i64; 8]>,
}

impl BundleSchedule {
    /// Create a schedule from a reference unit price, a flat price per complete block and the
    /// price of each leftover count. The block size is the length of the remainder table.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] if the table is empty, any price is negative, the entry for
    /// zero leftovers is not zero, the table decreases, or a leftover costs more than a block.
    pub fn new(
        base_price: i64,
        block_price: i64,
        remainder_prices: &[i64],
    ) -> Result<Self, ScheduleError> {
        let remainder_prices: SmallVec<[i64; 8]> = SmallVec::from_slice(remainder_prices);

        let Some(&first) = remainder_prices.first() else {
            return Err(ScheduleError::EmptyBlock);
        };

        if let Some(&negative) = [base_price, block_price]
            .iter()
            .chain(remainder_prices.iter())
            .find(|price| **price < 0)
        {
            return Err(ScheduleError::NegativePrice(negative));
        }

        if first != 0 {
            return Err(ScheduleError::NonZeroEmptyRemainder(first));
        }

        for (previous, (lower, higher)) in remainder_prices
            .iter()
            .zip(remainder_prices.iter().skip(1))
            .enumerate()
        {
            if higher < lower {
                return Err(ScheduleError::DecreasingRemainder {
                    count: previous + 1,
                    price: *higher,
                    previous,
                });
            }
        }

        if let Some((count, &price)) = remainder_prices
            .iter()
            .enumerate()
            .find(|(_, price)| **price > block_price)
        {
            return Err(ScheduleError::RemainderAboveBlock {
                count,
                price,
                block_price,
            });
        }

        Ok(Self {
            base_price,
            block_price,
            remainder_prices,
        })
    }

    /// The storefront schedule: $10 reference price, 1 for $10, 2 for $18, 3 for $25,
    /// 4 for $40 and every complete five for $40.
    pub fn standard() -> Self {
        Self {
            base_price: 1000,
            block_price: 4000,
            remainder_prices: smallvec![0, 1000, 1800, 2500, 4000],
        }
    }

    /// Reference unit price used for the pre-discount subtotal.
    pub fn base_price(&self) -> i64 {
        self.base_price
    }

    /// Flat price of one complete block.
    pub fn block_price(&self) -> i64 {
        self.block_price
    }

    /// Number of guides in a complete block.
    pub fn block_size(&self) -> usize {
        self.remainder_prices.len()
    }

    /// Remainder price table, indexed by leftover count.
    pub fn remainder_prices(&self) -> &[i64] {
        &self.remainder_prices
    }

    /// Pre-discount price of `count` standard guides.
    pub fn subtotal(&self, count: usize) -> i64 {
        self.base_price.saturating_mul(saturating_i64(count))
    }

    /// Tiered price of `count` standard guides.
    pub fn total(&self, count: usize) -> i64 {
        if count == 0 {
            return 0;
        }

        let block_size = self.block_size();
        let blocks = saturating_i64(count / block_size);
        let leftover = self
            .remainder_prices
            .get(count % block_size)
            .copied()
            .unwrap_or_default();

        self.block_price.saturating_mul(blocks).saturating_add(leftover)
    }

    /// Bundle discount on `count` standard guides.
    pub fn discount(&self, count: usize) -> i64 {
        self.subtotal(count).saturating_sub(self.total(count))
    }

    /// What one more standard guide would add to the tiered price of `count` guides.
    pub fn marginal_price(&self, count: usize) -> i64 {
        self.total(count.saturating_add(1))
            .saturating_sub(self.total(count))
    }
}

impl Default for BundleSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
