//! Thinkery
//!
//! Storefront core for Father Dust's Thinkery, a small shop selling downloadable guides. The
//! heart of the crate is bundle pricing: standard guides get cheaper the more of them are in the
//! cart, while the master guide is always charged at its own price.

pub mod assistant;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod receipt;
