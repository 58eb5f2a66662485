//! Thinkery prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    assistant::{
        AssistantError, ChatBackend, ChatMessage, ChatRole, ChatSession, Concierge,
        CoverGenerator, CoverJob, CoverUpdate, CoverWarmup, GeminiClient, GeminiConfig,
        WarmupDelays, WarmupSummary,
    },
    cart::{AddOutcome, CartStore},
    catalog::{Catalog, CatalogError, CatalogItem, GuideId},
    checkout::{CheckoutError, CustomerDetails, Download, Order},
    fixtures::{Fixture, FixtureError},
    pricing::{BundleSchedule, PriceQuote, QuoteMessage, ScheduleError, quote},
    receipt::{Receipt, ReceiptError},
};
