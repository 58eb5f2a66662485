//! Checkout
//!
//! A simulated checkout: it validates the customer's details, snapshots the cart into an
//! [`Order`] and clears the cart. No payment is taken.

use thiserror::Error;
use tracing::info;

use crate::{cart::CartStore, catalog::CatalogItem, pricing::PriceQuote};

/// Shop name used in download payloads.
pub const STORE_NAME: &str = "Father Dust's Thinkery";

/// Errors that stop a checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The customer name was blank.
    #[error("customer name is required")]
    MissingName,

    /// The email address is not of the form `name@domain.tld`.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// There was nothing to buy.
    #[error("cart is empty")]
    EmptyCart,
}

/// Customer details collected by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,

    /// Email address the confirmation goes to
    pub email: String,
}

impl CustomerDetails {
    /// Create customer details.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Check the details the way the checkout form does.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingName`] for a blank name, or
    /// [`CheckoutError::InvalidEmail`] when the email is blank or malformed.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }

        if !is_valid_email(&self.email) {
            return Err(CheckoutError::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }
}

/// Returns true for `local@domain.tld` shaped addresses: one `@`, no whitespace, and a dot in
/// the domain with text on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len())
}

/// A completed, simulated purchase.
#[derive(Debug, Clone)]
pub struct Order<'a> {
    customer: CustomerDetails,
    lines: Vec<CatalogItem<'a>>,
    quote: PriceQuote<'a>,
}

impl<'a> Order<'a> {
    /// Who bought the guides.
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Purchased guides in cart order.
    pub fn lines(&self) -> &[CatalogItem<'a>] {
        &self.lines
    }

    /// Quote the order was paid at.
    pub fn quote(&self) -> &PriceQuote<'a> {
        &self.quote
    }

    /// Confirmation text shown once the order is placed.
    pub fn confirmation(&self) -> String {
        format!(
            "Thank you, {}! Your guides are ready for download.\nA confirmation has been sent to {}.",
            self.customer.name.trim(),
            self.customer.email
        )
    }

    /// One download per purchased guide.
    pub fn downloads(&self) -> Vec<Download> {
        self.lines.iter().map(Download::for_guide).collect()
    }
}

/// A file handed to the customer after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name
    pub file_name: String,

    /// File contents
    pub contents: String,
}

impl Download {
    /// Build the download for one guide.
    pub fn for_guide(item: &CatalogItem<'_>) -> Self {
        let stem: String = item
            .title()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        Self {
            file_name: format!("{stem}.txt"),
            contents: format!(
                "Thank you for purchasing \"{}\" from {STORE_NAME}.\n\nThis is your downloaded guide. In a real scenario, this file would contain the full PDF content.",
                item.title()
            ),
        }
    }
}

/// Place a simulated order for everything in the cart and empty the cart.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the customer details are invalid or the cart is empty. The
/// cart is left untouched on error.
pub fn complete<'a>(
    cart: &mut CartStore<'a>,
    customer: CustomerDetails,
) -> Result<Order<'a>, CheckoutError> {
    customer.validate()?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order = Order {
        customer,
        lines: cart.lines().to_vec(),
        quote: cart.quote().clone(),
    };

    cart.clear();

    info!(
        guides = order.lines.len(),
        total = %order.quote.total(),
        "order placed"
    );

    Ok(order)
}
