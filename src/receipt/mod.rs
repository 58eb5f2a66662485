//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::CartStore, catalog::CatalogItem, checkout::Order, pricing::PriceQuote};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Order summary for a set of cart lines and the quote they were priced at.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'r, 'a> {
    lines: &'r [CatalogItem<'a>],
    quote: &'r PriceQuote<'a>,
}

impl<'r, 'a> Receipt<'r, 'a> {
    /// Create a receipt for the given lines and quote.
    pub fn new(lines: &'r [CatalogItem<'a>], quote: &'r PriceQuote<'a>) -> Self {
        Self { lines, quote }
    }

    /// Receipt for what is currently in the cart.
    pub fn for_cart(cart: &'r CartStore<'a>) -> Self {
        Self::new(cart.lines(), cart.quote())
    }

    /// Receipt for a placed order.
    pub fn for_order(order: &'r Order<'a>) -> Self {
        Self::new(order.lines(), order.quote())
    }

    /// Lines on the receipt.
    pub fn lines(&self) -> &'r [CatalogItem<'a>] {
        self.lines
    }

    /// Quote the receipt summarises.
    pub fn quote(&self) -> &'r PriceQuote<'a> {
        self.quote
    }

    /// Writes the receipt table, totals and quote message.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.lines.is_empty() {
            return writeln!(out, "\nYour cart is empty.\n").map_err(|_err| ReceiptError::IO);
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Guide", "Pages", "Price"]);

        for (idx, item) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                guide_label(item),
                page_label(item),
                format!("{}", item.price()),
            ]);
        }

        let discount_row = if self.quote.has_savings() {
            builder.push_record([
                String::new(),
                "Bundle Discount".to_string(),
                String::new(),
                format!("-{}", self.quote.savings()),
            ]);

            Some(self.lines.len() + 1)
        } else {
            None
        };

        write_table(&mut out, builder, discount_row)?;
        write_summary(&mut out, self.quote)?;

        if !self.quote.message().is_empty() {
            writeln!(out, "{}\n", self.quote.message()).map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }
}

fn guide_label(item: &CatalogItem<'_>) -> String {
    if item.emoji().is_empty() {
        item.title().to_string()
    } else {
        format!("{} {}", item.emoji(), item.title())
    }
}

fn page_label(item: &CatalogItem<'_>) -> String {
    match item.pages() {
        0 => String::new(),
        pages => pages.to_string(),
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    discount_row: Option<usize>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    if let Some(row) = discount_row {
        theme.insert_horizontal_line(row, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..4), Alignment::right());

    if let Some(row) = discount_row {
        table.modify((row, 3), Color::FG_GREEN);
    }

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, quote: &PriceQuote<'_>) -> Result<(), ReceiptError> {
    let savings_points = percent_points(quote.savings_percent());

    let rows = [
        ("Subtotal:", quote.subtotal().to_string()),
        ("Total:", quote.total().to_string()),
        (
            "Savings:",
            format!("({savings_points:.2}%) {}", quote.savings()),
        ),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in rows {
        let line = format!(" {label:>label_width$}  {value:>value_width$}");

        let written = if label == "Total:" {
            writeln!(out, "\x1b[1m{line}\x1b[0m")
        } else {
            writeln!(out, "{line}")
        };

        written.map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
