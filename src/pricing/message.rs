//! Quote Messages

use std::fmt;

use rusty_money::{Money, iso::Currency};

/// Upsell or celebration message attached to a price quote.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteMessage<'a> {
    /// Empty cart, nothing to say.
    None,

    /// The master guide is in the cart alongside standard guides.
    MasterWithBundle,

    /// The master guide is the only thing in the cart.
    LibraryUnlocked,

    /// One more standard guide would only add this much.
    AddOneMore(Money<'a, Currency>),

    /// One more standard guide would be free; carries the position of that guide (e.g. 5).
    NextOneFree(usize),

    /// The standard guides saved this much through bundle pricing.
    BundleSavings(Money<'a, Currency>),
}

impl QuoteMessage<'_> {
    /// Returns true when there is nothing to display.
    pub fn is_empty(&self) -> bool {
        matches!(self, QuoteMessage::None)
    }
}

impl fmt::Display for QuoteMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteMessage::None => Ok(()),
            QuoteMessage::MasterWithBundle => {
                f.write_str("Master Guide added! Bundle discounts apply to other guides.")
            }
            QuoteMessage::LibraryUnlocked => f.write_str("You've unlocked the entire library! 💎"),
            QuoteMessage::AddOneMore(price) => {
                write!(f, "Add 1 more for just {}!", WholeAmount(price))
            }
            QuoteMessage::NextOneFree(position) => {
                write!(f, "Add 1 more & get the {} for FREE!", Ordinal(*position))
            }
            QuoteMessage::BundleSavings(amount) => {
                write!(f, "🎉 You saved {amount} with bundle deals!")
            }
        }
    }
}

/// Money without its fraction digits when they are all zero: `$8` rather than `$8.00`.
struct WholeAmount<'m, 'a>(&'m Money<'a, Currency>);

impl fmt::Display for WholeAmount<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.to_string();

        if !self.0.amount().fract().is_zero() {
            return f.write_str(&rendered);
        }

        let exponent = usize::try_from(self.0.currency().exponent).unwrap_or(0);

        match strip_fraction(&rendered, exponent) {
            Some(whole) => f.write_str(&whole),
            None => f.write_str(&rendered),
        }
    }
}

/// Drops the separator and `exponent` trailing zero digits from a rendered amount.
fn strip_fraction(rendered: &str, exponent: usize) -> Option<String> {
    if exponent == 0 {
        return None;
    }

    let end = rendered.rfind(|ch: char| ch.is_ascii_digit())?;
    let digits = rendered.get(..=end)?;
    let split = digits.len().checked_sub(exponent)?;
    let fraction = digits.get(split..)?;

    if !fraction.chars().all(|ch| ch == '0') {
        return None;
    }

    let whole = digits.get(..split)?.strip_suffix(|ch: char| !ch.is_ascii_digit())?;

    if !whole.ends_with(|ch: char| ch.is_ascii_digit()) {
        return None;
    }

    Some(format!("{whole}{}", rendered.get(end + 1..)?))
}

/// English ordinal rendering (1st, 2nd, 3rd, 4th, 11th, 21st).
struct Ordinal(usize);

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match (self.0 % 10, self.0 % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };

        write!(f, "{}{suffix}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    #[test]
    fn none_renders_empty() {
        assert_eq!(QuoteMessage::None.to_string(), "");
        assert!(QuoteMessage::None.is_empty());
    }

    #[test]
    fn master_messages_render_fixed_text() {
        assert_eq!(
            QuoteMessage::MasterWithBundle.to_string(),
            "Master Guide added! Bundle discounts apply to other guides."
        );

        assert_eq!(
            QuoteMessage::LibraryUnlocked.to_string(),
            "You've unlocked the entire library! 💎"
        );
    }

    #[test]
    fn next_one_free_uses_ordinal_position() {
        assert_eq!(
            QuoteMessage::NextOneFree(5).to_string(),
            "Add 1 more & get the 5th for FREE!"
        );
    }

    #[test]
    fn money_messages_include_amount() {
        let upsell = QuoteMessage::AddOneMore(Money::from_minor(800, USD)).to_string();
        let savings = QuoteMessage::BundleSavings(Money::from_minor(1000, USD)).to_string();

        assert_eq!(upsell, "Add 1 more for just $8!");
        assert!(savings.contains("You saved $10"), "{savings}");
        assert!(!QuoteMessage::BundleSavings(Money::from_minor(1000, USD)).is_empty());
    }

    #[test]
    fn upsell_keeps_cents_when_present() {
        let upsell = QuoteMessage::AddOneMore(Money::from_minor(850, USD)).to_string();

        assert_eq!(upsell, "Add 1 more for just $8.50!");
    }

    #[test]
    fn strip_fraction_handles_separators() {
        assert_eq!(strip_fraction("$1,500.00", 2).as_deref(), Some("$1,500"));
        assert_eq!(strip_fraction("8,00 €", 2).as_deref(), Some("8 €"));
        assert_eq!(strip_fraction("¥1,000", 0), None);
        assert_eq!(strip_fraction("$8.50", 2), None);
    }

    #[test]
    fn ordinal_suffixes() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111]
            .into_iter()
            .map(|n| Ordinal(n).to_string())
            .collect();

        assert_eq!(
            rendered,
            [
                "1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st",
                "111th"
            ]
        );
    }
}
