use rust_decimal::Decimal;

use crate::errors::QuoteError;
use crate::models::Side;
use crate::orderbook::{OrderBook, OrderBookEntry};

/// What has been consumed so far while walking one side of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fill {
    /// Amount filled in the denomination the caller asked for
    /// (base currency in direct mode, quote currency in inverse mode).
    pub filled: Decimal,
    /// The other leg of the trade: quote notional in direct mode,
    /// base amount in inverse mode.
    pub counter: Decimal,
}

/// Terminal state of a walk over the levels of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Filled(Fill),
    Insufficient(Fill),
}

fn add(total: Decimal, value: Decimal, what: &'static str) -> Result<Decimal, QuoteError> {
    total.checked_add(value).ok_or(QuoteError::Overflow(what))
}

/// Fills `amount` of base currency, cheapest level first.
///
/// Only fails when a running total leaves the `Decimal` range.
pub fn walk_direct<'a, I>(levels: I, amount: Decimal) -> Result<Traversal, QuoteError>
where
    I: IntoIterator<Item = &'a OrderBookEntry>,
{
    let mut fill = Fill::default();

    for level in levels {
        // filled never exceeds amount, so neither the subtraction nor the sum can overflow
        let take = level.total_size()?.min(amount - fill.filled);
        fill.filled += take;

        let cost = take
            .checked_mul(level.price)
            .ok_or(QuoteError::Overflow("level cost"))?;
        fill.counter = add(fill.counter, cost, "total price")?;

        if fill.filled >= amount {
            return Ok(Traversal::Filled(fill));
        }
    }

    Ok(Traversal::Insufficient(fill))
}

/// Spends (or receives) `notional` of quote currency and accumulates the
/// base currency amount it buys (or sells).
pub fn walk_inverse<'a, I>(levels: I, notional: Decimal) -> Result<Traversal, QuoteError>
where
    I: IntoIterator<Item = &'a OrderBookEntry>,
{
    let mut fill = Fill::default();

    for level in levels {
        let remaining = notional - fill.filled;

        // a level whose notional overflows is larger than any remaining amount
        match level.notional() {
            Ok(level_notional) if level_notional <= remaining => {
                fill.counter = add(fill.counter, level.total_size()?, "base amount")?;
                fill.filled += level_notional;
            }
            _ => {
                // partial level: convert the leftover notional at this level's price
                let base = remaining
                    .checked_div(level.price)
                    .ok_or(QuoteError::Overflow("base amount"))?;
                fill.counter = add(fill.counter, base, "base amount")?;
                fill.filled += remaining;
            }
        }

        if fill.filled >= notional {
            return Ok(Traversal::Filled(fill));
        }
    }

    Ok(Traversal::Insufficient(fill))
}

/// Walks an [`OrderBook`] to price a trade. Holds no state between calls,
/// so every quote reflects the book as it is at call time.
pub struct QuoteGenerator<'a> {
    book: &'a OrderBook,
}

impl<'a> QuoteGenerator<'a> {
    pub fn new(book: &'a OrderBook) -> Self {
        Self { book }
    }

    pub fn quote_buy(&self, amount: Decimal) -> Result<(Decimal, Decimal), QuoteError> {
        self.quote(amount, Side::Buy)
    }

    pub fn quote_sell(&self, amount: Decimal) -> Result<(Decimal, Decimal), QuoteError> {
        self.quote(amount, Side::Sell)
    }

    /// Prices `amount` on the side of the book that `side` consumes.
    ///
    /// For a direct book `amount` is in base currency and the result is
    /// `(total_price, total_filled)`. For an inversed book `amount` is a
    /// quote currency notional and the result is
    /// `(total_base_amount, total_notional)`.
    pub fn quote(&self, amount: Decimal, side: Side) -> Result<(Decimal, Decimal), QuoteError> {
        if amount <= Decimal::ZERO {
            return Err(QuoteError::InvalidAmount(amount));
        }

        let levels = match side {
            Side::Buy => self.book.asks_sorted(),
            Side::Sell => self.book.bids_sorted(),
        };

        let traversal = if self.book.is_inversed() {
            walk_inverse(levels, amount)?
        } else {
            walk_direct(levels, amount)?
        };

        match traversal {
            Traversal::Filled(fill) => Ok((fill.counter, fill.filled)),
            Traversal::Insufficient(fill) => Err(QuoteError::InsufficientLiquidity {
                requested: amount,
                available: fill.filled,
            }),
        }
    }
}
