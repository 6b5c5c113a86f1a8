use rust_decimal::Decimal;

use crate::errors::QuoteError;
use crate::models::BookSnapshot;

/// One aggregated price level: `num_orders` identical orders of `size` at `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBookEntry {
    pub price: Decimal,
    pub size: Decimal,
    pub num_orders: u64,
}

impl OrderBookEntry {
    pub const fn new(price: Decimal, size: Decimal, num_orders: u64) -> Self {
        Self {
            price,
            size,
            num_orders,
        }
    }

    /// Base currency liquidity available at this level
    pub fn total_size(&self) -> Result<Decimal, QuoteError> {
        self.size
            .checked_mul(Decimal::from(self.num_orders))
            .ok_or(QuoteError::Overflow("level size"))
    }

    /// Quote currency value of the whole level
    pub fn notional(&self) -> Result<Decimal, QuoteError> {
        self.price
            .checked_mul(self.total_size()?)
            .ok_or(QuoteError::Overflow("level notional"))
    }

    fn validate(&self) -> Result<(), QuoteError> {
        if self.price <= Decimal::ZERO {
            return Err(QuoteError::InvalidEntry {
                field: "price",
                value: self.price.to_string(),
            });
        }
        if self.size <= Decimal::ZERO {
            return Err(QuoteError::InvalidEntry {
                field: "size",
                value: self.size.to_string(),
            });
        }
        if self.num_orders == 0 {
            return Err(QuoteError::InvalidEntry {
                field: "num_orders",
                value: self.num_orders.to_string(),
            });
        }
        Ok(())
    }
}

/// Bids and asks for a single currency pair.
///
/// Entries are kept in insertion order and only sorted when read, so the
/// sorted accessors always reflect the latest writes. `inversed` records
/// whether the caller's base/quote roles are swapped relative to the book.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    inversed: bool,
    // Offers to buy
    bids: Vec<OrderBookEntry>,
    // Offers to sell
    asks: Vec<OrderBookEntry>,
}

impl OrderBook {
    pub fn new(inversed: bool) -> Self {
        Self {
            inversed,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    /// Builds a book from a fetched snapshot, validating every level.
    pub fn from_snapshot(snapshot: BookSnapshot, inversed: bool) -> Result<Self, QuoteError> {
        let mut book = Self::new(inversed);
        for ask in snapshot.asks {
            book.add_ask(ask)?;
        }
        for bid in snapshot.bids {
            book.add_bid(bid)?;
        }
        Ok(book)
    }

    pub fn is_inversed(&self) -> bool {
        self.inversed
    }

    pub fn add_ask(&mut self, entry: OrderBookEntry) -> Result<(), QuoteError> {
        entry.validate()?;
        self.asks.push(entry);
        Ok(())
    }

    pub fn add_bid(&mut self, entry: OrderBookEntry) -> Result<(), QuoteError> {
        entry.validate()?;
        self.bids.push(entry);
        Ok(())
    }

    /// Asks cheapest first. Equal prices keep insertion order.
    pub fn asks_sorted(&self) -> std::vec::IntoIter<&OrderBookEntry> {
        let mut levels: Vec<&OrderBookEntry> = self.asks.iter().collect();
        levels.sort_by(|a, b| a.price.cmp(&b.price));
        levels.into_iter()
    }

    /// Bids highest first. Equal prices keep insertion order.
    pub fn bids_sorted(&self) -> std::vec::IntoIter<&OrderBookEntry> {
        let mut levels: Vec<&OrderBookEntry> = self.bids.iter().collect();
        levels.sort_by(|a, b| b.price.cmp(&a.price));
        levels.into_iter()
    }

    /// Number of (bid, ask) levels
    pub fn depth(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }

    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;

    fn entry(price: Decimal, size: Decimal, num_orders: u64) -> OrderBookEntry {
        OrderBookEntry::new(price, size, num_orders)
    }

    #[fixture]
    fn book() -> OrderBook {
        let mut book = OrderBook::new(false);
        for price in [dec!(300), dec!(100), dec!(250), dec!(200)] {
            book.add_ask(entry(price, dec!(1), 1)).unwrap();
            book.add_bid(entry(price - dec!(50), dec!(1), 1)).unwrap();
        }
        book
    }

    #[rstest]
    fn test_asks_sorted_ascending(book: OrderBook) {
        let prices: Vec<Decimal> = book.asks_sorted().map(|e| e.price).collect();
        assert_eq!(prices, vec![dec!(100), dec!(200), dec!(250), dec!(300)]);
    }

    #[rstest]
    fn test_bids_sorted_descending(book: OrderBook) {
        let prices: Vec<Decimal> = book.bids_sorted().map(|e| e.price).collect();
        assert_eq!(prices, vec![dec!(250), dec!(200), dec!(150), dec!(50)]);
    }

    #[rstest]
    fn test_sorted_reads_are_repeatable(book: OrderBook) {
        let first: Vec<OrderBookEntry> = book.asks_sorted().copied().collect();
        let second: Vec<OrderBookEntry> = book.asks_sorted().copied().collect();
        assert_eq!(first, second);

        let first: Vec<OrderBookEntry> = book.bids_sorted().copied().collect();
        let second: Vec<OrderBookEntry> = book.bids_sorted().copied().collect();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_reads_reflect_later_writes(mut book: OrderBook) {
        book.add_ask(entry(dec!(50), dec!(2), 1)).unwrap();
        assert_eq!(book.asks_sorted().next().unwrap().price, dec!(50));
        assert_eq!(book.depth(), (4, 5));
    }

    #[test]
    fn test_equal_prices_keep_insertion_order() {
        let mut book = OrderBook::new(false);
        book.add_ask(entry(dec!(100), dec!(1), 1)).unwrap();
        book.add_ask(entry(dec!(100), dec!(2), 1)).unwrap();
        book.add_ask(entry(dec!(90), dec!(3), 1)).unwrap();
        book.add_ask(entry(dec!(100), dec!(4), 1)).unwrap();
        book.add_bid(entry(dec!(100), dec!(1), 1)).unwrap();
        book.add_bid(entry(dec!(100), dec!(2), 1)).unwrap();

        let sizes: Vec<Decimal> = book.asks_sorted().map(|e| e.size).collect();
        assert_eq!(sizes, vec![dec!(3), dec!(1), dec!(2), dec!(4)]);

        let sizes: Vec<Decimal> = book.bids_sorted().map(|e| e.size).collect();
        assert_eq!(sizes, vec![dec!(1), dec!(2)]);
    }

    #[rstest]
    fn test_reset_clears_both_sides(mut book: OrderBook) {
        book.reset();
        assert_eq!(book.asks_sorted().count(), 0);
        assert_eq!(book.bids_sorted().count(), 0);
        assert_eq!(book.depth(), (0, 0));
    }

    #[rstest]
    #[case(entry(dec!(0), dec!(1), 1), "price")]
    #[case(entry(dec!(-1), dec!(1), 1), "price")]
    #[case(entry(dec!(100), dec!(0), 1), "size")]
    #[case(entry(dec!(100), dec!(-0.5), 1), "size")]
    #[case(entry(dec!(100), dec!(1), 0), "num_orders")]
    fn test_rejects_non_positive_entries(#[case] bad: OrderBookEntry, #[case] field: &str) {
        let mut book = OrderBook::new(false);

        match book.add_ask(bad) {
            Err(QuoteError::InvalidEntry { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected InvalidEntry, got {other:?}"),
        }
        assert!(matches!(
            book.add_bid(bad),
            Err(QuoteError::InvalidEntry { .. })
        ));
        assert_eq!(book.depth(), (0, 0));
    }

    #[test]
    fn test_entry_totals() {
        let level = entry(dec!(200), dec!(0.5), 3);
        assert_eq!(level.total_size(), Ok(dec!(1.5)));
        assert_eq!(level.notional(), Ok(dec!(300)));
    }

    #[test]
    fn test_entry_totals_overflow() {
        let level = entry(Decimal::MAX, dec!(2), 1);
        assert_eq!(level.notional(), Err(QuoteError::Overflow("level notional")));

        let level = entry(dec!(1), Decimal::MAX, 3);
        assert_eq!(level.total_size(), Err(QuoteError::Overflow("level size")));
    }

    #[test]
    fn test_from_snapshot_keeps_orientation_and_levels() {
        let snapshot = BookSnapshot {
            asks: vec![entry(dec!(101), dec!(1), 1), entry(dec!(100), dec!(2), 3)],
            bids: vec![entry(dec!(99), dec!(1), 1)],
        };

        let book = OrderBook::from_snapshot(snapshot, true).unwrap();
        assert!(book.is_inversed());
        assert_eq!(book.asks_sorted().next().unwrap().price, dec!(100));
        assert_eq!(book.depth(), (1, 2));
    }

    #[test]
    fn test_from_snapshot_rejects_bad_level() {
        let snapshot = BookSnapshot {
            asks: vec![entry(dec!(101), dec!(1), 1)],
            bids: vec![entry(dec!(99), dec!(0), 1)],
        };

        assert!(matches!(
            OrderBook::from_snapshot(snapshot, false),
            Err(QuoteError::InvalidEntry { field: "size", .. })
        ));
    }
}
