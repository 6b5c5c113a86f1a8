use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{QuoteError, ServiceError};
use crate::exchanges::MarketData;
use crate::models::Side;
use crate::orderbook::OrderBook;
use crate::products::ProductCatalog;
use crate::quote::QuoteGenerator;

/// A validated quote request.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub action: Side,
    pub base_currency: String,
    pub quote_currency: String,
    pub amount: Decimal,
}

/// Average unit price and filled amount, both with 8 decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteResponse {
    pub price: String,
    pub amount: String,
    pub currency: String,
}

/// Ties the product catalog and a market data source to the quoting core.
pub struct QuoteService {
    catalog: ProductCatalog,
    market: Arc<dyn MarketData>,
}

impl QuoteService {
    pub fn new(catalog: ProductCatalog, market: Arc<dyn MarketData>) -> Self {
        Self { catalog, market }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Fetches the current product list and swaps it into the catalog.
    pub async fn refresh_products(&self) -> Result<usize, ServiceError> {
        let products = self.market.fetch_products().await?;
        let count = products.len();
        self.catalog.replace_all(products);
        Ok(count)
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ServiceError> {
        let result = self.try_quote(request).await;

        match &result {
            Ok(response) => {
                metrics::counter!("quotes_total", "side" => request.action.as_str()).increment(1);
                tracing::info!(
                    "{} {} {}/{} -> price={} amount={}",
                    request.action,
                    request.amount,
                    request.base_currency,
                    request.quote_currency,
                    response.price,
                    response.amount
                );
            }
            Err(e) => {
                metrics::counter!("quote_failures_total", "side" => request.action.as_str())
                    .increment(1);
                tracing::warn!(
                    "{} {} {}/{} failed: {e}",
                    request.action,
                    request.amount,
                    request.base_currency,
                    request.quote_currency
                );
            }
        }

        result
    }

    async fn try_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ServiceError> {
        let found = self
            .catalog
            .lookup(&request.base_currency, &request.quote_currency)
            .ok_or_else(|| ServiceError::UnknownPair {
                base: request.base_currency.clone(),
                quote: request.quote_currency.clone(),
            })?;

        let snapshot = self.market.fetch_order_book(&found.product.id).await?;
        let book = OrderBook::from_snapshot(snapshot, found.inversed)?;

        // direct: (total price, base filled); inversed: (base amount, notional filled).
        // Either way total / amount is the unit price in the requested quote currency.
        let (total, amount) = QuoteGenerator::new(&book).quote(request.amount, request.action)?;

        let price = total
            .checked_div(amount)
            .ok_or(QuoteError::Overflow("unit price"))?;

        Ok(QuoteResponse {
            price: format_amount(price),
            amount: format_amount(amount),
            currency: request.quote_currency.to_uppercase(),
        })
    }
}

fn format_amount(value: Decimal) -> String {
    let mut value = value.round_dp(8);
    value.rescale(8);
    value.to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::errors::ExchangeError;
    use crate::models::BookSnapshot;
    use crate::orderbook::OrderBookEntry;
    use crate::products::Product;

    /// Serves one fixed book for every product and records requested ids.
    pub(crate) struct StaticMarket {
        pub products: Vec<Product>,
        pub book: BookSnapshot,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticMarket {
        pub fn new(book: BookSnapshot) -> Self {
            Self {
                products: vec![Product::new("BTC", "USD")],
                book,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketData for StaticMarket {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_products(&self) -> Result<Vec<Product>, ExchangeError> {
            Ok(self.products.clone())
        }

        async fn fetch_order_book(&self, product_id: &str) -> Result<BookSnapshot, ExchangeError> {
            self.requested.lock().unwrap().push(product_id.to_string());
            Ok(self.book.clone())
        }
    }

    fn snapshot() -> BookSnapshot {
        BookSnapshot {
            asks: vec![
                OrderBookEntry::new(dec!(200), dec!(1), 1),
                OrderBookEntry::new(dec!(100), dec!(1), 1),
            ],
            bids: vec![OrderBookEntry::new(dec!(90), dec!(2), 1)],
        }
    }

    async fn service(book: BookSnapshot) -> (QuoteService, Arc<StaticMarket>) {
        let market = Arc::new(StaticMarket::new(book));
        let service = QuoteService::new(ProductCatalog::new(), market.clone());
        service.refresh_products().await.unwrap();
        (service, market)
    }

    fn request(action: Side, base: &str, quote: &str, amount: Decimal) -> QuoteRequest {
        QuoteRequest {
            action,
            base_currency: base.to_string(),
            quote_currency: quote.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_direct_buy() {
        let (service, market) = service(snapshot()).await;

        let response = service
            .quote(&request(Side::Buy, "BTC", "USD", dec!(1.5)))
            .await
            .unwrap();

        assert_eq!(
            response,
            QuoteResponse {
                price: "133.33333333".to_string(),
                amount: "1.50000000".to_string(),
                currency: "USD".to_string(),
            }
        );
        assert_eq!(*market.requested.lock().unwrap(), vec!["BTC-USD"]);
    }

    #[tokio::test]
    async fn test_inversed_pair_quotes_in_notional() {
        let (service, _) = service(snapshot()).await;

        // 150 USD buys 1 BTC at 100 and 0.25 BTC at 200
        let response = service
            .quote(&request(Side::Buy, "usd", "btc", dec!(150)))
            .await
            .unwrap();

        assert_eq!(response.price, "0.00833333");
        assert_eq!(response.amount, "150.00000000");
        assert_eq!(response.currency, "BTC");
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let (service, market) = service(snapshot()).await;

        let err = service
            .quote(&request(Side::Sell, "ETH", "USD", dec!(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::UnknownPair { .. }));
        assert!(market.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_liquidity() {
        let (service, _) = service(snapshot()).await;

        let err = service
            .quote(&request(Side::Sell, "BTC", "USD", dec!(3)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Quote(QuoteError::InsufficientLiquidity { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_upstream_level() {
        let mut book = snapshot();
        book.bids.push(OrderBookEntry::new(dec!(80), dec!(1), 0));
        let (service, _) = service(book).await;

        let err = service
            .quote(&request(Side::Buy, "BTC", "USD", dec!(1)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Quote(QuoteError::InvalidEntry { field: "num_orders", .. })
        ));
    }

    #[tokio::test]
    async fn test_overflowing_level_is_a_typed_failure() {
        let book = BookSnapshot {
            asks: vec![OrderBookEntry::new(dec!(50000000000000000000000000000), dec!(2), 1)],
            bids: vec![],
        };
        let (service, _) = service(book).await;

        let err = service
            .quote(&request(Side::Buy, "BTC", "USD", dec!(2)))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Quote(QuoteError::Overflow(_))));
    }

    #[test]
    fn test_format_amount_pads_and_rounds() {
        assert_eq!(format_amount(dec!(240)), "240.00000000");
        assert_eq!(format_amount(dec!(0.123456789)), "0.12345679");
    }
}
