use std::str::FromStr;
use std::time::Duration;

use super::MarketData;
use crate::errors::ExchangeError;
use crate::models::BookSnapshot;
use crate::orderbook::OrderBookEntry;
use crate::products::Product;
use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("coinquote/", env!("CARGO_PKG_VERSION"));

/// The raw JSON shape of GET /products/{id}/book?level=2
#[derive(Debug, Deserialize)]
struct BookResponse {
    #[serde(default)]
    asks: Vec<RawLevel>,
    #[serde(default)]
    bids: Vec<RawLevel>,
}

/// [price, size, num_orders]. Price and size arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct RawLevel(String, String, u64);

impl RawLevel {
    fn parse(self, side: &str) -> Result<OrderBookEntry, ExchangeError> {
        let price = Decimal::from_str(&self.0).map_err(|_| {
            ExchangeError::UnexpectedData(format!("invalid {side} price: {}", self.0))
        })?;
        let size = Decimal::from_str(&self.1).map_err(|_| {
            ExchangeError::UnexpectedData(format!("invalid {side} size: {}", self.1))
        })?;

        Ok(OrderBookEntry::new(price, size, self.2))
    }
}

pub struct Coinbase {
    client: reqwest::Client,
    base_url: String,
}

impl Coinbase {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GETs `path` and decodes the body, mapping a 404 to an invalid pair
    /// and any other failure status to an unavailable upstream.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[{}] GET {url}", self.name());

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ExchangeError::InvalidPair(path.to_string())),
            status if !status.is_success() => {
                return Err(ExchangeError::Unavailable(status.as_u16()));
            }
            _ => {}
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketData for Coinbase {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, ExchangeError> {
        // the listing itself has no pair to blame for a 404
        self.get("/products").await.map_err(|e| match e {
            ExchangeError::InvalidPair(_) => ExchangeError::Unavailable(404),
            other => other,
        })
    }

    async fn fetch_order_book(&self, product_id: &str) -> Result<BookSnapshot, ExchangeError> {
        let book: BookResponse = self
            .get(&format!("/products/{product_id}/book?level=2"))
            .await
            .map_err(|e| match e {
                ExchangeError::InvalidPair(_) => ExchangeError::InvalidPair(product_id.to_string()),
                other => other,
            })?;

        let asks = book
            .asks
            .into_iter()
            .map(|level| level.parse("ask"))
            .collect::<Result<Vec<_>, _>>()?;
        let bids = book
            .bids
            .into_iter()
            .map(|level| level.parse("bid"))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "[{}] {product_id} bids: {} asks: {}",
            self.name(),
            bids.len(),
            asks.len()
        );

        Ok(BookSnapshot { asks, bids })
    }
}
