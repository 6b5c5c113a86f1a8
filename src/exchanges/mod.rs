use crate::errors::ExchangeError;
use crate::models::BookSnapshot;
use crate::products::Product;
use async_trait::async_trait;

pub mod coinbase;

#[async_trait]
pub trait MarketData: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every product the source lists for trading.
    async fn fetch_products(&self) -> Result<Vec<Product>, ExchangeError>;

    /// Current aggregated (level 2) book for a product id such as "BTC-USD".
    async fn fetch_order_book(&self, product_id: &str) -> Result<BookSnapshot, ExchangeError>;
}
