pub mod store;

use serde::{Deserialize, Serialize};
pub use store::ProductCatalog;

/// A tradable currency pair as listed by the market data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub base_currency: String,
    pub quote_currency: String,
}

impl Product {
    pub fn new(base_currency: &str, quote_currency: &str) -> Self {
        let base_currency = base_currency.to_uppercase();
        let quote_currency = quote_currency.to_uppercase();
        Self {
            id: format!("{base_currency}-{quote_currency}"),
            base_currency,
            quote_currency,
        }
    }
}

/// Result of matching a requested pair against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMatch {
    pub product: Product,
    /// True when the request names the product's quote currency as its base.
    pub inversed: bool,
}
