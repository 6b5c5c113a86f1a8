use crate::products::{PairMatch, Product};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ProductCatalog {
    inner: Arc<DashMap<String, Product>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Key format e.g.: "BTC-USD"
    fn key(base: &str, quote: &str) -> String {
        format!("{}-{}", base.to_uppercase(), quote.to_uppercase())
    }

    /// Swaps the catalog contents for a freshly fetched product list
    pub fn replace_all(&self, products: Vec<Product>) {
        let fresh: Vec<String> = products
            .iter()
            .map(|p| Self::key(&p.base_currency, &p.quote_currency))
            .collect();

        for product in products {
            self.inner
                .insert(Self::key(&product.base_currency, &product.quote_currency), product);
        }
        self.inner.retain(|key, _| fresh.contains(key));
    }

    /// Finds the product for a requested pair, trying the swapped pair
    /// when there is no direct listing.
    pub fn lookup(&self, base: &str, quote: &str) -> Option<PairMatch> {
        if let Some(product) = self.inner.get(&Self::key(base, quote)) {
            return Some(PairMatch {
                product: product.clone(),
                inversed: false,
            });
        }

        self.inner.get(&Self::key(quote, base)).map(|r| PairMatch {
            product: r.clone(),
            inversed: true,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
