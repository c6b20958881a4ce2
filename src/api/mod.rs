pub mod yahoo;

use async_trait::async_trait;

use crate::error::Result;

/// Snapshot of one ticker as reported by a price source.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub current_price: f64,
    pub opening_price: f64,
    pub currency: Option<String>,
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<Quote>;
}
