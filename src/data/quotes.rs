use dashmap::DashMap;
use std::sync::Arc;

use super::Symbol;
use crate::api::quote::StockQuote;

/// Global quote-header cache
pub static QUOTES: std::sync::LazyLock<QuoteStore> = std::sync::LazyLock::new(QuoteStore::new);

/// Latest quote header per symbol, shared between the single and compare
/// views. Quote headers are small; the whole entry is replaced on update.
pub struct QuoteStore {
    inner: DashMap<Symbol, Arc<StockQuote>>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<Arc<StockQuote>> {
        self.inner.get(symbol).map(|r| Arc::clone(r.value()))
    }

    pub fn insert(&self, quote: StockQuote) {
        let symbol = quote.symbol.clone();
        self.inner.insert(symbol, Arc::new(quote));
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new()
    }
}
