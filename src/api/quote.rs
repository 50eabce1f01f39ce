use rust_decimal::Decimal;
use serde::Deserialize;

use super::client::{client, ApiError};
use crate::data::{Period, Symbol};

/// Quote header fields of `/get_stock_data`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: Symbol,
    pub company_name: String,
    pub current_price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
}

pub async fn fetch(symbol: &Symbol, period: Period) -> Result<StockQuote, ApiError> {
    client()
        .get_json(
            "/get_stock_data",
            &[("symbol", symbol.as_str()), ("period", period.as_query())],
        )
        .await
}
