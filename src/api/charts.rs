use rust_decimal::Decimal;
use serde::Deserialize;

use super::client::{client, ApiError};
use super::quote::StockQuote;
use crate::data::{Period, Symbol};
use crate::figure::Figure;

#[derive(Clone, Debug, Deserialize)]
struct ChartResponse {
    fig: Figure,
}

/// `/get_stock_chart`: the interactive price chart for one symbol.
pub async fn stock_chart(symbol: &Symbol, period: Period) -> Result<Figure, ApiError> {
    let response: ChartResponse = client()
        .get_json(
            "/get_stock_chart",
            &[("symbol", symbol.as_str()), ("period", period.as_query())],
        )
        .await?;
    Ok(response.fig)
}

/// `/compare_stocks`: overlay chart plus both quote headers in one
/// response, numbered fields flattened the way the service emits them.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub fig: Figure,
    symbol1: Symbol,
    company_name1: String,
    current_price1: Decimal,
    change1: Decimal,
    change_percent1: Decimal,
    symbol2: Symbol,
    company_name2: String,
    current_price2: Decimal,
    change2: Decimal,
    change_percent2: Decimal,
}

impl CompareResponse {
    pub fn quotes(&self) -> [StockQuote; 2] {
        [
            StockQuote {
                symbol: self.symbol1.clone(),
                company_name: self.company_name1.clone(),
                current_price: self.current_price1,
                change: self.change1,
                change_percent: self.change_percent1,
            },
            StockQuote {
                symbol: self.symbol2.clone(),
                company_name: self.company_name2.clone(),
                current_price: self.current_price2,
                change: self.change2,
                change_percent: self.change_percent2,
            },
        ]
    }
}

pub async fn compare(
    first: &Symbol,
    second: &Symbol,
    period: Period,
) -> Result<CompareResponse, ApiError> {
    client()
        .get_json(
            "/compare_stocks",
            &[
                ("symbol1", first.as_str()),
                ("symbol2", second.as_str()),
                ("period", period.as_query()),
            ],
        )
        .await
}

/// One row of the daily-returns table. Field names follow the service's
/// dataframe column headers.
#[derive(Clone, Debug, Deserialize)]
pub struct ReturnRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Adj Close")]
    pub adj_close: Decimal,
    #[serde(rename = "Daily Return")]
    pub daily_return: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DailyReturnsResponse {
    pub fig: Figure,
    #[serde(default)]
    pub table: Vec<ReturnRow>,
}

pub async fn daily_returns(
    symbol: &Symbol,
    period: Period,
) -> Result<DailyReturnsResponse, ApiError> {
    client()
        .get_json(
            "/daily_returns",
            &[("symbol", symbol.as_str()), ("period", period.as_query())],
        )
        .await
}

/// The best buy/sell window reported by `/max_profit`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitWindow {
    pub buy_date: String,
    pub buy_price: Decimal,
    pub sell_date: String,
    pub sell_price: Decimal,
    pub profit: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MaxProfitResponse {
    pub fig: Figure,
    #[serde(flatten)]
    pub window: ProfitWindow,
}

pub async fn max_profit(symbol: &Symbol, period: Period) -> Result<MaxProfitResponse, ApiError> {
    client()
        .get_json(
            "/max_profit",
            &[("symbol", symbol.as_str()), ("period", period.as_query())],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::{CompareResponse, DailyReturnsResponse, MaxProfitResponse};
    use rust_decimal_macros::dec;

    #[test]
    fn parses_compare_payload_into_two_quotes() {
        let response: CompareResponse = serde_json::from_value(serde_json::json!({
            "fig": {"data": [], "layout": {}},
            "symbol1": "AAPL", "companyName1": "Apple Inc.",
            "currentPrice1": 189.37, "change1": 1.2, "changePercent1": 0.64,
            "symbol2": "MSFT", "companyName2": "Microsoft Corporation",
            "currentPrice2": 410.0, "change2": -2.5, "changePercent2": -0.61
        }))
        .expect("parse compare payload");
        let [first, second] = response.quotes();
        assert_eq!(first.symbol.as_str(), "AAPL");
        assert_eq!(second.company_name, "Microsoft Corporation");
        assert_eq!(second.change.round_dp(2), dec!(-2.5));
    }

    #[test]
    fn parses_daily_returns_table_columns() {
        let response: DailyReturnsResponse = serde_json::from_value(serde_json::json!({
            "fig": {"data": [{"name": "AAPL Daily Return"}], "layout": {}},
            "table": [
                {"Date": "2026-01-05", "Adj Close": 182.4, "Daily Return": -0.34},
                {"Date": "2026-01-06", "Adj Close": 184.1, "Daily Return": 0.93}
            ]
        }))
        .expect("parse daily returns payload");
        assert_eq!(response.table.len(), 2);
        assert_eq!(response.table[1].date, "2026-01-06");
        assert_eq!(response.table[1].daily_return.round_dp(2), dec!(0.93));
    }

    #[test]
    fn parses_max_profit_window() {
        let response: MaxProfitResponse = serde_json::from_value(serde_json::json!({
            "fig": {"data": [], "layout": {"shapes": [{"type": "rect"}]}},
            "buyDate": "2026-02-03", "buyPrice": 171.2,
            "sellDate": "2026-04-17", "sellPrice": 198.9,
            "profit": 27.7
        }))
        .expect("parse max profit payload");
        assert_eq!(response.window.buy_date, "2026-02-03");
        assert_eq!(response.window.profit.round_dp(2), dec!(27.7));
        assert!(response.fig.layout.has_overlay());
    }
}
