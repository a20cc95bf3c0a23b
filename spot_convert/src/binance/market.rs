use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use serde_with::{DisplayFromStr, serde_as};
use tracing::instrument;

use super::Binance;
use crate::{
	ConvertError, ConvertResult,
	core::{KlinesParams, TickerSelector},
};

// avg price {{{
#[instrument(skip(client))]
pub(super) async fn avg_price(client: &Binance, symbol: &str) -> ConvertResult<AvgPrice> {
	let params = json!({ "symbol": symbol });
	let r: AvgPrice = client.get("/api/v3/avgPrice", &params, Binance::public_options()).await?;
	Ok(r)
}

/// `{"mins":5,"price":"9.35751834","closeTime":1694061154503}`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvgPrice {
	/// Averaging window, in minutes
	pub mins: i64,
	pub price: String,
	#[serde(default)]
	pub close_time: i64,
}
//,}}}

// exchange info {{{
#[instrument(skip(client))]
pub(super) async fn exchange_info(client: &Binance, symbol: &str) -> ConvertResult<ExchangeInfo> {
	let params = json!({ "symbol": symbol });
	let r: ExchangeInfo = client.get("/api/v3/exchangeInfo", &params, Binance::public_options()).await?;
	Ok(r)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
	#[serde(default)]
	pub timezone: String,
	#[serde(default)]
	pub server_time: i64,
	#[serde(default)]
	pub rate_limits: Vec<Value>,
	pub symbols: Vec<SymbolInfo>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
	pub symbol: String,
	#[serde(default)]
	pub status: String,
	pub base_asset: String,
	#[serde(default)]
	pub base_asset_precision: u8,
	pub quote_asset: String,
	#[serde(default)]
	pub quote_asset_precision: u8,
	#[serde(default)]
	pub order_types: Vec<String>,
	#[serde(default)]
	pub is_spot_trading_allowed: bool,
	/// Kept as raw objects: each `filterType` brings its own set of keys.
	#[serde(default)]
	pub filters: Vec<Map<String, Value>>,
}

impl SymbolInfo {
	/// Last filter whose `filterType` is any of `filter_types`.
	pub fn filter(&self, filter_types: &[&str]) -> Option<&Map<String, Value>> {
		self.filters
			.iter()
			.rfind(|f| f.get("filterType").and_then(Value::as_str).is_some_and(|t| filter_types.contains(&t)))
	}

	/// Raw `minNotional` of the last `MIN_NOTIONAL` or `NOTIONAL` filter, `"0"` if there is none.
	pub fn min_notional(&self) -> String {
		match self.filter(&["MIN_NOTIONAL", "NOTIONAL"]).and_then(|f| f.get("minNotional")) {
			Some(Value::String(s)) => s.clone(),
			Some(other) => other.to_string(),
			None => "0".to_owned(),
		}
	}
}
//,}}}

// klines {{{
/** # Ex: ```json
[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]
```
**/
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Kline {
	pub open_time: i64,
	#[serde_as(as = "DisplayFromStr")]
	pub open: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub high: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub low: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub close: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub volume: f64,
	pub close_time: i64,
	#[serde_as(as = "DisplayFromStr")]
	pub quote_asset_volume: f64,
	pub number_of_trades: u64,
	#[serde_as(as = "DisplayFromStr")]
	pub taker_buy_base_asset_volume: f64,
	#[serde_as(as = "DisplayFromStr")]
	pub taker_buy_quote_asset_volume: f64,
	#[serde(default, skip_serializing)]
	__ignore: Option<Value>,
}

#[instrument(skip(client), fields(symbol = %params.symbol, interval = %params.interval))]
pub(super) async fn klines(client: &Binance, params: KlinesParams) -> ConvertResult<Vec<Kline>> {
	params.ensure_allowed()?;
	let mut query = vec![("symbol", params.symbol), ("interval", params.interval)];
	if let Some(limit) = params.limit {
		query.push(("limit", limit.to_string()));
	}
	if let Some(start_time) = params.start_time {
		query.push(("startTime", start_time.to_string()));
	}
	if let Some(end_time) = params.end_time {
		query.push(("endTime", end_time.to_string()));
	}

	let r: Vec<Kline> = client.get("/api/v3/klines", &query, Binance::public_options()).await?;
	tracing::debug!(n = r.len(), "received klines");
	Ok(r)
}
//,}}}

// ticker price {{{
#[instrument(skip(client))]
pub(super) async fn ticker_prices(client: &Binance, selector: TickerSelector) -> ConvertResult<Vec<TickerPrice>> {
	let options = Binance::public_options();
	let r: Vec<TickerPrice> = match selector {
		// single-symbol queries answer with an object rather than a list
		TickerSelector::One(symbol) => {
			let r: TickerPrice = client.get("/api/v3/ticker/price", &[("symbol", symbol)], options).await?;
			vec![r]
		}
		TickerSelector::Many(symbols) => {
			let symbols = serde_json::to_string(&symbols).map_err(|e| ConvertError::Other(e.into()))?;
			client.get("/api/v3/ticker/price", &[("symbols", symbols)], options).await?
		}
		TickerSelector::All => client.get_no_query("/api/v3/ticker/price", options).await?,
	};
	Ok(r)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TickerPrice {
	pub symbol: String,
	pub price: String,
}
//,}}}
