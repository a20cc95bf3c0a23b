use serde::{Deserialize, Serialize};

use crate::{
	ConvertResult, OutOfRangeError,
	binance::{AvgPrice, CancelOrderResponse, CreateOrderResponse, ExchangeInfo, Kline, Order, TickerPrice, TradeFeeDetails, UserAsset, Withdraw, WithdrawResponse},
};

/// Every exchange call the convert layer relies on.
///
/// Implemented by [Binance](crate::binance::Binance); anything else implementing it (eg an in-memory fake) can stand in for the exchange.
/// Authenticated methods fail with [RejectedError::Unauthenticated](crate::RejectedError::Unauthenticated) when no credentials were configured.
#[async_trait::async_trait]
pub trait SpotApi: std::fmt::Debug + Send + Sync {
	// Market {{{
	async fn avg_price(&self, symbol: &str) -> ConvertResult<AvgPrice>;
	async fn exchange_info(&self, symbol: &str) -> ConvertResult<ExchangeInfo>;
	async fn klines(&self, params: KlinesParams) -> ConvertResult<Vec<Kline>>;
	async fn ticker_prices(&self, selector: TickerSelector) -> ConvertResult<Vec<TickerPrice>>;
	//,}}}

	// Authenticated {{{
	async fn create_order(&self, order: NewOrder) -> ConvertResult<CreateOrderResponse>;
	async fn get_order(&self, symbol: &str, order_id: i64) -> ConvertResult<Order>;
	async fn list_orders(&self, params: ListOrdersParams) -> ConvertResult<Vec<Order>>;
	/// Open orders of one symbol, or of the whole account when `symbol` is `None`.
	async fn open_orders(&self, symbol: Option<&str>) -> ConvertResult<Vec<Order>>;
	async fn cancel_order(&self, symbol: &str, order_id: i64) -> ConvertResult<CancelOrderResponse>;
	async fn withdraw(&self, params: WithdrawParams) -> ConvertResult<WithdrawResponse>;
	async fn withdraw_history(&self, params: WithdrawHistoryParams) -> ConvertResult<Vec<Withdraw>>;
	async fn trade_fee(&self, symbol: Option<&str>) -> ConvertResult<Vec<TradeFeeDetails>>;
	async fn user_assets(&self, asset: Option<&str>) -> ConvertResult<Vec<UserAsset>>;
	//,}}}
}

// Params {{{
#[derive(Clone, Debug, Default, PartialEq, Eq, derive_new::new)]
pub struct KlinesParams {
	pub symbol: String,
	/// Binance interval code, eg `1s`, `1m`, `1h`
	pub interval: String,
	#[new(default)]
	pub limit: Option<u16>,
	#[new(default)]
	pub start_time: Option<i64>,
	#[new(default)]
	pub end_time: Option<i64>,
}

impl KlinesParams {
	pub const LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;

	pub fn ensure_allowed(&self) -> Result<(), OutOfRangeError> {
		match self.limit {
			Some(limit) if !Self::LIMIT_RANGE.contains(&(limit as u32)) => Err(OutOfRangeError::new("limit", Self::LIMIT_RANGE, limit as u32)),
			_ => Ok(()),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TickerSelector {
	#[default]
	All,
	One(String),
	Many(Vec<String>),
}

/// A market order sized in quote asset.
#[derive(Clone, Debug, PartialEq, Eq, derive_new::new)]
pub struct NewOrder {
	pub symbol: String,
	pub side: Side,
	pub quote_order_qty: String,
	#[new(default)]
	pub new_client_order_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, derive_new::new)]
pub struct ListOrdersParams {
	pub symbol: String,
	#[new(default)]
	pub start_time: Option<i64>,
	#[new(default)]
	pub end_time: Option<i64>,
	#[new(default)]
	pub limit: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawParams {
	pub coin: String,
	pub address: String,
	pub address_tag: Option<String>,
	pub amount: String,
	pub withdraw_order_id: Option<String>,
	/// Chain to send on, eg `TRX` or `BSC`. The coin's default network when unset.
	pub network: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawHistoryParams {
	pub coin: Option<String>,
	pub withdraw_order_id: Option<String>,
}
//,}}}

// Enums {{{
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Side {
	#[default]
	Buy,
	Sell,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
	Limit,
	#[default]
	Market,
	StopLoss,
	StopLossLimit,
	TakeProfit,
	TakeProfitLimit,
	LimitMaker,
	/// Anything added on the exchange side since, spelled as received
	#[serde(untagged)]
	#[strum(default)]
	Other(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	#[default]
	New,
	PendingNew,
	PartiallyFilled,
	Filled,
	Canceled,
	PendingCancel,
	Rejected,
	Expired,
	ExpiredInMatch,
	#[serde(untagged)]
	#[strum(default)]
	Other(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
	#[default]
	Gtc,
	Ioc,
	Fok,
	#[serde(untagged)]
	#[strum(default)]
	Other(String),
}
//,}}}
