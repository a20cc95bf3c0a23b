//! Request/response shaped operations on top of [SpotApi].
//!
//! Every operation is a pass-through to one exchange call, except [trade()](SpotClient::trade), which re-checks the
//! symbol's minimum notional locally before placing the order.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
	ConvertResult, RejectedError,
	binance::{Binance, CancelOrderResponse, CreateOrderResponse, Fill, Kline, Order, TickerPrice, TradeFeeDetails, UserAsset, Withdraw},
	config::SpotClientConfig,
	core::{KlinesParams, ListOrdersParams, NewOrder, OrderStatus, OrderType, Side, SpotApi, TickerSelector, TimeInForce, WithdrawHistoryParams, WithdrawParams},
};

/// The only coin quotes are estimated against.
pub const QUOTE_COIN: &str = "USDT";
/// Interval of [SpotClient::klines]
pub const KLINES_INTERVAL: &str = "1s";

#[derive(Clone, Debug, Default)]
pub struct SpotClient<A: SpotApi = Binance> {
	api: A,
}

impl SpotClient<Binance> {
	pub fn from_config(config: SpotClientConfig) -> ConvertResult<Self> {
		Ok(Self::new(config.build()?))
	}

	/// Reads [SpotClientConfig] from the environment (and `.env`, if present).
	pub fn from_env() -> ConvertResult<Self> {
		Self::from_config(SpotClientConfig::from_env()?)
	}
}

impl<A: SpotApi> SpotClient<A> {
	pub fn new(api: A) -> Self {
		Self { api }
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	#[instrument(skip(self))]
	pub async fn est_quote(&self, req: &EstQuoteReq) -> ConvertResult<EstQuoteResp> {
		if req.base_ccy != QUOTE_COIN && req.quote_ccy != QUOTE_COIN {
			return Err(RejectedError::UnsupportedCoin {
				base: req.base_ccy.clone(),
				quote: req.quote_ccy.clone(),
			}
			.into());
		}
		let avg = self.api.avg_price(&format!("{}{}", req.base_ccy, req.quote_ccy)).await?;
		Ok(EstQuoteResp { price: avg.price, mins: avg.mins })
	}

	/// Market order sized in quote asset.
	///
	/// For `BUY`, `quantity` already is the quote amount. For `SELL` it is a base amount, converted at the exchange's current average price.
	/// Either way the resulting notional must reach the symbol's `MIN_NOTIONAL`/`NOTIONAL` filter, or nothing is sent.
	#[instrument(skip(self), fields(symbol = %req.symbol, side = %req.side))]
	pub async fn trade(&self, req: &TradeReq) -> ConvertResult<TradeResp> {
		let (quantity_str, quantity) = parse_quantity(&req.quantity)?;

		let info = self.api.exchange_info(&req.symbol).await?;
		let symbol = info.symbols.first().ok_or_else(|| RejectedError::MissingSymbolInfo { symbol: req.symbol.clone() })?;
		let min_notional = symbol.min_notional();
		let min_notional_f = lossy_f64(&min_notional);
		tracing::debug!(%min_notional, base = %symbol.base_asset, quote = %symbol.quote_asset);

		let quote_order_qty = match req.side {
			Side::Buy => {
				if quantity < min_notional_f {
					return Err(RejectedError::BuyBelowMinNotional {
						quantity: quantity_str.to_owned(),
						min_notional,
						quote_asset: symbol.quote_asset.clone(),
					}
					.into());
				}
				quantity_str.to_owned()
			}
			Side::Sell => {
				let avg = self.api.avg_price(&req.symbol).await?;
				let price = lossy_f64(&avg.price);
				let notional = quantity * price;
				if notional < min_notional_f {
					return Err(RejectedError::SellBelowMinNotional {
						quantity,
						price,
						min_notional: min_notional_f,
						base_asset: symbol.base_asset.clone(),
						quote_asset: symbol.quote_asset.clone(),
					}
					.into());
				}
				format!("{notional:.8}")
			}
		};

		let order = NewOrder {
			symbol: req.symbol.clone(),
			side: req.side,
			quote_order_qty,
			new_client_order_id: non_empty(&req.new_client_order_id),
		};
		let r = self.api.create_order(order).await?;
		Ok(r.into())
	}

	#[instrument(skip(self))]
	pub async fn get_order(&self, req: &GetOrderReq) -> ConvertResult<GetOrderResp> {
		let order = self.api.get_order(&req.symbol, req.order_id).await?;
		Ok(order.into())
	}

	#[instrument(skip(self))]
	pub async fn order_list(&self, req: &OrderListReq) -> ConvertResult<OrderListResp> {
		let params = ListOrdersParams {
			symbol: req.symbol.clone(),
			start_time: req.start_time,
			end_time: req.end_time,
			limit: req.limit,
		};
		let data = self.api.list_orders(params).await?;
		Ok(OrderListResp { data })
	}

	/// Open orders across every symbol.
	#[instrument(skip(self))]
	pub async fn hang_order_list(&self) -> ConvertResult<OrderListResp> {
		let data = self.api.open_orders(None).await?;
		Ok(OrderListResp { data })
	}

	#[instrument(skip(self))]
	pub async fn cancel_order(&self, req: &CancelReq) -> ConvertResult<CancelResp> {
		let r = self.api.cancel_order(&req.symbol, req.order_id).await?;
		Ok(r.into())
	}

	#[instrument(skip(self), fields(coin = %req.coin, amount = %req.amount))]
	pub async fn withdraw(&self, req: &WithdrawReq) -> ConvertResult<WithdrawResp> {
		let params = WithdrawParams {
			coin: req.coin.clone(),
			address: req.address.clone(),
			address_tag: non_empty(&req.address_tag),
			amount: req.amount.clone(),
			withdraw_order_id: non_empty(&req.withdraw_order_id),
			network: non_empty(&req.network),
		};
		let r = self.api.withdraw(params).await?;
		Ok(WithdrawResp { id: r.id })
	}

	#[instrument(skip(self))]
	pub async fn trade_fee(&self, req: &TradeFeeReq) -> ConvertResult<TradeFeeResp> {
		let data = self.api.trade_fee(non_empty(&req.symbol).as_deref()).await?;
		Ok(TradeFeeResp { data })
	}

	#[instrument(skip(self))]
	pub async fn withdraw_history(&self, req: &WithdrawHistoryReq) -> ConvertResult<WithdrawHistoryResp> {
		let params = WithdrawHistoryParams {
			coin: non_empty(&req.coin),
			withdraw_order_id: non_empty(&req.withdraw_order_id),
		};
		let data = self.api.withdraw_history(params).await?;
		Ok(WithdrawHistoryResp { data })
	}

	/// One-second candles.
	#[instrument(skip(self))]
	pub async fn klines(&self, req: &KlinesOneSecReq) -> ConvertResult<KlinesResp> {
		let params = KlinesParams {
			symbol: req.symbol.clone(),
			interval: KLINES_INTERVAL.to_owned(),
			limit: req.limit,
			start_time: req.start_time,
			end_time: req.end_time,
		};
		params.ensure_allowed()?;
		let data = self.api.klines(params).await?;
		Ok(KlinesResp { data })
	}

	/// `symbol` takes precedence over `symbols`; with neither set, every symbol is returned.
	#[instrument(skip(self))]
	pub async fn get_ticker_price(&self, req: &NewPriceReq) -> ConvertResult<TickerPriceResp> {
		let selector = match (non_empty(&req.symbol), req.symbols.is_empty()) {
			(Some(symbol), _) => TickerSelector::One(symbol),
			(None, false) => TickerSelector::Many(req.symbols.clone()),
			(None, true) => TickerSelector::All,
		};
		let data = self.api.ticker_prices(selector).await?;
		Ok(TickerPriceResp { data })
	}

	#[instrument(skip(self))]
	pub async fn get_user_asset(&self, req: &UserAssetReq) -> ConvertResult<UserAssetResp> {
		let data = self.api.user_assets(non_empty(&req.asset).as_deref()).await?;
		Ok(UserAssetResp { data })
	}
}

// helpers {{{
/// Exchange-provided decimals. Whatever fails to parse counts as zero.
fn lossy_f64(s: &str) -> f64 {
	s.trim().parse().unwrap_or(0.0)
}

/// Plain unsigned decimal like `10` or `0.25`, surrounding whitespace ignored. Returns the trimmed text alongside its value.
fn parse_quantity(s: &str) -> Result<(&str, f64), RejectedError> {
	let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
	let trimmed = s.trim();
	let plain = match trimmed.split_once('.') {
		Some((int, frac)) => digits(int) && digits(frac),
		None => digits(trimmed),
	};
	match plain.then(|| trimmed.parse::<f64>()) {
		Some(Ok(q)) => Ok((trimmed, q)),
		_ => Err(RejectedError::InvalidNumber { field: "quantity", value: s.to_owned() }),
	}
}

fn non_empty(s: &str) -> Option<String> {
	match s.is_empty() {
		true => None,
		false => Some(s.to_owned()),
	}
}
//,}}}

// Requests {{{
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EstQuoteReq {
	pub base_ccy: String,
	pub quote_ccy: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradeReq {
	pub symbol: String,
	pub side: Side,
	/// Quote amount for `BUY`, base amount for `SELL`
	pub quantity: String,
	#[serde(default)]
	pub new_client_order_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderReq {
	pub symbol: String,
	pub order_id: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderListReq {
	pub symbol: String,
	#[serde(default)]
	pub start_time: Option<i64>,
	#[serde(default)]
	pub end_time: Option<i64>,
	#[serde(default)]
	pub limit: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelReq {
	pub symbol: String,
	pub order_id: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawReq {
	pub coin: String,
	pub address: String,
	#[serde(default)]
	pub address_tag: String,
	pub amount: String,
	#[serde(default)]
	pub withdraw_order_id: String,
	#[serde(default)]
	pub network: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradeFeeReq {
	#[serde(default)]
	pub symbol: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawHistoryReq {
	#[serde(default)]
	pub coin: String,
	#[serde(default)]
	pub withdraw_order_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KlinesOneSecReq {
	pub symbol: String,
	#[serde(default)]
	pub limit: Option<u16>,
	#[serde(default)]
	pub start_time: Option<i64>,
	#[serde(default)]
	pub end_time: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceReq {
	#[serde(default)]
	pub symbol: String,
	#[serde(default)]
	pub symbols: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserAssetReq {
	#[serde(default)]
	pub asset: String,
}
//,}}}

// Responses {{{
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EstQuoteResp {
	pub price: String,
	pub mins: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeResp {
	pub symbol: String,
	pub order_id: i64,
	pub client_order_id: String,
	pub transact_time: i64,
	pub price: String,
	pub orig_qty: String,
	pub executed_qty: String,
	pub cummulative_quote_qty: String,
	pub is_isolated: bool,
	pub status: OrderStatus,
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
	pub fills: Vec<Fill>,
	pub margin_buy_borrow_amount: String,
	pub margin_buy_borrow_asset: String,
}
impl From<CreateOrderResponse> for TradeResp {
	fn from(r: CreateOrderResponse) -> Self {
		Self {
			symbol: r.symbol,
			order_id: r.order_id,
			client_order_id: r.client_order_id,
			transact_time: r.transact_time,
			price: r.price,
			orig_qty: r.orig_qty,
			executed_qty: r.executed_qty,
			cummulative_quote_qty: r.cummulative_quote_qty,
			is_isolated: r.is_isolated,
			status: r.status,
			time_in_force: r.time_in_force,
			order_type: r.order_type,
			side: r.side,
			fills: r.fills,
			margin_buy_borrow_amount: r.margin_buy_borrow_amount,
			margin_buy_borrow_asset: r.margin_buy_borrow_asset,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderResp {
	pub symbol: String,
	pub order_id: i64,
	pub order_list_id: i64,
	pub client_order_id: String,
	pub price: String,
	pub orig_qty: String,
	pub executed_qty: String,
	pub cummulative_quote_qty: String,
	pub status: OrderStatus,
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
	pub stop_price: String,
	pub iceberg_qty: String,
	pub time: i64,
	pub update_time: i64,
	pub is_working: bool,
	pub is_isolated: bool,
	pub orig_quote_order_qty: String,
}
impl From<Order> for GetOrderResp {
	fn from(o: Order) -> Self {
		Self {
			symbol: o.symbol,
			order_id: o.order_id,
			order_list_id: o.order_list_id,
			client_order_id: o.client_order_id,
			price: o.price,
			orig_qty: o.orig_qty,
			executed_qty: o.executed_qty,
			cummulative_quote_qty: o.cummulative_quote_qty,
			status: o.status,
			time_in_force: o.time_in_force,
			order_type: o.order_type,
			side: o.side,
			stop_price: o.stop_price,
			iceberg_qty: o.iceberg_qty,
			time: o.time,
			update_time: o.update_time,
			is_working: o.is_working,
			is_isolated: o.is_isolated,
			orig_quote_order_qty: o.orig_quote_order_qty,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct OrderListResp {
	pub data: Vec<Order>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelResp {
	pub symbol: String,
	pub orig_client_order_id: String,
	pub order_id: i64,
	pub order_list_id: i64,
	pub client_order_id: String,
	pub price: String,
	pub orig_qty: String,
	pub executed_qty: String,
	pub cummulative_quote_qty: String,
	pub status: OrderStatus,
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
}
impl From<CancelOrderResponse> for CancelResp {
	fn from(r: CancelOrderResponse) -> Self {
		Self {
			symbol: r.symbol,
			orig_client_order_id: r.orig_client_order_id,
			order_id: r.order_id,
			order_list_id: r.order_list_id,
			client_order_id: r.client_order_id,
			price: r.price,
			orig_qty: r.orig_qty,
			executed_qty: r.executed_qty,
			cummulative_quote_qty: r.cummulative_quote_qty,
			status: r.status,
			time_in_force: r.time_in_force,
			order_type: r.order_type,
			side: r.side,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WithdrawResp {
	pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TradeFeeResp {
	pub data: Vec<TradeFeeDetails>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WithdrawHistoryResp {
	pub data: Vec<Withdraw>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct KlinesResp {
	pub data: Vec<Kline>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TickerPriceResp {
	pub data: Vec<TickerPrice>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserAssetResp {
	pub data: Vec<UserAsset>,
}
//,}}}
