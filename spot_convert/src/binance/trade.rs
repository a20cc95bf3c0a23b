use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::Binance;
use crate::{
	ConvertResult,
	core::{ListOrdersParams, NewOrder, OrderStatus, OrderType, Side, TimeInForce},
};

#[instrument(skip(client), fields(symbol = %order.symbol, side = %order.side))]
pub(super) async fn create_order(client: &Binance, order: NewOrder) -> ConvertResult<CreateOrderResponse> {
	let options = client.signed_options()?;
	let mut params = vec![
		("symbol", order.symbol),
		("side", order.side.to_string()),
		("type", OrderType::Market.to_string()),
		("quoteOrderQty", order.quote_order_qty),
		("newOrderRespType", "FULL".to_owned()),
	];
	if let Some(id) = order.new_client_order_id {
		params.push(("newClientOrderId", id));
	}

	let r: CreateOrderResponse = client.post("/api/v3/order", &params, options).await?;
	tracing::info!(order_id = r.order_id, status = %r.status, "placed market order");
	Ok(r)
}

#[instrument(skip(client))]
pub(super) async fn get_order(client: &Binance, symbol: &str, order_id: i64) -> ConvertResult<Order> {
	let options = client.signed_options()?;
	let params = [("symbol", symbol.to_owned()), ("orderId", order_id.to_string())];
	let r: Order = client.get("/api/v3/order", &params, options).await?;
	Ok(r)
}

#[instrument(skip(client), fields(symbol = %params.symbol))]
pub(super) async fn list_orders(client: &Binance, params: ListOrdersParams) -> ConvertResult<Vec<Order>> {
	let options = client.signed_options()?;
	let mut query = vec![("symbol", params.symbol)];
	if let Some(start_time) = params.start_time {
		query.push(("startTime", start_time.to_string()));
	}
	if let Some(end_time) = params.end_time {
		query.push(("endTime", end_time.to_string()));
	}
	if let Some(limit) = params.limit {
		query.push(("limit", limit.to_string()));
	}
	let r: Vec<Order> = client.get("/api/v3/allOrders", &query, options).await?;
	Ok(r)
}

#[instrument(skip(client))]
pub(super) async fn open_orders(client: &Binance, symbol: Option<&str>) -> ConvertResult<Vec<Order>> {
	let options = client.signed_options()?;
	let r: Vec<Order> = match symbol {
		Some(symbol) => client.get("/api/v3/openOrders", &[("symbol", symbol)], options).await?,
		None => client.get_no_query("/api/v3/openOrders", options).await?,
	};
	Ok(r)
}

#[instrument(skip(client))]
pub(super) async fn cancel_order(client: &Binance, symbol: &str, order_id: i64) -> ConvertResult<CancelOrderResponse> {
	let options = client.signed_options()?;
	let params = [("symbol", symbol.to_owned()), ("orderId", order_id.to_string())];
	let r: CancelOrderResponse = client.delete("/api/v3/order", &params, options).await?;
	tracing::info!(order_id = r.order_id, status = %r.status, "canceled order");
	Ok(r)
}

// Responses {{{
/// Amounts are kept as the decimal strings Binance sends.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
	pub symbol: String,
	pub order_id: i64,
	#[serde(default)]
	pub order_list_id: i64,
	pub client_order_id: String,
	pub transact_time: i64,
	#[serde(default)]
	pub price: String,
	#[serde(default)]
	pub orig_qty: String,
	#[serde(default)]
	pub executed_qty: String,
	#[serde(default)]
	pub orig_quote_order_qty: String,
	#[serde(default)]
	pub cummulative_quote_qty: String,
	pub status: OrderStatus,
	#[serde(default)]
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
	#[serde(default)]
	pub working_time: i64,
	#[serde(default)]
	pub self_trade_prevention_mode: String,
	#[serde(default)]
	pub fills: Vec<Fill>,
	// margin orders only
	#[serde(default)]
	pub is_isolated: bool,
	#[serde(default)]
	pub margin_buy_borrow_amount: String,
	#[serde(default)]
	pub margin_buy_borrow_asset: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
	pub price: String,
	pub qty: String,
	pub commission: String,
	pub commission_asset: String,
	#[serde(default)]
	pub trade_id: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	pub symbol: String,
	pub order_id: i64,
	#[serde(default)]
	pub order_list_id: i64,
	pub client_order_id: String,
	#[serde(default)]
	pub price: String,
	#[serde(default)]
	pub orig_qty: String,
	#[serde(default)]
	pub executed_qty: String,
	#[serde(default)]
	pub cummulative_quote_qty: String,
	pub status: OrderStatus,
	#[serde(default)]
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
	#[serde(default)]
	pub stop_price: String,
	#[serde(default)]
	pub iceberg_qty: String,
	#[serde(default)]
	pub time: i64,
	#[serde(default)]
	pub update_time: i64,
	#[serde(default)]
	pub is_working: bool,
	#[serde(default)]
	pub orig_quote_order_qty: String,
	#[serde(default)]
	pub is_isolated: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
	pub symbol: String,
	#[serde(default)]
	pub orig_client_order_id: String,
	pub order_id: i64,
	#[serde(default)]
	pub order_list_id: i64,
	#[serde(default)]
	pub client_order_id: String,
	#[serde(default)]
	pub price: String,
	#[serde(default)]
	pub orig_qty: String,
	#[serde(default)]
	pub executed_qty: String,
	#[serde(default)]
	pub cummulative_quote_qty: String,
	pub status: OrderStatus,
	#[serde(default)]
	pub time_in_force: TimeInForce,
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub side: Side,
}
//,}}}
