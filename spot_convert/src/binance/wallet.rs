use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::Binance;
use crate::{
	ConvertResult,
	core::{WithdrawHistoryParams, WithdrawParams},
};

// withdrawals {{{
#[instrument(skip(client), fields(coin = %params.coin, amount = %params.amount))]
pub(super) async fn withdraw(client: &Binance, params: WithdrawParams) -> ConvertResult<WithdrawResponse> {
	let options = client.signed_options()?;
	let mut body = vec![("coin", params.coin), ("address", params.address), ("amount", params.amount)];
	if let Some(tag) = params.address_tag {
		body.push(("addressTag", tag));
	}
	if let Some(id) = params.withdraw_order_id {
		body.push(("withdrawOrderId", id));
	}
	if let Some(network) = params.network {
		body.push(("network", network));
	}

	let r: WithdrawResponse = client.post("/sapi/v1/capital/withdraw/apply", &body, options).await?;
	tracing::info!(id = %r.id, "withdrawal submitted");
	Ok(r)
}

#[instrument(skip(client))]
pub(super) async fn withdraw_history(client: &Binance, params: WithdrawHistoryParams) -> ConvertResult<Vec<Withdraw>> {
	let options = client.signed_options()?;
	let mut query = Vec::new();
	if let Some(coin) = params.coin {
		query.push(("coin", coin));
	}
	if let Some(id) = params.withdraw_order_id {
		query.push(("withdrawOrderId", id));
	}
	let r: Vec<Withdraw> = client.get("/sapi/v1/capital/withdraw/history", &query, options).await?;
	Ok(r)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WithdrawResponse {
	pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw {
	pub id: String,
	pub amount: String,
	#[serde(default)]
	pub transaction_fee: String,
	pub coin: String,
	/// 0 email sent, 2 awaiting approval, 3 rejected, 4 processing, 6 completed
	pub status: i32,
	pub address: String,
	#[serde(default)]
	pub address_tag: String,
	#[serde(default)]
	pub tx_id: String,
	#[serde(default)]
	pub apply_time: String,
	#[serde(default)]
	pub network: String,
	#[serde(default)]
	pub transfer_type: i32,
	#[serde(default)]
	pub withdraw_order_id: String,
	#[serde(default)]
	pub info: String,
	#[serde(default)]
	pub confirm_no: i32,
	#[serde(default)]
	pub wallet_type: i32,
	#[serde(default)]
	pub tx_key: String,
	#[serde(default)]
	pub complete_time: String,
}
//,}}}

// fees and balances {{{
#[instrument(skip(client))]
pub(super) async fn trade_fee(client: &Binance, symbol: Option<&str>) -> ConvertResult<Vec<TradeFeeDetails>> {
	let options = client.signed_options()?;
	let r: Vec<TradeFeeDetails> = match symbol {
		Some(symbol) => client.get("/sapi/v1/asset/tradeFee", &[("symbol", symbol)], options).await?,
		None => client.get_no_query("/sapi/v1/asset/tradeFee", options).await?,
	};
	Ok(r)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradeFeeDetails {
	pub symbol: String,
	pub maker_commission: String,
	pub taker_commission: String,
}

/// Only assets with a non-zero balance are returned.
#[instrument(skip(client))]
pub(super) async fn user_assets(client: &Binance, asset: Option<&str>) -> ConvertResult<Vec<UserAsset>> {
	let options = client.signed_options()?;
	let mut body = vec![("needBtcValuation", "true")];
	if let Some(asset) = asset {
		body.push(("asset", asset));
	}
	let r: Vec<UserAsset> = client.post("/sapi/v3/asset/getUserAsset", &body, options).await?;
	Ok(r)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserAsset {
	pub asset: String,
	pub free: String,
	pub locked: String,
	pub freeze: String,
	pub withdrawing: String,
	#[serde(default)]
	pub ipoable: String,
	#[serde(default)]
	pub btc_valuation: String,
}
//,}}}
