#[cfg(test)]
pub(crate) mod loopback;
mod market;
mod trade;
mod wallet;
use adapters::{
	Client,
	binance::{BinanceAuth, BinanceHttpUrl, BinanceOption},
	generics::http::Url,
};
use derive_more::{Deref, DerefMut};
pub use market::{AvgPrice, ExchangeInfo, Kline, SymbolInfo, TickerPrice};
use secrecy::SecretString;
pub use trade::{CancelOrderResponse, CreateOrderResponse, Fill, Order};
pub use wallet::{TradeFeeDetails, UserAsset, Withdraw, WithdrawResponse};

use crate::{
	ConvertResult, RejectedError,
	core::{KlinesParams, ListOrdersParams, NewOrder, SpotApi, TickerSelector, WithdrawHistoryParams, WithdrawParams},
};

/// Binance spot REST client.
///
/// Public endpoints work out of the box; everything under [SpotApi]'s `Authenticated` section needs [auth()](Self::auth) first.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct Binance(pub Client);

impl Binance {
	pub fn new(client: Client) -> Self {
		Self(client)
	}

	// Config {{{
	pub fn auth(&mut self, pubkey: String, secret: SecretString) {
		self.update_default_option(BinanceOption::Pubkey(pubkey));
		self.update_default_option(BinanceOption::Secret(secret));
	}

	/// Number of **milliseconds** a signed request stays valid for. Binance caps it at 60_000.
	pub fn set_recv_window(&mut self, recv_window: u16) {
		self.update_default_option(BinanceOption::RecvWindow(recv_window));
	}

	pub fn set_timeout(&mut self, timeout: std::time::Duration) {
		self.client.config.timeout = timeout;
	}

	pub fn set_retry_cooldown(&mut self, cooldown: std::time::Duration) {
		self.client.config.retry_cooldown = cooldown;
	}

	pub fn set_max_tries(&mut self, max: u8) {
		self.client.config.max_tries = max;
	}

	pub fn set_use_testnet(&mut self, b: bool) {
		self.client.config.use_testnet = b;
	}

	/// Send everything to `url` instead of the official hosts, testnet included.
	pub fn set_base_url(&mut self, url: Url) {
		self.update_default_option(BinanceOption::BaseUrl(url));
	}
	//,}}}

	fn public_options() -> [BinanceOption; 1] {
		[BinanceOption::HttpUrl(BinanceHttpUrl::Spot)]
	}

	/// Fails early instead of letting the request go out unsigned.
	fn signed_options(&self) -> ConvertResult<[BinanceOption; 2]> {
		if !self.is_authenticated() {
			return Err(RejectedError::Unauthenticated.into());
		}
		Ok([BinanceOption::HttpUrl(BinanceHttpUrl::Spot), BinanceOption::HttpAuth(BinanceAuth::Sign)])
	}
}

#[async_trait::async_trait]
impl SpotApi for Binance {
	async fn avg_price(&self, symbol: &str) -> ConvertResult<AvgPrice> {
		market::avg_price(self, symbol).await
	}

	async fn exchange_info(&self, symbol: &str) -> ConvertResult<ExchangeInfo> {
		market::exchange_info(self, symbol).await
	}

	async fn klines(&self, params: KlinesParams) -> ConvertResult<Vec<Kline>> {
		market::klines(self, params).await
	}

	async fn ticker_prices(&self, selector: TickerSelector) -> ConvertResult<Vec<TickerPrice>> {
		market::ticker_prices(self, selector).await
	}

	async fn create_order(&self, order: NewOrder) -> ConvertResult<CreateOrderResponse> {
		trade::create_order(self, order).await
	}

	async fn get_order(&self, symbol: &str, order_id: i64) -> ConvertResult<Order> {
		trade::get_order(self, symbol, order_id).await
	}

	async fn list_orders(&self, params: ListOrdersParams) -> ConvertResult<Vec<Order>> {
		trade::list_orders(self, params).await
	}

	async fn open_orders(&self, symbol: Option<&str>) -> ConvertResult<Vec<Order>> {
		trade::open_orders(self, symbol).await
	}

	async fn cancel_order(&self, symbol: &str, order_id: i64) -> ConvertResult<CancelOrderResponse> {
		trade::cancel_order(self, symbol, order_id).await
	}

	async fn withdraw(&self, params: WithdrawParams) -> ConvertResult<WithdrawResponse> {
		wallet::withdraw(self, params).await
	}

	async fn withdraw_history(&self, params: WithdrawHistoryParams) -> ConvertResult<Vec<Withdraw>> {
		wallet::withdraw_history(self, params).await
	}

	async fn trade_fee(&self, symbol: Option<&str>) -> ConvertResult<Vec<TradeFeeDetails>> {
		wallet::trade_fee(self, symbol).await
	}

	async fn user_assets(&self, asset: Option<&str>) -> ConvertResult<Vec<UserAsset>> {
		wallet::user_assets(self, asset).await
	}
}
