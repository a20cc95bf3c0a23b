#![cfg_attr(docsrs, feature(doc_cfg))]
pub extern crate spot_convert_api_generics as generics;

use std::fmt::Debug;

use binance::{BinanceOption, BinanceOptions, BinanceRequestHandler};
use serde::{Serialize, de::DeserializeOwned};
use spot_convert_api_generics::http::{self, RequestError};

pub mod binance;

/// Transport plus the Binance options every request starts from.
///
/// Each call layers its own [BinanceOption]s over the defaults without changing them.
/// Cloning is cheap: the underlying connection pool is shared between clones.
#[derive(Clone, Debug, Default)]
pub struct Client {
	pub client: http::Client,
	options: BinanceOptions,
}

impl Client {
	/// Wrap an already configured transport, eg one built with [http::Client::with_proxy].
	pub fn new(client: http::Client) -> Self {
		Self { client, ..Default::default() }
	}

	pub fn update_default_option(&mut self, option: BinanceOption) {
		self.options.update(option);
	}

	pub fn default_options(&self) -> &BinanceOptions {
		&self.options
	}

	/// Whether an API key is configured. The secret is only checked once a request is signed.
	pub fn is_authenticated(&self) -> bool {
		self.options.is_authenticated()
	}

	fn handler<R: DeserializeOwned>(&self, overrides: impl IntoIterator<Item = BinanceOption>) -> BinanceRequestHandler<R> {
		let mut options = self.options.clone();
		for option in overrides {
			options.update(option);
		}
		BinanceRequestHandler::new(options)
	}

	pub async fn get<R, Q>(&self, path: &str, query: &Q, options: impl IntoIterator<Item = BinanceOption>) -> Result<R, RequestError>
	where
		R: DeserializeOwned,
		Q: Serialize + ?Sized + Debug, {
		self.client.get(path, query, &self.handler(options)).await
	}

	pub async fn get_no_query<R>(&self, path: &str, options: impl IntoIterator<Item = BinanceOption>) -> Result<R, RequestError>
	where
		R: DeserializeOwned, {
		self.client.get_no_query(path, &self.handler(options)).await
	}

	/// `body` is sent form-encoded.
	pub async fn post<R, B>(&self, path: &str, body: B, options: impl IntoIterator<Item = BinanceOption>) -> Result<R, RequestError>
	where
		R: DeserializeOwned,
		B: Serialize, {
		self.client.post(path, body, &self.handler(options)).await
	}

	pub async fn delete<R, Q>(&self, path: &str, query: &Q, options: impl IntoIterator<Item = BinanceOption>) -> Result<R, RequestError>
	where
		R: DeserializeOwned,
		Q: Serialize + ?Sized + Debug, {
		self.client.delete(path, query, &self.handler(options)).await
	}
}

#[cfg(test)]
mod tests {
	use secrecy::SecretString;

	use super::*;
	use crate::binance::BinanceHttpUrl;

	#[test]
	fn default_options_accumulate() {
		let mut client = Client::default();
		assert!(!client.is_authenticated());

		client.update_default_option(BinanceOption::Pubkey("key".to_owned()));
		client.update_default_option(BinanceOption::Secret(SecretString::from("secret".to_owned())));
		client.update_default_option(BinanceOption::RecvWindow(5000));
		assert!(client.is_authenticated());

		let options = client.default_options();
		assert_eq!(options.pubkey.as_deref(), Some("key"));
		assert_eq!(options.recv_window, Some(5000));
	}

	#[test]
	fn per_call_options_do_not_leak_into_defaults() {
		let client = Client::default();
		let handler = client.handler::<serde_json::Value>([BinanceOption::Test(true), BinanceOption::RecvWindow(1000)]);
		assert!(handler.options().test);
		assert_eq!(handler.options().recv_window, Some(1000));

		let defaults = client.default_options();
		assert!(!defaults.test);
		assert_eq!(defaults.recv_window, None);
	}

	#[test]
	fn base_url_override_beats_every_preset() {
		let mut client = Client::default();
		let local = url::Url::parse("http://127.0.0.1:8080").unwrap();
		client.update_default_option(BinanceOption::BaseUrl(local.clone()));

		let handler = client.handler::<serde_json::Value>([BinanceOption::HttpUrl(BinanceHttpUrl::Spot3), BinanceOption::Test(true)]);
		assert_eq!(http::RequestHandler::<()>::base_url(&handler, true).unwrap(), local);
	}
}
