use std::{str::FromStr, time::Duration};

use adapters::{
	Client,
	generics::http::{self, RequestConfig},
};
use secrecy::SecretString;

use crate::{ConfigError, ConvertResult, binance::Binance};

pub const API_KEY_VAR: &str = "BINANCE_API_KEY";
pub const SECRET_KEY_VAR: &str = "BINANCE_SECRET_KEY";
pub const PROXY_URL_VAR: &str = "PROXY_URL";
pub const TESTNET_VAR: &str = "BINANCE_TESTNET";
pub const RECV_WINDOW_VAR: &str = "BINANCE_RECV_WINDOW";
pub const TIMEOUT_MS_VAR: &str = "BINANCE_TIMEOUT_MS";
pub const MAX_TRIES_VAR: &str = "BINANCE_MAX_TRIES";

/// Everything needed to build a [Binance] client.
///
/// Credentials are optional: without them only public market endpoints are usable.
#[derive(Clone, derive_more::Debug, Default)]
pub struct SpotClientConfig {
	pub api_key: Option<String>,
	#[debug("[REDACTED]")]
	pub secret: Option<SecretString>,
	/// All traffic goes through this proxy when set
	pub proxy_url: Option<String>,
	pub testnet: bool,
	/// Milliseconds
	pub recv_window: Option<u16>,
	pub request: RequestConfig,
}

impl SpotClientConfig {
	/// Reads a `.env` file from the working directory if there is one, then the process environment.
	pub fn from_env() -> ConvertResult<Self> {
		match dotenvy::dotenv() {
			Ok(path) => tracing::debug!(?path, "loaded .env"),
			Err(e) if e.not_found() => {}
			Err(e) => tracing::warn!("ignoring unreadable .env: {e}"),
		}
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	/// Empty values are treated as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConvertResult<Self> {
		let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

		let mut request = RequestConfig::default();
		if let Some(ms) = parse_var::<u64>(TIMEOUT_MS_VAR, get(TIMEOUT_MS_VAR))? {
			request.timeout = Duration::from_millis(ms);
		}
		if let Some(max_tries) = parse_var::<u8>(MAX_TRIES_VAR, get(MAX_TRIES_VAR))? {
			if max_tries == 0 {
				return Err(ConfigError::new(MAX_TRIES_VAR, "0".to_owned(), "must be at least 1".to_owned()).into());
			}
			request.max_tries = max_tries;
		}

		let testnet = match get(TESTNET_VAR) {
			None => false,
			Some(v) => match v.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" => true,
				"0" | "false" | "no" => false,
				_ => return Err(ConfigError::new(TESTNET_VAR, v, "expected true or false".to_owned()).into()),
			},
		};

		Ok(Self {
			api_key: get(API_KEY_VAR),
			secret: get(SECRET_KEY_VAR).map(SecretString::from),
			proxy_url: get(PROXY_URL_VAR),
			testnet,
			recv_window: parse_var::<u16>(RECV_WINDOW_VAR, get(RECV_WINDOW_VAR))?,
			request,
		})
	}

	pub fn build(self) -> ConvertResult<Binance> {
		let mut request = self.request;
		request.use_testnet = self.testnet;
		let http = match &self.proxy_url {
			Some(proxy_url) => http::Client::with_proxy(request, proxy_url)?,
			None => http::Client::new(request),
		};

		let mut bn = Binance::new(Client::new(http));
		match (self.api_key, self.secret) {
			(Some(key), Some(secret)) => bn.auth(key, secret),
			(None, None) => tracing::info!("no credentials configured, only public endpoints are available"),
			_ => tracing::warn!("only one of {API_KEY_VAR} and {SECRET_KEY_VAR} is set, ignoring both"),
		}
		if let Some(recv_window) = self.recv_window {
			bn.set_recv_window(recv_window);
		}
		Ok(bn)
	}
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
	T: FromStr,
	T::Err: std::fmt::Display, {
	value.map(|v| v.trim().parse::<T>().map_err(|e| ConfigError::new(var, v.clone(), e.to_string()))).transpose()
}
