// A module for communicating with the [Binance API](https://developers.binance.com/docs/binance-spot-api-docs/rest-api).

use std::{marker::PhantomData, str::FromStr, time::SystemTime};

use eyre::eyre;
use generics::{
	ConstructAuthError, UrlError,
	http::{ApiError, AuthError, BuildError, HandleError, *},
};
use hmac::{Hmac, Mac};
use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use url::Url;

// https://developers.binance.com/docs/binance-spot-api-docs/rest-api/general-api-information
impl<B, R> RequestHandler<B> for BinanceRequestHandler<R>
where
	B: Serialize,
	R: DeserializeOwned,
{
	type Successful = R;

	fn base_url(&self, is_test: bool) -> Result<Url, UrlError> {
		if let Some(url) = &self.options.base_url {
			return Ok(url.clone());
		}
		Ok(Url::parse(self.options.http_url.as_str(is_test || self.options.test))?)
	}

	#[tracing::instrument(skip_all, fields(?builder))]
	fn build_request(&self, mut builder: RequestBuilder, request_body: &Option<B>, _: u8) -> Result<Request, BuildError> {
		if let Some(body) = request_body {
			let encoded = serde_urlencoded::to_string(body)?;
			builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded").body(encoded);
		}

		if self.options.http_auth != BinanceAuth::None {
			// https://developers.binance.com/docs/binance-spot-api-docs/rest-api/endpoint-security-type
			let pubkey = self.options.pubkey.as_deref().ok_or(ConstructAuthError::MissingPubkey)?;
			if !pubkey.is_ascii() || pubkey.chars().any(|c| c.is_ascii_control()) {
				return Err(ConstructAuthError::InvalidCharacterInApiKey(pubkey.to_owned()).into());
			}
			builder = builder.header("X-MBX-APIKEY", pubkey);

			if self.options.http_auth == BinanceAuth::Sign {
				let time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map_err(|e| BuildError::Other(e.into()))?;
				let timestamp = time.as_millis();

				builder = builder.query(&[("timestamp", timestamp)]);
				if let Some(recv_window) = self.options.recv_window {
					builder = builder.query(&[("recvWindow", recv_window)]);
				}

				let secret = self.options.secret.as_ref().ok_or(ConstructAuthError::MissingSecret)?;

				let mut request = builder.build().map_err(|e| BuildError::Other(e.into()))?;
				let query = request.url().query().unwrap_or_default().to_owned();
				let body = request.body().and_then(|body| body.as_bytes()).unwrap_or_default();

				let signature = sign(&[query.as_bytes(), body].concat(), secret);
				request.url_mut().query_pairs_mut().append_pair("signature", &signature);

				return Ok(request);
			}
		}
		builder.build().map_err(|e| BuildError::Other(e.into()))
	}

	fn handle_response(&self, status: StatusCode, headers: HeaderMap, response_body: Bytes) -> Result<Self::Successful, HandleError> {
		if status.is_success() {
			serde_json::from_slice(&response_body).map_err(|error| {
				tracing::debug!("Failed to parse response due to an error: {}", error);
				HandleError::Parse(eyre!("{error}; body: {}", truncate_msg(&String::from_utf8_lossy(&response_body))))
			})
		} else {
			// https://developers.binance.com/docs/binance-spot-api-docs/rest-api/limits
			if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
				let retry_after_sec = match headers.get(header::RETRY_AFTER) {
					Some(value) => match value.to_str() {
						Ok(string) => match u32::from_str(string) {
							Ok(retry_after) => Some(retry_after),
							Err(_) => {
								tracing::debug!("Invalid number in Retry-After header");
								None
							}
						},
						Err(_) => {
							tracing::debug!("Non-ASCII character in Retry-After header");
							None
						}
					},
					None => None,
				};
				let e = match retry_after_sec {
					Some(s) => {
						let until = Timestamp::now().checked_add(SignedDuration::from_secs(s as i64)).ok();
						ApiError::IpTimeout { until }.into()
					}
					_ => HandleError::Parse(eyre!("Could't interpret Retry-After header")),
				};
				return Err(e);
			}

			let e: BinanceError = match serde_json::from_slice::<BinanceError>(&response_body) {
				Ok(binance_error) => binance_error,
				Err(parse_error) =>
					return Err(HandleError::Parse(eyre!(
						"{status}: {parse_error}; body: {}",
						truncate_msg(&String::from_utf8_lossy(&response_body))
					))),
			};
			Err(ApiError::from(e).into())
		}
	}
}

/// HMAC-SHA256 of `payload` keyed with `secret`, hex-encoded. This is what Binance expects in the `signature` query param.
pub fn sign(payload: &[u8], secret: &SecretString) -> String {
	let mut hmac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes()).expect("hmac accepts key of any length");
	hmac.update(payload);
	hex::encode(hmac.finalize().into_bytes())
}

/// One setting of [BinanceOptions], applied with [BinanceOptions::update].
#[derive(Debug)]
pub enum BinanceOption {
	/// API key
	Pubkey(String),
	/// Api secret
	Secret(SecretString),
	/// Use testnet
	Test(bool),

	/// Number of milliseconds the request is valid for. Only applicable for signed requests.
	RecvWindow(u16),
	/// One of the official hosts
	HttpUrl(BinanceHttpUrl),
	/// Any other host, eg a local relay. Takes precedence over [HttpUrl](Self::HttpUrl) and testnet selection.
	BaseUrl(Url),
	/// Authentication type for HTTP requests
	HttpAuth(BinanceAuth),
}

/// Official hosts of the spot REST API. All of them share `https://testnet.binance.vision` as testnet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum BinanceHttpUrl {
	/// `https://api.binance.com`
	#[default]
	Spot,
	/// `https://api1.binance.com`
	Spot1,
	/// `https://api2.binance.com`
	Spot2,
	/// `https://api3.binance.com`
	Spot3,
	/// `https://api4.binance.com`
	Spot4,
	/// `https://data-api.binance.vision`, market data only
	SpotData,
}
impl BinanceHttpUrl {
	pub fn as_str(&self, testnet: bool) -> &'static str {
		if testnet {
			return "https://testnet.binance.vision";
		}
		match self {
			Self::Spot => "https://api.binance.com",
			Self::Spot1 => "https://api1.binance.com",
			Self::Spot2 => "https://api2.binance.com",
			Self::Spot3 => "https://api3.binance.com",
			Self::Spot4 => "https://api4.binance.com",
			Self::SpotData => "https://data-api.binance.vision",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BinanceAuth {
	/// `TRADE` and `USER_DATA` endpoints: key header plus HMAC signature
	Sign,
	#[default]
	None,
}

/// Signs, sends to the configured host and decodes into `R`.
pub struct BinanceRequestHandler<R> {
	options: BinanceOptions,
	_response: PhantomData<fn() -> R>,
}
impl<R: DeserializeOwned> BinanceRequestHandler<R> {
	pub fn new(options: BinanceOptions) -> Self {
		Self { options, _response: PhantomData }
	}

	pub fn options(&self) -> &BinanceOptions {
		&self.options
	}
}

/// Everything a [BinanceRequestHandler] needs to know, accumulated from [BinanceOption]s.
#[derive(Clone, derive_more::Debug, Default)]
pub struct BinanceOptions {
	/// see [BinanceOption::Pubkey]
	pub pubkey: Option<String>,
	/// see [BinanceOption::Secret]
	#[debug("[REDACTED]")]
	pub secret: Option<SecretString>,
	/// see [BinanceOption::RecvWindow]
	pub recv_window: Option<u16>,
	/// see [BinanceOption::HttpUrl]
	pub http_url: BinanceHttpUrl,
	/// see [BinanceOption::BaseUrl]
	pub base_url: Option<Url>,
	/// see [BinanceOption::HttpAuth]
	pub http_auth: BinanceAuth,
	/// see [BinanceOption::Test]
	pub test: bool,
}
impl BinanceOptions {
	pub fn update(&mut self, option: BinanceOption) {
		match option {
			BinanceOption::Pubkey(v) => self.pubkey = Some(v),
			BinanceOption::Secret(v) => self.secret = Some(v),
			BinanceOption::Test(v) => self.test = v,
			BinanceOption::RecvWindow(v) => self.recv_window = Some(v),
			BinanceOption::HttpUrl(v) => self.http_url = v,
			BinanceOption::BaseUrl(v) => self.base_url = Some(v),
			BinanceOption::HttpAuth(v) => self.http_auth = v,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.pubkey.is_some()
	}
}

// Error Codes {{{
/// Error payload of every non-2xx Binance response: `{"code": -1121, "msg": "Invalid symbol."}`
#[derive(Clone, Debug, Deserialize, derive_new::new)]
pub struct BinanceError {
	pub code: i32,
	pub msg: String,
}
impl BinanceError {
	pub fn kind(&self) -> BinanceErrorCode {
		self.code.into()
	}
}
impl From<BinanceError> for ApiError {
	fn from(e: BinanceError) -> Self {
		match e.kind() {
			BinanceErrorCode::Unauthorized | BinanceErrorCode::InvalidSignature | BinanceErrorCode::BadApiKeyFmt | BinanceErrorCode::RejectedMbxKey =>
				ApiError::Auth(AuthError::Unauthorized { msg: e.msg }),
			kind => eyre!("Binance API error {} ({kind:?}): {}", e.code, e.msg).into(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinanceErrorCode {
	// 10xx - General Server/Network
	Unknown,
	Disconnected,
	Unauthorized,
	TooManyRequests,
	UnexpectedResponse,
	Timeout,
	ServerBusy,
	InvalidMessage,
	UnknownOrderComposition,
	TooManyOrders,
	ServiceShuttingDown,
	UnsupportedOperation,
	InvalidTimestamp,
	InvalidSignature,

	// 11xx - Request issues
	IllegalChars,
	TooManyParameters,
	MandatoryParamEmptyOrMalformed,
	UnknownParam,
	UnreadParameters,
	ParamEmpty,
	ParamNotRequired,
	ParamOverflow,
	BadPrecision,
	NoDepth,
	TifNotRequired,
	InvalidTif,
	InvalidOrderType,
	InvalidSide,
	EmptyNewClOrdId,
	EmptyOrgClOrdId,
	BadInterval,
	BadSymbol,
	InvalidSymbolStatus,
	InvalidListenKey,
	MoreThanXXHours,
	OptionalParamsBadCombo,
	InvalidParameter,
	InvalidJson,
	DuplicateSymbols,

	// 20xx - Business logic errors
	NewOrderRejected,
	CancelRejected,
	NoSuchOrder,
	BadApiKeyFmt,
	RejectedMbxKey,
	NoTradingWindow,
	OrderArchived,

	/// Unknown error code
	Other(i32),
}

impl From<i32> for BinanceErrorCode {
	fn from(code: i32) -> Self {
		match code {
			-1000 => Self::Unknown,
			-1001 => Self::Disconnected,
			-1002 => Self::Unauthorized,
			-1003 => Self::TooManyRequests,
			-1006 => Self::UnexpectedResponse,
			-1007 => Self::Timeout,
			-1008 => Self::ServerBusy,
			-1013 => Self::InvalidMessage,
			-1014 => Self::UnknownOrderComposition,
			-1015 => Self::TooManyOrders,
			-1016 => Self::ServiceShuttingDown,
			-1020 => Self::UnsupportedOperation,
			-1021 => Self::InvalidTimestamp,
			-1022 => Self::InvalidSignature,

			-1100 => Self::IllegalChars,
			-1101 => Self::TooManyParameters,
			-1102 => Self::MandatoryParamEmptyOrMalformed,
			-1103 => Self::UnknownParam,
			-1104 => Self::UnreadParameters,
			-1105 => Self::ParamEmpty,
			-1106 => Self::ParamNotRequired,
			-1108 => Self::ParamOverflow,
			-1111 => Self::BadPrecision,
			-1112 => Self::NoDepth,
			-1114 => Self::TifNotRequired,
			-1115 => Self::InvalidTif,
			-1116 => Self::InvalidOrderType,
			-1117 => Self::InvalidSide,
			-1118 => Self::EmptyNewClOrdId,
			-1119 => Self::EmptyOrgClOrdId,
			-1120 => Self::BadInterval,
			-1121 => Self::BadSymbol,
			-1122 => Self::InvalidSymbolStatus,
			-1125 => Self::InvalidListenKey,
			-1127 => Self::MoreThanXXHours,
			-1128 => Self::OptionalParamsBadCombo,
			-1130 => Self::InvalidParameter,
			-1135 => Self::InvalidJson,
			-1151 => Self::DuplicateSymbols,

			-2010 => Self::NewOrderRejected,
			-2011 => Self::CancelRejected,
			-2013 => Self::NoSuchOrder,
			-2014 => Self::BadApiKeyFmt,
			-2015 => Self::RejectedMbxKey,
			-2016 => Self::NoTradingWindow,
			-2026 => Self::OrderArchived,

			code => {
				tracing::warn!("Encountered unknown Binance error code: {code}");
				Self::Other(code)
			}
		}
	}
}
//,}}}

#[cfg(test)]
mod tests {
	use generics::reqwest;
	use rstest::rstest;

	use super::*;

	fn handler(options: BinanceOptions) -> BinanceRequestHandler<serde_json::Value> {
		BinanceRequestHandler::new(options)
	}

	fn handle(status: u16, headers: HeaderMap, body: &'static str) -> Result<serde_json::Value, HandleError> {
		RequestHandler::<()>::handle_response(&handler(BinanceOptions::default()), StatusCode::from_u16(status).unwrap(), headers, Bytes::from_static(body.as_bytes()))
	}

	#[test]
	fn signature_matches_documented_example() {
		// https://developers.binance.com/docs/binance-spot-api-docs/rest-api/endpoint-security-type#signed-endpoint-examples-for-post-apiv3order---hmac-keys
		let secret = SecretString::from("NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j".to_owned());
		let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
		assert_eq!(sign(query.as_bytes(), &secret), "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71");
	}

	#[test]
	fn signed_request_carries_key_timestamp_and_signature() {
		let options = BinanceOptions {
			pubkey: Some("my-key".to_owned()),
			secret: Some(SecretString::from("my-secret".to_owned())),
			recv_window: Some(5000),
			http_url: BinanceHttpUrl::Spot,
			http_auth: BinanceAuth::Sign,
			..Default::default()
		};
		let builder = reqwest::Client::new().get("https://api.binance.com/api/v3/order").query(&[("symbol", "EOSBTC"), ("orderId", "659854195")]);
		let request = RequestHandler::<()>::build_request(&handler(options), builder, &None, 1).unwrap();

		assert_eq!(request.headers().get("X-MBX-APIKEY").unwrap(), "my-key");
		let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
		let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, ["symbol", "orderId", "timestamp", "recvWindow", "signature"]);

		let (_, signature) = pairs.last().unwrap();
		let signed_part = request.url().query().unwrap().rsplit_once("&signature=").unwrap().0;
		assert_eq!(signature, &sign(signed_part.as_bytes(), &SecretString::from("my-secret".to_owned())));
	}

	#[test]
	fn form_body_is_part_of_the_signature() {
		let options = BinanceOptions {
			pubkey: Some("k".to_owned()),
			secret: Some(SecretString::from("s".to_owned())),
			http_url: BinanceHttpUrl::Spot,
			http_auth: BinanceAuth::Sign,
			..Default::default()
		};
		let h = handler(options);
		let body = vec![("coin", "EOS"), ("amount", "0.2")];
		let builder = reqwest::Client::new().post("https://api.binance.com/sapi/v1/capital/withdraw/apply");
		let request = h.build_request(builder, &Some(body), 1).unwrap();

		assert_eq!(request.headers().get(header::CONTENT_TYPE).unwrap(), "application/x-www-form-urlencoded");
		let query = request.url().query().unwrap();
		let (signed_query, signature) = query.rsplit_once("&signature=").unwrap();
		let payload = format!("{signed_query}coin=EOS&amount=0.2");
		assert_eq!(signature, sign(payload.as_bytes(), &SecretString::from("s".to_owned())));
	}

	#[test]
	fn signing_without_secret_fails() {
		let options = BinanceOptions {
			pubkey: Some("k".to_owned()),
			http_auth: BinanceAuth::Sign,
			..Default::default()
		};
		let builder = reqwest::Client::new().get("https://api.binance.com/api/v3/openOrders");
		let err = RequestHandler::<()>::build_request(&handler(options), builder, &None, 1).unwrap_err();
		assert!(matches!(err, BuildError::Auth(ConstructAuthError::MissingSecret)));
	}

	#[test]
	fn testnet_url() {
		let options = BinanceOptions {
			http_url: BinanceHttpUrl::Spot,
			..Default::default()
		};
		let h = handler(options);
		assert_eq!(RequestHandler::<()>::base_url(&h, true).unwrap().as_str(), "https://testnet.binance.vision/");
		assert_eq!(RequestHandler::<()>::base_url(&h, false).unwrap().as_str(), "https://api.binance.com/");
	}

	#[test]
	fn rate_limit_with_retry_after() {
		let mut headers = HeaderMap::new();
		headers.insert(header::RETRY_AFTER, "30".parse().unwrap());
		let err = handle(429, headers, "").unwrap_err();
		match err {
			HandleError::Api(ApiError::IpTimeout { until: Some(until) }) => assert!(until > Timestamp::now()),
			other => panic!("expected IpTimeout, got {other:?}"),
		}
	}

	#[rstest]
	#[case(-2015, true)]
	#[case(-2014, true)]
	#[case(-1022, true)]
	#[case(-2013, false)]
	#[case(-1121, false)]
	fn auth_codes_become_auth_errors(#[case] code: i32, #[case] is_auth: bool) {
		let api_error = ApiError::from(BinanceError::new(code, "some message".to_owned()));
		assert_eq!(matches!(api_error, ApiError::Auth(AuthError::Unauthorized { .. })), is_auth);
	}

	#[test]
	fn error_body_is_decoded() {
		let err = handle(400, HeaderMap::new(), r#"{"code":-2013,"msg":"Order does not exist."}"#).unwrap_err();
		assert_eq!(err.to_string(), "Binance API error -2013 (NoSuchOrder): Order does not exist.");
	}

	#[test]
	fn unknown_codes_are_kept() {
		assert_eq!(BinanceErrorCode::from(-9999), BinanceErrorCode::Other(-9999));
		assert_eq!(BinanceError::new(-1121, String::new()).kind(), BinanceErrorCode::BadSymbol);
	}
}
