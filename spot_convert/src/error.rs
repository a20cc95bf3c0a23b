use adapters::generics::http::{ApiError, AuthError, HandleError, RequestError};
use eyre::Report;

// Convert Error {{{
pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, miette::Diagnostic, derive_more::Display, thiserror::Error, derive_more::From)]
pub enum ConvertError {
	/// transport, signing, or exchange-reported failures
	#[diagnostic(transparent)]
	#[from(skip)]
	Request(RequestError),
	#[diagnostic(transparent)]
	Auth(AuthError),
	#[diagnostic(transparent)]
	Rejected(RejectedError),
	#[diagnostic(transparent)]
	Range(OutOfRangeError),
	#[diagnostic(transparent)]
	Config(ConfigError),
	#[diagnostic(code(spot_convert::other))]
	Other(Report),
}

impl From<RequestError> for ConvertError {
	fn from(e: RequestError) -> Self {
		match e {
			RequestError::HandleResponse(HandleError::Api(ApiError::Auth(auth))) => Self::Auth(auth),
			other => Self::Request(other),
		}
	}
}

/// Requests refused locally, before or instead of reaching the exchange.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum RejectedError {
	#[error("coin not support: {base}/{quote}, one side of the pair must be {}", crate::convert::QUOTE_COIN)]
	#[diagnostic(code(spot_convert::rejected::unsupported_coin), help("Quotes are only available for pairs against USDT."))]
	UnsupportedCoin { base: String, quote: String },
	#[error("exchange info for {symbol} contains no symbols")]
	#[diagnostic(code(spot_convert::rejected::missing_symbol_info), help("Check that the symbol exists and is spelled in upper case, eg `FILUSDT`."))]
	MissingSymbolInfo { symbol: String },
	#[error("quantity less than min notional : {quantity} {quote_asset} < {min_notional} {quote_asset}")]
	#[diagnostic(code(spot_convert::rejected::below_min_notional))]
	BuyBelowMinNotional { quantity: String, min_notional: String, quote_asset: String },
	#[error("quantity * avgPrice less than min notional : {quantity:.6} * {price:.6} {base_asset}/{quote_asset} < {min_notional:.6} {quote_asset}")]
	#[diagnostic(code(spot_convert::rejected::below_min_notional))]
	SellBelowMinNotional {
		quantity: f64,
		price: f64,
		min_notional: f64,
		base_asset: String,
		quote_asset: String,
	},
	#[error("`{field}` is not a number: {value:?}")]
	#[diagnostic(code(spot_convert::rejected::invalid_number))]
	InvalidNumber { field: &'static str, value: String },
	#[error("this endpoint requires an API key and secret, but the client was built without them")]
	#[diagnostic(code(spot_convert::rejected::unauthenticated), help("Set BINANCE_API_KEY and BINANCE_SECRET_KEY."))]
	Unauthenticated,
}

#[derive(derive_more::Debug, miette::Diagnostic, thiserror::Error, derive_new::new)]
#[diagnostic(code(spot_convert::range::out_of_range), help("Adjust the request parameters to fall within the allowed range."))]
#[error("`{field}` is out of range. Allowed: {allowed:?}, provided: {provided}")]
pub struct OutOfRangeError {
	field: &'static str,
	allowed: std::ops::RangeInclusive<u32>,
	provided: u32,
}

#[derive(Debug, miette::Diagnostic, thiserror::Error, derive_new::new)]
#[error("invalid value for {var}: {value:?} ({reason})")]
#[diagnostic(code(spot_convert::config))]
pub struct ConfigError {
	var: &'static str,
	value: String,
	reason: String,
}
//,}}}
