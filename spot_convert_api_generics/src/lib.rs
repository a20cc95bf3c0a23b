#![warn(future_incompatible, let_underscore, nonstandard_style)] //, missing_docs)]

//! # spot_convert_api_generics
//! Exchange-agnostic HTTP plumbing: a pooled [Client][http::Client] with timeout and retry policy,
//! and the [RequestHandler][http::RequestHandler] seam through which an exchange adds its base url, signing and error decoding.

pub mod http;
pub extern crate reqwest;

/// Auth fields a handler needed, but was not given.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
#[non_exhaustive]
pub enum ConstructAuthError {
	#[error("API key is required for this request, but was not provided")]
	#[diagnostic(code(spot_convert::auth::missing_pubkey), help("Provide an API key, eg through the BINANCE_API_KEY env variable."))]
	MissingPubkey,
	#[error("API secret is required for signed requests, but was not provided")]
	#[diagnostic(code(spot_convert::auth::missing_secret), help("Provide an API secret, eg through the BINANCE_SECRET_KEY env variable."))]
	MissingSecret,
	#[error("API key contains characters not allowed in a header: {0}")]
	#[diagnostic(code(spot_convert::auth::invalid_key))]
	InvalidCharacterInApiKey(String),
	#[error("{0}")]
	#[diagnostic(code(spot_convert::auth::other))]
	Other(#[from] eyre::Report),
}

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum UrlError {
	#[error("failed to parse URL: {0}")]
	#[diagnostic(code(spot_convert::url::parse))]
	Parse(#[from] url::ParseError),
	#[error("`{path}` can not be joined onto {base}: {source}")]
	#[diagnostic(code(spot_convert::url::join))]
	Join {
		base: url::Url,
		path: String,
		#[source]
		source: url::ParseError,
	},
}
