//! Typed request/response adapter over the Binance spot REST API.
//!
//! - [binance] is the SDK: one function per endpoint, wire types as Binance sends them.
//! - [SpotApi] is the seam between the two.
//! - [SpotClient](convert::SpotClient) reshapes requests and responses, and checks minimum notional before placing market orders.
pub extern crate spot_convert_adapters as adapters;

pub mod binance;
pub mod config;
pub mod convert;
pub mod core;
mod error;

pub mod prelude {
	pub use crate::{
		binance::Binance,
		config::SpotClientConfig,
		convert::*,
		core::{Side, SpotApi},
		error::*,
	};
}
pub use crate::core::*;

pub use error::*;
