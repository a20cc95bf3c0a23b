use clap::{Parser, Subcommand};
use eyre::Result;
use serde::Serialize;
use spot_convert::prelude::*;
use tracing_subscriber::EnvFilter;

/// Binance spot convert operations from the command line. Responses are printed as JSON.
///
/// Credentials and transport settings are read from the environment (or `.env`): BINANCE_API_KEY, BINANCE_SECRET_KEY, PROXY_URL,
/// BINANCE_TESTNET, BINANCE_RECV_WINDOW, BINANCE_TIMEOUT_MS, BINANCE_MAX_TRIES.
#[derive(Parser)]
#[command(name = "spot_convert", version)]
struct Cli {
	/// Log filter, used when RUST_LOG is not set
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Average price of a pair; one side must be USDT
	EstQuote {
		#[arg(long)]
		base: String,
		#[arg(long, default_value = "USDT")]
		quote: String,
	},
	/// Market order. QUANTITY is in quote asset for BUY, in base asset for SELL
	Trade {
		#[arg(long)]
		symbol: String,
		#[arg(long)]
		side: Side,
		#[arg(long)]
		quantity: String,
		#[arg(long, default_value = "")]
		client_order_id: String,
	},
	GetOrder {
		#[arg(long)]
		symbol: String,
		#[arg(long)]
		order_id: i64,
	},
	/// All orders of a symbol
	OrderList {
		#[arg(long)]
		symbol: String,
		/// ms since epoch
		#[arg(long)]
		start_time: Option<i64>,
		/// ms since epoch
		#[arg(long)]
		end_time: Option<i64>,
		#[arg(long)]
		limit: Option<u16>,
	},
	/// Open orders across all symbols
	HangOrders,
	Cancel {
		#[arg(long)]
		symbol: String,
		#[arg(long)]
		order_id: i64,
	},
	Withdraw {
		#[arg(long)]
		coin: String,
		#[arg(long)]
		address: String,
		#[arg(long)]
		amount: String,
		#[arg(long, default_value = "")]
		address_tag: String,
		#[arg(long, default_value = "")]
		withdraw_order_id: String,
		#[arg(long, default_value = "")]
		network: String,
	},
	WithdrawHistory {
		#[arg(long, default_value = "")]
		coin: String,
		#[arg(long, default_value = "")]
		withdraw_order_id: String,
	},
	/// Maker/taker commission; all symbols when none is given
	TradeFee {
		#[arg(long, default_value = "")]
		symbol: String,
	},
	/// 1s candles
	Klines {
		#[arg(long)]
		symbol: String,
		#[arg(long)]
		limit: Option<u16>,
		#[arg(long)]
		start_time: Option<i64>,
		#[arg(long)]
		end_time: Option<i64>,
	},
	/// Latest price. `--symbol` wins over `--symbols`; neither means every symbol
	Ticker {
		#[arg(long, default_value = "")]
		symbol: String,
		#[arg(long, value_delimiter = ',')]
		symbols: Vec<String>,
	},
	/// Non-zero balances; all assets when none is given
	UserAsset {
		#[arg(long, default_value = "")]
		asset: String,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

	let client = SpotClient::from_env()?;
	match cli.command {
		Command::EstQuote { base, quote } => print(&client.est_quote(&EstQuoteReq { base_ccy: base, quote_ccy: quote }).await?),
		Command::Trade {
			symbol,
			side,
			quantity,
			client_order_id,
		} => print(
			&client
				.trade(&TradeReq {
					symbol,
					side,
					quantity,
					new_client_order_id: client_order_id,
				})
				.await?,
		),
		Command::GetOrder { symbol, order_id } => print(&client.get_order(&GetOrderReq { symbol, order_id }).await?),
		Command::OrderList { symbol, start_time, end_time, limit } => print(&client.order_list(&OrderListReq { symbol, start_time, end_time, limit }).await?),
		Command::HangOrders => print(&client.hang_order_list().await?),
		Command::Cancel { symbol, order_id } => print(&client.cancel_order(&CancelReq { symbol, order_id }).await?),
		Command::Withdraw {
			coin,
			address,
			amount,
			address_tag,
			withdraw_order_id,
			network,
		} => print(
			&client
				.withdraw(&WithdrawReq {
					coin,
					address,
					address_tag,
					amount,
					withdraw_order_id,
					network,
				})
				.await?,
		),
		Command::WithdrawHistory { coin, withdraw_order_id } => print(&client.withdraw_history(&WithdrawHistoryReq { coin, withdraw_order_id }).await?),
		Command::TradeFee { symbol } => print(&client.trade_fee(&TradeFeeReq { symbol }).await?),
		Command::Klines { symbol, limit, start_time, end_time } => print(&client.klines(&KlinesOneSecReq { symbol, limit, start_time, end_time }).await?),
		Command::Ticker { symbol, symbols } => print(&client.get_ticker_price(&NewPriceReq { symbol, symbols }).await?),
		Command::UserAsset { asset } => print(&client.get_user_asset(&UserAssetReq { asset }).await?),
	}
}

fn print<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
