//! One-shot HTTP endpoint on 127.0.0.1 that records what a [Binance] client puts on the wire.

use adapters::{
	Client,
	binance::sign,
	generics::{
		http::{self, RequestConfig, Url},
		reqwest,
	},
};
use secrecy::SecretString;
use tokio::{
	io::{AsyncReadExt as _, AsyncWriteExt as _},
	net::TcpListener,
	task::JoinHandle,
};

use super::Binance;

pub(crate) const API_KEY: &str = "loopback-key";
const SECRET: &str = "loopback-secret";

/// A request as received, query and form body already decoded.
#[derive(Debug)]
pub(crate) struct Recorded {
	pub method: String,
	pub path: String,
	pub query: Vec<(String, String)>,
	pub body: Vec<(String, String)>,
	headers: Vec<(String, String)>,
	raw_query: String,
	raw_body: String,
}

impl Recorded {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	pub fn query_keys(&self) -> Vec<&str> {
		self.query.iter().map(|(k, _)| k.as_str()).collect()
	}

	/// Query pairs minus the ones the signer adds.
	pub fn params(&self) -> Vec<(&str, &str)> {
		self.query
			.iter()
			.filter(|(k, _)| !matches!(k.as_str(), "timestamp" | "recvWindow" | "signature"))
			.map(|(k, v)| (k.as_str(), v.as_str()))
			.collect()
	}

	pub fn form(&self) -> Vec<(&str, &str)> {
		self.body.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
	}

	/// `signature` is the last query pair and covers the query before it followed by the body.
	pub fn is_signed(&self) -> bool {
		let Some((signed_query, signature)) = self.raw_query.rsplit_once("&signature=") else {
			return false;
		};
		let payload = format!("{signed_query}{}", self.raw_body);
		self.header("x-mbx-apikey") == Some(API_KEY) && sign(payload.as_bytes(), &SecretString::from(SECRET.to_owned())) == signature
	}
}

/// Authenticated [Binance] pointed at a fresh listener that answers exactly one request with `200 response_body`.
pub(crate) async fn serve_once(response_body: &'static str) -> (Binance, JoinHandle<Recorded>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

	let recorded = tokio::spawn(async move {
		let (mut stream, _) = listener.accept().await.unwrap();
		let mut buf = Vec::new();
		let mut chunk = [0u8; 4096];
		let head_len = loop {
			let n = stream.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed mid-headers");
			buf.extend_from_slice(&chunk[..n]);
			if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
				break pos + 4;
			}
		};
		let head = String::from_utf8(buf[..head_len].to_vec()).unwrap();
		let headers: Vec<(String, String)> = head
			.lines()
			.skip(1)
			.filter_map(|l| l.split_once(':'))
			.map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
			.collect();
		let content_length: usize = headers.iter().find(|(k, _)| k == "content-length").map_or(0, |(_, v)| v.parse().unwrap());
		while buf.len() < head_len + content_length {
			let n = stream.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed mid-body");
			buf.extend_from_slice(&chunk[..n]);
		}
		let raw_body = String::from_utf8(buf[head_len..head_len + content_length].to_vec()).unwrap();

		let reply = format!(
			"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{response_body}",
			response_body.len()
		);
		stream.write_all(reply.as_bytes()).await.unwrap();
		stream.shutdown().await.ok();

		let mut request_line = head.lines().next().unwrap().split(' ');
		let method = request_line.next().unwrap().to_owned();
		let target = request_line.next().unwrap();
		let (path, raw_query) = target.split_once('?').unwrap_or((target, ""));
		Recorded {
			method,
			path: path.to_owned(),
			query: serde_urlencoded::from_str(raw_query).unwrap(),
			body: serde_urlencoded::from_str(&raw_body).unwrap(),
			headers,
			raw_query: raw_query.to_owned(),
			raw_body,
		}
	});

	let transport = http::Client::from_reqwest(reqwest::Client::builder().no_proxy().build().unwrap(), RequestConfig::default());
	let mut bn = Binance::new(Client::new(transport));
	bn.auth(API_KEY.to_owned(), SecretString::from(SECRET.to_owned()));
	bn.set_base_url(url);
	(bn, recorded)
}
