//! Transport primitives for outgoing REST calls.
//!
//! The module exposes [`HttpTransport`] alongside [`Response`] so callers can plug in a custom
//! HTTP stack (or a fake in tests) without touching composition, status classification, or
//! body decoding. [`ReqwestTransport`] is the default implementation; connection pooling, TLS,
//! and redirects are left entirely to `reqwest`.

// crates.io
use reqwest::header::{CONTENT_TYPE, HOST, LOCATION};
// self
use crate::{_prelude::*, compose::OutgoingRequest, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Response, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute a composed [`OutgoingRequest`].
///
/// Implementations must honor [`OutgoingRequest::timeout`] and [`OutgoingRequest::host`], read
/// the whole body before resolving, and report every failure to obtain a response as a
/// [`TransportError`]. Status codes are never interpreted here.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the response.
	fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_>;
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl Response {
	/// Creates a response from its parts.
	pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers, body: body.into() }
	}

	/// Returns a header value as text, or an empty string when absent or not UTF-8.
	pub fn header(&self, name: impl reqwest::header::AsHeaderName) -> &str {
		self.headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or_default()
	}

	/// Raw `Content-Type` header value.
	pub fn content_type(&self) -> &str {
		self.header(CONTENT_TYPE)
	}

	/// `Location` header value, empty when absent.
	pub fn location(&self) -> &str {
		self.header(LOCATION)
	}

	/// Raw body bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestTransport(..)")
	}
}
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let OutgoingRequest { method, url, mut headers, host, body, timeout } = request;

			// Routes over HTTP/1.1 only; h2 keeps deriving `:authority` from `url`.
			if let Some(host) = host {
				let value = HeaderValue::from_str(&host).map_err(TransportError::network)?;

				headers.insert(HOST, value);
			}

			let mut builder = client.request(method, url).headers(headers).timeout(timeout);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(Response::new(status, headers, body))
		})
	}
}
