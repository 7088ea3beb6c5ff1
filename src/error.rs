//! Client-level error types shared by every verb, auth strategy, and helper.

// crates.io
use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for caller-supplied callbacks and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (bad base URL, transport construction).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A per-call plugin rejected the request while it was being composed.
	#[error(transparent)]
	Compose(#[from] ComposeError),
	/// A request-updater or token callback rejected the request.
	///
	/// The callback's error is kept as-is so callers can downcast it.
	#[error(transparent)]
	Updater(BoxError),
	/// The OIDC token provider failed; its error is surfaced unmodified.
	#[error(transparent)]
	Provider(BoxError),
	/// The server could not be reached (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The server answered with an error status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// The response body could not be decoded into the destination.
	#[error(transparent)]
	Decode(#[from] crate::decode::DecodeError),
	/// A bearer token could not be introspected.
	#[error(transparent)]
	Token(#[from] crate::token::TokenError),
}
impl Error {
	/// Wraps a request-updater failure.
	pub fn updater(src: impl Into<BoxError>) -> Self {
		Self::Updater(src.into())
	}

	/// Wraps a token provider failure.
	pub fn provider(src: impl Into<BoxError>) -> Self {
		Self::Provider(src.into())
	}

	/// Returns the HTTP error when the failure came from an error status.
	pub fn as_http(&self) -> Option<&HttpError> {
		match self {
			Self::Http(e) => Some(e),
			_ => None,
		}
	}
}

/// Construction failures raised before any request is issued.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Raw URL supplied by the caller.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised by built-in plugins while mutating an outgoing request.
#[derive(Debug, ThisError)]
pub enum ComposeError {
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: InvalidHeaderName,
	},
	/// Header value contains forbidden bytes.
	#[error("Value of header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header the value was meant for.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: InvalidHeaderValue,
	},
	/// Path cannot be joined onto the base URL.
	#[error("Path `{path}` cannot be applied to the request URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	JsonBody(#[source] Arc<serde_json::Error>),
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client could not produce a response.
	#[error("Cannot obtain response.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl Into<BoxError>) -> Self {
		Self::Network { source: src.into() }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Coarse classification of an HTTP status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
	/// Status below 400.
	Success,
	/// Status in `[400, 500)`.
	ClientError,
	/// Status of 500 and above.
	ServerError,
}
impl StatusClass {
	/// Classifies a raw status code.
	pub const fn of(status: u16) -> Self {
		match status {
			0..400 => Self::Success,
			400..500 => Self::ClientError,
			_ => Self::ServerError,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::ClientError => "client_error",
			Self::ServerError => "server_error",
		}
	}
}
impl Display for StatusClass {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error status returned by the remote server.
///
/// `message` holds the `errorMessage` field of a JSON body when the server sent one, and the raw
/// body text otherwise. A 401 always carries the raw body.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{status}:{message}")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// Server-supplied message.
	pub message: String,
}
impl HttpError {
	/// Creates a new error for the provided status and message.
	pub fn new(status: u16, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}

	/// Returns the HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Returns the server-supplied message.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Classifies the carried status.
	pub fn class(&self) -> StatusClass {
		StatusClass::of(self.status)
	}

	/// True when the status is below 400.
	pub fn is_success(&self) -> bool {
		self.class() == StatusClass::Success
	}

	/// True when the status is 400 or above.
	pub fn is_error(&self) -> bool {
		!self.is_success()
	}

	/// True when the request failed because of the caller (`4xx`).
	pub fn is_client_error(&self) -> bool {
		self.class() == StatusClass::ClientError
	}

	/// True when the request failed because of the server (`5xx`).
	pub fn is_server_error(&self) -> bool {
		self.class() == StatusClass::ServerError
	}
}
