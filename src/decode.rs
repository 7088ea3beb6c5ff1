//! Response classification and content-type driven body decoding.
//!
//! A response is first classified: `401` always yields the raw body, any other status of 400 and
//! above prefers the `errorMessage` field of a JSON body, and `[200, 400)` proceeds to decoding.
//! Decoding dispatches on the media type of `Content-Type` (parameters after `;` are ignored)
//! into a caller-provided [`Destination`].

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::HttpError, http::Response};

/// Errors raised while decoding a successful response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// The response carries a body with a content type this client does not decode.
	#[error("Unknown content type: {content_type}.")]
	UnknownContentType {
		/// Raw `Content-Type` header value (empty when absent).
		content_type: String,
	},
	/// The destination cannot hold the decoded payload.
	#[error("Destination expects a {expected} payload but the response holds a {found} payload.")]
	DestinationMismatch {
		/// Payload kind the destination accepts.
		expected: PayloadKind,
		/// Payload kind dictated by the response content type.
		found: PayloadKind,
	},
	/// JSON body does not match the destination type.
	#[error("Response body could not be decoded as JSON.")]
	Json(#[source] serde_path_to_error::Error<serde_json::Error>),
}

/// Payload shapes produced by content-type dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
	/// `application/json`.
	Json,
	/// `text/plain`, `text/html`.
	Text,
	/// `application/octet-stream`, `application/zip`, `application/pdf`, `text/xml`.
	Bytes,
}
impl PayloadKind {
	/// Maps a `Content-Type` header value onto a payload kind.
	pub fn from_content_type(content_type: &str) -> Option<Self> {
		let media_type = content_type.split(';').next().unwrap_or_default().trim();

		match media_type.to_ascii_lowercase().as_str() {
			"application/json" => Some(Self::Json),
			"text/plain" | "text/html" => Some(Self::Text),
			"application/octet-stream" | "application/zip" | "application/pdf" | "text/xml" =>
				Some(Self::Bytes),
			_ => None,
		}
	}

	/// Returns a stable label suitable for error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Text => "text",
			Self::Bytes => "bytes",
		}
	}
}
impl Display for PayloadKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Typed output slot for a decoded body.
///
/// Build one with [`Destination::json`], [`Destination::text`], [`Destination::bytes`], or
/// [`Destination::discard`]. A slot whose shape does not match the response content type is
/// reported as [`DecodeError::DestinationMismatch`] and left untouched.
#[derive(Debug)]
pub enum Destination<'a, T = serde_json::Value> {
	/// Deserializes `application/json` bodies into `T`.
	Json(&'a mut T),
	/// Receives `text/plain` and `text/html` bodies.
	Text(&'a mut String),
	/// Receives binary bodies bit-for-bit.
	Bytes(&'a mut Vec<u8>),
	/// Accepts any known payload and drops it.
	Discard,
}
impl<'a, T> Destination<'a, T>
where
	T: DeserializeOwned,
{
	/// JSON destination.
	pub fn json(slot: &'a mut T) -> Self {
		Self::Json(slot)
	}

	fn kind(&self) -> Option<PayloadKind> {
		match self {
			Self::Json(_) => Some(PayloadKind::Json),
			Self::Text(_) => Some(PayloadKind::Text),
			Self::Bytes(_) => Some(PayloadKind::Bytes),
			Self::Discard => None,
		}
	}
}
impl<'a> Destination<'a> {
	/// Text destination.
	pub fn text(slot: &'a mut String) -> Self {
		Self::Text(slot)
	}

	/// Byte destination.
	pub fn bytes(slot: &'a mut Vec<u8>) -> Self {
		Self::Bytes(slot)
	}

	/// Destination that ignores the body.
	pub fn discard() -> Self {
		Self::Discard
	}
}

/// Maps a response status onto an [`HttpError`], or `None` when the call succeeded.
pub fn check_status(response: &Response) -> Option<HttpError> {
	match response.status {
		401 => Some(HttpError::new(401, response.text())),
		200..400 => None,
		400.. => Some(error_from_body(response)),
		status => Some(HttpError::new(status, response.text())),
	}
}

/// Decodes `response` into `destination` according to its content type.
pub fn read_content<T>(
	response: &Response,
	destination: Destination<'_, T>,
) -> Result<(), DecodeError>
where
	T: DeserializeOwned,
{
	let content_type = response.content_type();
	let Some(found) = PayloadKind::from_content_type(content_type) else {
		if response.body.is_empty() {
			return Ok(());
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(content_type, len = response.body.len(), "unknown response content type");

		return Err(DecodeError::UnknownContentType { content_type: content_type.to_owned() });
	};

	match destination.kind() {
		Some(expected) if expected != found =>
			return Err(DecodeError::DestinationMismatch { expected, found }),
		_ => (),
	}

	match destination {
		Destination::Json(slot) => *slot = response.json().map_err(DecodeError::Json)?,
		Destination::Text(slot) => *slot = response.text(),
		Destination::Bytes(slot) => *slot = response.body.clone(),
		Destination::Discard => (),
	}

	Ok(())
}

fn error_from_body(response: &Response) -> HttpError {
	#[derive(Deserialize)]
	struct ErrorBody {
		#[serde(rename = "errorMessage")]
		error_message: Option<Value>,
	}

	match serde_json::from_slice::<ErrorBody>(&response.body) {
		Ok(ErrorBody { error_message: Some(Value::String(message)) }) =>
			HttpError::new(response.status, message),
		_ => HttpError::new(response.status, response.text()),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// crates.io
	use reqwest::header::CONTENT_TYPE;
	// self
	use super::*;

	fn response(status: u16, content_type: Option<&str>, body: &str) -> Response {
		let mut headers = HeaderMap::new();

		if let Some(content_type) = content_type {
			headers.insert(
				CONTENT_TYPE,
				HeaderValue::from_str(content_type).expect("Fixture content type should be valid."),
			);
		}

		Response::new(status, headers, body)
	}

	#[test]
	fn unauthorized_keeps_raw_body() {
		let body = r#"{"errorMessage":"hidden"}"#;
		let err = check_status(&response(401, Some("application/json"), body))
			.expect("401 must be reported as an error.");

		assert_eq!(err, HttpError::new(401, body));
	}

	#[test]
	fn error_status_prefers_error_message_field() {
		let err = check_status(&response(400, Some("text/plain"), r#"{"errorMessage":"bad"}"#))
			.expect("400 must be reported as an error.");

		assert_eq!(err, HttpError::new(400, "bad"));

		let err = check_status(&response(503, None, "maintenance"))
			.expect("503 must be reported as an error.");

		assert_eq!(err, HttpError::new(503, "maintenance"));
		assert!(err.is_server_error());

		let err = check_status(&response(409, None, r#"{"errorMessage":7}"#))
			.expect("409 must be reported as an error.");

		assert_eq!(err.message, r#"{"errorMessage":7}"#);
	}

	#[test]
	fn informational_status_is_an_error_and_redirects_are_not() {
		assert_eq!(check_status(&response(101, None, "")), Some(HttpError::new(101, "")));
		assert_eq!(check_status(&response(204, None, "")), None);
		assert_eq!(check_status(&response(302, None, "")), None);
		assert_eq!(check_status(&response(399, None, "")), None);
		assert_eq!(check_status(&response(400, None, "bad")), Some(HttpError::new(400, "bad")));
	}

	#[test]
	fn content_type_parameters_are_ignored() {
		assert_eq!(
			PayloadKind::from_content_type("application/json; charset=utf-8"),
			Some(PayloadKind::Json)
		);
		assert_eq!(PayloadKind::from_content_type("Text/HTML"), Some(PayloadKind::Text));
		assert_eq!(PayloadKind::from_content_type("text/xml"), Some(PayloadKind::Bytes));
		assert_eq!(PayloadKind::from_content_type(""), None);
	}

	#[test]
	fn decodes_each_payload_kind() {
		let mut text = String::new();

		read_content(&response(200, Some("text/plain"), "hello"), Destination::text(&mut text))
			.expect("Text body should decode.");

		assert_eq!(text, "hello");

		let mut map = HashMap::<String, serde_json::Value>::new();

		read_content(
			&response(200, Some("application/json"), r#"{"a":1}"#),
			Destination::json(&mut map),
		)
		.expect("JSON body should decode.");

		assert_eq!(map["a"], serde_json::json!(1));

		let mut bytes = Vec::new();

		read_content(
			&response(200, Some("application/octet-stream"), "\u{1}raw"),
			Destination::bytes(&mut bytes),
		)
		.expect("Binary body should decode.");

		assert_eq!(bytes, b"\x01raw");
	}

	#[test]
	fn unknown_content_type_fails_only_with_body() {
		let mut text = "unchanged".to_owned();

		read_content(&response(200, Some("application/unknown"), ""), Destination::text(&mut text))
			.expect("Empty body must be accepted.");
		read_content(&response(204, None, ""), Destination::text(&mut text))
			.expect("Missing content type with empty body must be accepted.");

		assert_eq!(text, "unchanged");

		let err = read_content(
			&response(200, Some("application/unknown"), "payload"),
			Destination::text(&mut text),
		)
		.expect_err("Unknown content type with a body must fail.");

		assert!(matches!(
			err,
			DecodeError::UnknownContentType { ref content_type }
				if content_type == "application/unknown"
		));
	}

	#[test]
	fn destination_mismatch_is_reported() {
		let mut bytes = Vec::new();
		let err = read_content(
			&response(200, Some("text/plain"), "hello"),
			Destination::bytes(&mut bytes),
		)
		.expect_err("Text body must not fill a byte destination.");

		assert!(matches!(
			err,
			DecodeError::DestinationMismatch {
				expected: PayloadKind::Bytes,
				found: PayloadKind::Text
			}
		));
		assert!(bytes.is_empty());
	}

	#[test]
	fn invalid_json_is_reported() {
		let mut value = Value::Null;
		let err = read_content(
			&response(200, Some("application/json"), "{"),
			Destination::json(&mut value),
		)
		.expect_err("Truncated JSON must fail.");

		assert!(matches!(err, DecodeError::Json(_)));

		read_content(&response(200, Some("application/json"), "{}"), Destination::<()>::Discard)
			.expect("Discard accepts any known payload.");
	}
}
