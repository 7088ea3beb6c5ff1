//! Unverified JWT introspection used to route pre-issued access tokens.
//!
//! Nothing in this module checks signatures. The issuer and host pulled out of a token are
//! routing hints only; they must never be used as a trust boundary.

// crates.io
use base64::{
	Engine,
	alphabet::URL_SAFE,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

// JWS segments are unpadded base64url, but some issuers pad them anyway.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while introspecting a bearer token.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// The token is not made of three dot-separated segments.
	#[error("Token must contain 3 segments, found {segments}.")]
	Malformed {
		/// Number of segments found.
		segments: usize,
	},
	/// A segment is not valid base64url.
	#[error("Token {segment} segment is not valid base64url.")]
	InvalidEncoding {
		/// Segment label (`header` or `claims`).
		segment: &'static str,
		/// Underlying decoding failure.
		#[source]
		source: base64::DecodeError,
	},
	/// A segment does not hold a JSON object.
	#[error("Token {segment} segment is not a JSON object.")]
	InvalidJson {
		/// Segment label (`header` or `claims`).
		segment: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// The claims carry no string `iss` value.
	#[error("Token claims carry no string `iss` value.")]
	MissingIssuer,
	/// The issuer is not a URL.
	#[error("Token issuer `{issuer}` is not a valid URL.")]
	InvalidIssuer {
		/// Raw issuer claim.
		issuer: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The issuer URL has no host component.
	#[error("Token issuer `{issuer}` has no host.")]
	IssuerWithoutHost {
		/// Raw issuer claim.
		issuer: String,
	},
}
impl TokenError {
	/// True when the token itself could not be decoded.
	pub fn is_decode(&self) -> bool {
		matches!(
			self,
			Self::Malformed { .. } | Self::InvalidEncoding { .. } | Self::InvalidJson { .. }
		)
	}

	/// True when the token decoded but its issuer could not be parsed into a host.
	pub fn is_parse(&self) -> bool {
		matches!(self, Self::InvalidIssuer { .. } | Self::IssuerWithoutHost { .. })
	}
}

/// JOSE header fields of a token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
	/// Signing algorithm (`alg`).
	#[serde(rename = "alg", default)]
	pub algorithm: Option<String>,
	/// Key identifier (`kid`).
	#[serde(rename = "kid", default)]
	pub key_id: Option<String>,
	/// Token type (`typ`).
	#[serde(rename = "typ", default)]
	pub kind: Option<String>,
	/// Content type (`cty`).
	#[serde(rename = "cty", default)]
	pub content_type: Option<String>,
}

/// Subset of registered claims decoded without verification.
///
/// `aud` is left out on purpose: issuers send it either as a string or an array, and nothing in
/// this crate consumes it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Token {
	/// Decoded JOSE header.
	#[serde(skip)]
	pub header: TokenHeader,
	/// Issuer (`iss`).
	#[serde(rename = "iss", default)]
	pub issuer: Option<String>,
	/// Subject (`sub`).
	#[serde(rename = "sub", default)]
	pub subject: Option<String>,
	/// Expiration time (`exp`).
	#[serde(rename = "exp", default, with = "time::serde::timestamp::option")]
	pub expiration_time: Option<OffsetDateTime>,
	/// Not-before time (`nbf`).
	#[serde(rename = "nbf", default, with = "time::serde::timestamp::option")]
	pub not_before: Option<OffsetDateTime>,
	/// Issued-at time (`iat`).
	#[serde(rename = "iat", default, with = "time::serde::timestamp::option")]
	pub issued_at: Option<OffsetDateTime>,
	/// Token identifier (`jti`).
	#[serde(rename = "jti", default)]
	pub id: Option<String>,
	/// Keycloak-style `preferred_username`.
	#[serde(rename = "preferred_username", default)]
	pub username: Option<String>,
}
impl Token {
	/// Decodes the header and claims of `raw` without checking its signature.
	pub fn decode_unverified(raw: &str) -> Result<Self, TokenError> {
		let [header, claims, _signature] = split_segments(raw)?;
		let header = decode_segment::<TokenHeader>("header", header)?;
		let mut token = decode_segment::<Token>("claims", claims)?;

		token.header = header;

		Ok(token)
	}
}

/// Returns the `iss` claim of `token` without checking its signature.
pub fn extract_issuer(token: &str) -> Result<String, TokenError> {
	let [_header, claims, _signature] = split_segments(token)?;
	let claims = decode_segment::<Map<String, Value>>("claims", claims)?;

	match claims.get("iss") {
		Some(Value::String(issuer)) => Ok(issuer.to_owned()),
		_ => Err(TokenError::MissingIssuer),
	}
}

/// Returns the host (and port, when explicit) of the issuer URL carried by `token`.
pub fn extract_host(token: &str) -> Result<String, TokenError> {
	let issuer = extract_issuer(token)?;
	let url = match Url::parse(&issuer) {
		Ok(url) => url,
		Err(source) => return Err(TokenError::InvalidIssuer { issuer, source }),
	};
	let Some(host) = url.host_str() else {
		return Err(TokenError::IssuerWithoutHost { issuer });
	};

	Ok(match url.port() {
		Some(port) => format!("{host}:{port}"),
		None => host.to_owned(),
	})
}

fn split_segments(raw: &str) -> Result<[&str; 3], TokenError> {
	let segments = raw.split('.').collect::<Vec<_>>();

	<[&str; 3]>::try_from(segments.as_slice())
		.map_err(|_| TokenError::Malformed { segments: segments.len() })
}

fn decode_segment<T>(segment: &'static str, raw: &str) -> Result<T, TokenError>
where
	T: DeserializeOwned,
{
	let bytes = SEGMENT_ENGINE
		.decode(raw)
		.map_err(|source| TokenError::InvalidEncoding { segment, source })?;

	serde_json::from_slice(&bytes).map_err(|source| TokenError::InvalidJson { segment, source })
}
