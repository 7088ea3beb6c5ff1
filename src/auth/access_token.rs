//! Per-call plugin forwarding a pre-issued access token.
//!
//! The token's issuer names the host the request is routed to: the request keeps connecting to
//! the client's base URL, but its `Host` header is rewritten to the issuer host and
//! `X-Forwarded-Proto: https` is added. The token is introspected without signature checks.

// crates.io
use reqwest::header::HOST;
// self
use crate::{
	_prelude::*,
	compose::{OutgoingRequest, Plugin},
	token::{self, TokenError},
};

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

impl Plugin {
	/// Builds the access-token plugin, failing up front when no host can be derived.
	pub fn try_access_token(token: impl Into<String>) -> Result<Self, TokenError> {
		let token = token.into();
		let host = token::extract_host(&token)?;

		Ok(Self::from_fn(move |req| forward(req, &token, &host)))
	}

	/// Builds the access-token plugin, deferring introspection to the call.
	///
	/// A token whose host cannot be derived makes every call using the plugin fail with
	/// [`Error::Token`] before anything is sent.
	pub fn access_token(token: impl Into<String>) -> Self {
		let token = token.into();

		Self::from_fn(move |req| {
			let host = token::extract_host(&token)?;

			forward(req, &token, &host)
		})
	}
}

fn forward(req: &mut OutgoingRequest, token: &str, host: &str) -> Result<()> {
	req.set_bearer(token)?;
	req.headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
	req.set_header(HOST.as_str(), host)?;

	Ok(())
}
