//! HTTP Basic authentication.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	client::Client,
	compose::{self, RequestUpdater},
	error::ComposeError,
};

impl Client {
	/// Creates a client sending `Authorization: Basic base64(username:password)` on every request.
	///
	/// The header value is computed once; neither credential is validated.
	pub fn basic_auth(
		base_url: &str,
		timeout: Duration,
		username: &str,
		password: &str,
	) -> Result<Self> {
		Client::new(base_url, timeout, [basic_updater(username, password)?])
	}
}

/// Builds the static updater injecting the `Basic` credentials.
pub fn basic_updater(username: &str, password: &str) -> Result<RequestUpdater> {
	let encoded = STANDARD.encode(format!("{username}:{password}"));
	let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|source| {
		ComposeError::InvalidHeaderValue { name: AUTHORIZATION.to_string(), source }
	})?;

	value.set_sensitive(true);

	Ok(compose::request_updater(move |req| {
		req.headers.insert(AUTHORIZATION, value.clone());

		Ok(())
	}))
}
