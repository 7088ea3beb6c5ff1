//! Bearer authentication backed by a caller-supplied token callback.
//!
//! The callback runs on every request, right before dispatch, so it can hand out a fresh or
//! cached token as it sees fit. A callback failure aborts the call and is surfaced unchanged as
//! [`Error::Updater`].

// self
use crate::{
	_prelude::*,
	client::{Client, ClientBuilder},
	compose::{self, ContextUpdater, RequestUpdater},
	error::BoxError,
};

impl Client {
	/// Creates a client setting `Authorization: Bearer <token>` from `token_provider` on every
	/// request.
	pub fn bearer_auth<F, E>(base_url: &str, timeout: Duration, token_provider: F) -> Result<Self>
	where
		F: 'static + Send + Sync + Fn() -> Result<String, E>,
		E: Into<BoxError>,
	{
		Client::new(base_url, timeout, [bearer_updater(token_provider)])
	}
}
impl<Ctx> Client<Ctx>
where
	Ctx: 'static + Send + Sync,
{
	/// Creates a client whose token callback receives the client's bound context.
	///
	/// The callback sees `None` until a context is bound through [`Client::with_context`].
	pub fn bearer_auth_with_context<F, E>(
		base_url: &str,
		timeout: Duration,
		token_provider: F,
	) -> Result<Self>
	where
		F: 'static + Send + Sync + Fn(Option<&Ctx>) -> Result<String, E>,
		E: Into<BoxError>,
	{
		ClientBuilder::new(base_url)
			.timeout(timeout)
			.context_updater(bearer_context_updater(token_provider))
			.build()
	}
}

/// Wraps a token callback as a static updater.
pub fn bearer_updater<F, E>(token_provider: F) -> RequestUpdater
where
	F: 'static + Send + Sync + Fn() -> Result<String, E>,
	E: Into<BoxError>,
{
	compose::request_updater(move |req| {
		let token = token_provider().map_err(Error::updater)?;

		Ok(req.set_bearer(&token)?)
	})
}

/// Wraps a context-aware token callback as a context updater.
pub fn bearer_context_updater<Ctx, F, E>(token_provider: F) -> ContextUpdater<Ctx>
where
	F: 'static + Send + Sync + Fn(Option<&Ctx>) -> Result<String, E>,
	E: Into<BoxError>,
{
	compose::context_updater(move |ctx, req| {
		let token = token_provider(ctx).map_err(Error::updater)?;

		Ok(req.set_bearer(&token)?)
	})
}
