//! Request composition: per-call plugins, static request-updaters, and context-bound updaters.
//!
//! Every outgoing request is built from the client's base URL and then mutated in a fixed order:
//!
//! 1. per-call [`Plugin`]s, in the order the caller passed them;
//! 2. static [`RequestUpdater`]s, in registration order;
//! 3. [`ContextUpdater`]s, in registration order, each receiving the client's bound context.
//!
//! Later steps overwrite headers set by earlier ones, so a client-level `Authorization` updater
//! wins over a per-call plugin setting the same header. The first failure stops composition and
//! its error is returned unchanged.

// crates.io
use reqwest::header::{AUTHORIZATION, HOST};
// self
use crate::{_prelude::*, error::ComposeError};

/// Client-level mutation applied to every request.
pub type RequestUpdater = Arc<dyn Fn(&mut OutgoingRequest) -> Result<()> + Send + Sync>;

/// Client-level mutation that also receives the client's bound context.
///
/// The context is `None` until a value has been bound through `Client::with_context`.
pub type ContextUpdater<Ctx> =
	Arc<dyn Fn(Option<&Ctx>, &mut OutgoingRequest) -> Result<()> + Send + Sync>;

/// Crate-owned view of a request before it reaches the transport.
#[derive(Clone, Debug)]
pub struct OutgoingRequest {
	/// HTTP verb.
	pub method: Method,
	/// Target URL, query string included.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Host override sent in the `Host` header while the connection still targets `url`.
	///
	/// Only HTTP/1.1 routes on this header. Over HTTP/2 the transport derives `:authority`
	/// from `url`, so the peer sees the base host as authority next to a differing `Host`
	/// header; servers that route on `:authority` ignore the override.
	pub host: Option<String>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout.
	pub timeout: Duration,
}
impl OutgoingRequest {
	/// Creates a bare request for `method` against `url`.
	pub fn new(method: Method, url: Url, timeout: Duration) -> Self {
		Self { method, url, headers: HeaderMap::new(), host: None, body: None, timeout }
	}

	/// Sets (replaces) a header.
	pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ComposeError> {
		let header_name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|source| ComposeError::InvalidHeaderName { name: name.to_owned(), source })?;
		let header_value = HeaderValue::from_str(value)
			.map_err(|source| ComposeError::InvalidHeaderValue { name: name.to_owned(), source })?;

		if header_name == HOST {
			self.host = Some(value.to_owned());
		}

		self.headers.insert(header_name, header_value);

		Ok(())
	}

	/// Sets the `Authorization` header to `Bearer <token>`.
	pub fn set_bearer(&mut self, token: &str) -> Result<(), ComposeError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|source| {
			ComposeError::InvalidHeaderValue { name: AUTHORIZATION.to_string(), source }
		})?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);

		Ok(())
	}

	/// Appends a query parameter, keeping existing ones.
	pub fn add_query(&mut self, key: &str, value: &str) {
		self.url.query_pairs_mut().append_pair(key, value);
	}

	/// Replaces the URL path.
	pub fn set_path(&mut self, path: &str) -> Result<(), ComposeError> {
		let joined = self
			.url
			.join(path)
			.map_err(|source| ComposeError::InvalidPath { path: path.to_owned(), source })?;

		self.url.set_path(joined.path());

		Ok(())
	}

	/// Appends `path` to the current URL path.
	pub fn add_path(&mut self, path: &str) -> Result<(), ComposeError> {
		let base = self.url.path().trim_end_matches('/');
		let suffix = path.trim_start_matches('/');

		self.set_path(&format!("{base}/{suffix}"))
	}

	/// Returns a header value as text, if present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}
}

/// Wraps a closure as a [`RequestUpdater`].
pub fn request_updater<F>(f: F) -> RequestUpdater
where
	F: 'static + Send + Sync + Fn(&mut OutgoingRequest) -> Result<()>,
{
	Arc::new(f)
}

/// Wraps a closure as a [`ContextUpdater`].
pub fn context_updater<Ctx, F>(f: F) -> ContextUpdater<Ctx>
where
	F: 'static + Send + Sync + Fn(Option<&Ctx>, &mut OutgoingRequest) -> Result<()>,
{
	Arc::new(f)
}

/// Per-call request mutation supplied at call time.
///
/// Plugins are cheap to clone and can be reused across calls.
#[derive(Clone)]
pub struct Plugin(RequestUpdater);
impl Plugin {
	/// Wraps an arbitrary mutation.
	pub fn from_fn<F>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&mut OutgoingRequest) -> Result<()>,
	{
		Self(Arc::new(f))
	}

	/// Replaces the request path (`/users/1`); resolved against the base URL.
	pub fn path(path: impl Into<String>) -> Self {
		let path = path.into();

		Self::from_fn(move |req| Ok(req.set_path(&path)?))
	}

	/// Appends a segment to the base URL path.
	pub fn add_path(path: impl Into<String>) -> Self {
		let path = path.into();

		Self::from_fn(move |req| Ok(req.add_path(&path)?))
	}

	/// Appends a query parameter.
	pub fn query(key: impl Into<String>, value: impl Into<String>) -> Self {
		let (key, value) = (key.into(), value.into());

		Self::from_fn(move |req| {
			req.add_query(&key, &value);

			Ok(())
		})
	}

	/// Sets (replaces) a header.
	pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
		let (name, value) = (name.into(), value.into());

		Self::from_fn(move |req| Ok(req.set_header(&name, &value)?))
	}

	/// Sets `Authorization: Bearer <token>`.
	pub fn bearer(token: impl Into<String>) -> Self {
		let token = token.into();

		Self::from_fn(move |req| Ok(req.set_bearer(&token)?))
	}

	/// Sets a raw request body.
	pub fn body(body: impl Into<Vec<u8>>) -> Self {
		let body = body.into();

		Self::from_fn(move |req| {
			req.body = Some(body.clone());

			Ok(())
		})
	}

	/// Sets a `text/plain` body.
	pub fn text(body: impl Into<String>) -> Self {
		let body = body.into();

		Self::from_fn(move |req| {
			req.set_header("content-type", "text/plain")?;
			req.body = Some(body.clone().into_bytes());

			Ok(())
		})
	}

	/// Serializes `value` as an `application/json` body.
	///
	/// Serialization happens eagerly; a failure surfaces when the plugin is applied.
	pub fn json<T>(value: &T) -> Self
	where
		T: ?Sized + Serialize,
	{
		let encoded = serde_json::to_vec(value).map_err(Arc::new);

		Self::from_fn(move |req| match &encoded {
			Ok(body) => {
				req.set_header("content-type", "application/json")?;
				req.body = Some(body.clone());

				Ok(())
			},
			Err(e) => Err(ComposeError::JsonBody(e.clone()).into()),
		})
	}

	/// Applies the plugin to `request`.
	pub fn apply(&self, request: &mut OutgoingRequest) -> Result<()> {
		(self.0)(request)
	}
}
impl Debug for Plugin {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Plugin(..)")
	}
}

/// Builds one query-parameter plugin per `key, value` pair of a flat sequence.
///
/// A trailing key without a value is ignored.
pub fn create_query_plugins<I, S>(params: I) -> Vec<Plugin>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut params = params.into_iter();
	let mut plugins = Vec::new();

	while let (Some(key), Some(value)) = (params.next(), params.next()) {
		plugins.push(Plugin::query(key, value));
	}

	plugins
}

/// Applies plugins, then static updaters, then context updaters to `request`.
pub(crate) fn compose<Ctx>(
	mut request: OutgoingRequest,
	plugins: &[Plugin],
	updaters: &[RequestUpdater],
	context_updaters: &[ContextUpdater<Ctx>],
	context: Option<&Ctx>,
) -> Result<OutgoingRequest> {
	for plugin in plugins {
		plugin.apply(&mut request)?;
	}
	for updater in updaters {
		updater(&mut request)?;
	}
	for updater in context_updaters {
		updater(context, &mut request)?;
	}

	Ok(request)
}
