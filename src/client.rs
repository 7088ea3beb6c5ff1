//! Base REST client issuing one request per verb call.
//!
//! Each verb walks the same pipeline. The request is composed from the base URL (see
//! [`crate::compose`]), handed to the [`HttpTransport`], classified by status, and, for `GET`
//! and `POST` only, decoded into the caller's [`Destination`]. Any step may fail and the error is
//! returned to the caller as-is; nothing is retried.

mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	compose::{self, ContextUpdater, OutgoingRequest, Plugin, RequestUpdater},
	decode::{self, Destination},
	http::{HttpTransport, Response},
	obs::{self, CallKind, CallSpan, CallStage},
};

/// Boxed future returned by [`RestClient`] methods.
pub type RestFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Verb surface shared by every client variant.
pub trait RestClient
where
	Self: Send + Sync,
{
	/// Issues a `GET` and decodes the body into `destination`.
	fn get<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, ()>
	where
		T: 'a + Send + DeserializeOwned;

	/// Issues a `POST`, decodes the body into `destination`, and returns the `Location` header.
	fn post<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, String>
	where
		T: 'a + Send + DeserializeOwned;

	/// Issues a `PUT`; the body is never decoded.
	fn put<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()>;

	/// Issues a `DELETE`; the body is never decoded.
	fn delete<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()>;
}

/// REST client bound to a base URL, a transport, and an immutable set of request-updaters.
///
/// `Ctx` is the type of the value handed to context-bound updaters. Deriving a client with
/// [`Client::with_context`] shares the transport and updater lists and only swaps the context,
/// so the original client is never affected.
pub struct Client<Ctx = ()> {
	pub(crate) base_url: Url,
	pub(crate) timeout: Duration,
	pub(crate) transport: Arc<dyn HttpTransport>,
	pub(crate) updaters: Arc<[RequestUpdater]>,
	pub(crate) context_updaters: Arc<[ContextUpdater<Ctx>]>,
	pub(crate) context: Option<Arc<Ctx>>,
}
impl Client {
	/// Creates a client for `base_url` with static request-updaters and the reqwest transport.
	pub fn new<I>(base_url: &str, timeout: Duration, updaters: I) -> Result<Self>
	where
		I: IntoIterator<Item = RequestUpdater>,
	{
		ClientBuilder::new(base_url).timeout(timeout).updaters(updaters).build()
	}

	/// Starts a [`ClientBuilder`] targeting `base_url`.
	///
	/// Use [`ClientBuilder::new`] directly for clients carrying a context type.
	pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
		ClientBuilder::new(base_url)
	}
}
impl<Ctx> Client<Ctx>
where
	Ctx: 'static + Send + Sync,
{
	/// Returns a client sharing this one's configuration but bound to `context`.
	pub fn with_context(&self, context: Ctx) -> Self {
		Self { context: Some(Arc::new(context)), ..self.clone() }
	}

	/// Context handed to context-bound updaters, `None` until one is bound.
	pub fn context(&self) -> Option<&Ctx> {
		self.context.as_deref()
	}

	/// Base URL every request starts from.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Per-request timeout.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Builds the request a verb would send, without dispatching it.
	pub fn compose(&self, method: Method, plugins: &[Plugin]) -> Result<OutgoingRequest> {
		let request = OutgoingRequest::new(method, self.base_url.clone(), self.timeout);

		compose::compose(
			request,
			plugins,
			&self.updaters,
			&self.context_updaters,
			self.context.as_deref(),
		)
	}

	/// Issues a `GET` and decodes the body into `destination`.
	pub async fn get<T>(&self, destination: Destination<'_, T>, plugins: &[Plugin]) -> Result<()>
	where
		T: DeserializeOwned,
	{
		self.call(CallKind::Get, plugins, |response| {
			decode::read_content(&response, destination).map_err(Error::from)
		})
		.await
	}

	/// Issues a `POST`, decodes the body into `destination`, and returns the `Location` header
	/// (empty when absent).
	pub async fn post<T>(
		&self,
		destination: Destination<'_, T>,
		plugins: &[Plugin],
	) -> Result<String>
	where
		T: DeserializeOwned,
	{
		self.call(CallKind::Post, plugins, |response| {
			decode::read_content(&response, destination)?;

			Ok(response.location().to_owned())
		})
		.await
	}

	/// Issues a `PUT`; the body is never decoded.
	pub async fn put(&self, plugins: &[Plugin]) -> Result<()> {
		self.call(CallKind::Put, plugins, |_| Ok(())).await
	}

	/// Issues a `DELETE`; the body is never decoded.
	pub async fn delete(&self, plugins: &[Plugin]) -> Result<()> {
		self.call(CallKind::Delete, plugins, |_| Ok(())).await
	}

	async fn call<R, F>(&self, kind: CallKind, plugins: &[Plugin], on_success: F) -> Result<R>
	where
		F: FnOnce(Response) -> Result<R>,
	{
		let span = CallSpan::new(kind);
		let mut stage = CallStage::Compose;

		obs::record_call_attempt(kind);

		let result = span.instrument(self.run(kind, plugins, on_success, &span, &mut stage)).await;

		obs::record_call_result(kind, stage, &result);

		result
	}

	async fn run<R, F>(
		&self,
		kind: CallKind,
		plugins: &[Plugin],
		on_success: F,
		span: &CallSpan,
		stage: &mut CallStage,
	) -> Result<R>
	where
		F: FnOnce(Response) -> Result<R>,
	{
		let request = self.compose(kind.method(), plugins)?;

		*stage = CallStage::Dispatch;
		span.enter_stage(*stage);

		#[cfg(feature = "tracing")]
		tracing::debug!(url = %request.url, "dispatching request");

		let response = self.transport.execute(request).await?;

		if let Some(e) = decode::check_status(&response) {
			#[cfg(feature = "tracing")]
			tracing::debug!(status = e.status, class = %e.class(), "error status returned");

			return Err(e.into());
		}

		*stage = CallStage::Decode;
		span.enter_stage(*stage);

		on_success(response)
	}
}
impl<Ctx> Clone for Client<Ctx> {
	fn clone(&self) -> Self {
		Self {
			base_url: self.base_url.clone(),
			timeout: self.timeout,
			transport: self.transport.clone(),
			updaters: self.updaters.clone(),
			context_updaters: self.context_updaters.clone(),
			context: self.context.clone(),
		}
	}
}
impl<Ctx> Debug for Client<Ctx> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.base_url.as_str())
			.field("timeout", &self.timeout)
			.field("updaters", &self.updaters.len())
			.field("context_updaters", &self.context_updaters.len())
			.field("context_set", &self.context.is_some())
			.finish()
	}
}
impl<Ctx> RestClient for Client<Ctx>
where
	Ctx: 'static + Send + Sync,
{
	fn get<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, ()>
	where
		T: 'a + Send + DeserializeOwned,
	{
		Box::pin(Client::get(self, destination, plugins))
	}

	fn post<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, String>
	where
		T: 'a + Send + DeserializeOwned,
	{
		Box::pin(Client::post(self, destination, plugins))
	}

	fn put<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()> {
		Box::pin(Client::put(self, plugins))
	}

	fn delete<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()> {
		Box::pin(Client::delete(self, plugins))
	}
}

#[cfg(test)]
pub(crate) mod tests {
	// crates.io
	use parking_lot::Mutex;
	use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
	// self
	use super::*;
	use crate::{compose::request_updater, error::TransportError, http::TransportFuture};

	/// Transport double that records requests and replays a canned response.
	#[derive(Default)]
	pub(crate) struct RecordingTransport {
		pub(crate) requests: Mutex<Vec<OutgoingRequest>>,
		pub(crate) response: Mutex<Option<Response>>,
	}
	impl RecordingTransport {
		pub(crate) fn replying(status: u16, content_type: Option<&str>, body: &str) -> Arc<Self> {
			let mut headers = HeaderMap::new();

			if let Some(content_type) = content_type {
				headers.insert(
					CONTENT_TYPE,
					HeaderValue::from_str(content_type)
						.expect("Fixture content type should be valid."),
				);
			}

			Arc::new(Self {
				requests: Mutex::default(),
				response: Mutex::new(Some(Response::new(status, headers, body))),
			})
		}

		pub(crate) fn last_request(&self) -> OutgoingRequest {
			self.requests.lock().last().cloned().expect("A request should have been recorded.")
		}
	}
	impl HttpTransport for RecordingTransport {
		fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
			self.requests.lock().push(request);

			let response = self.response.lock().clone();

			Box::pin(async move {
				response.ok_or_else(|| TransportError::network("connection refused"))
			})
		}
	}

	fn client_with(transport: Arc<RecordingTransport>) -> Client {
		Client::builder("http://localhost/api/")
			.transport(transport)
			.build()
			.expect("Fixture client should build.")
	}

	#[tokio::test]
	async fn get_decodes_text_into_destination() {
		let transport = RecordingTransport::replying(200, Some("text/plain"), "hello");
		let client = client_with(transport.clone());
		let mut text = String::new();

		client
			.get(Destination::text(&mut text), &[Plugin::path("/sample")])
			.await
			.expect("GET should succeed.");

		assert_eq!(text, "hello");

		let request = transport.last_request();

		assert_eq!(request.method, Method::GET);
		assert_eq!(request.url.as_str(), "http://localhost/sample");
	}

	#[tokio::test]
	async fn post_returns_location_header() {
		let transport = Arc::new(RecordingTransport::default());
		let mut headers = HeaderMap::new();

		headers.insert(LOCATION, HeaderValue::from_static("/items/42"));
		*transport.response.lock() = Some(Response::new(201, headers, ""));

		let client = client_with(transport.clone());
		let location = client
			.post(Destination::discard(), &[Plugin::json(&serde_json::json!({"name": "item"}))])
			.await
			.expect("POST should succeed.");

		assert_eq!(location, "/items/42");
		assert_eq!(
			transport.last_request().body.as_deref(),
			Some(br#"{"name":"item"}"#.as_slice())
		);
	}

	#[tokio::test]
	async fn put_and_delete_never_decode() {
		let transport = RecordingTransport::replying(200, Some("application/unknown"), "ignored");
		let client = client_with(transport.clone());

		client.put(&[Plugin::text("content")]).await.expect("PUT should ignore the body.");
		client.delete(&[]).await.expect("DELETE should ignore the body.");

		assert_eq!(transport.requests.lock().len(), 2);
		assert_eq!(transport.last_request().method, Method::DELETE);
	}

	#[tokio::test]
	async fn transport_failure_is_wrapped() {
		let transport = Arc::new(RecordingTransport::default());
		let client = client_with(transport);
		let err = client.delete(&[]).await.expect_err("Missing response should fail.");

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!(err.to_string(), "Cannot obtain response.");
	}

	#[tokio::test]
	async fn updater_failure_skips_dispatch() {
		let transport = RecordingTransport::replying(204, None, "");
		let client = Client::builder("http://localhost")
			.transport(transport.clone())
			.updater(request_updater(|_| Err(Error::updater("request updater failure"))))
			.build()
			.expect("Fixture client should build.");
		let err = client.put(&[]).await.expect_err("Updater failure should abort the call.");

		assert_eq!(err.to_string(), "request updater failure");
		assert!(transport.requests.lock().is_empty());
	}

	async fn settled_stage(client: &Client, plugins: &[Plugin]) -> (CallStage, &'static str) {
		let span = CallSpan::new(CallKind::Get);
		let mut stage = CallStage::Compose;
		let mut slot = serde_json::Value::Null;
		let result = client
			.run(
				CallKind::Get,
				plugins,
				|response| {
					decode::read_content(&response, Destination::json(&mut slot))
						.map_err(Error::from)
				},
				&span,
				&mut stage,
			)
			.await;

		(stage, obs::failure_reason(&result))
	}

	#[tokio::test]
	async fn call_stage_tracks_where_the_call_settled() {
		let json = RecordingTransport::replying(200, Some("application/json"), "{}");
		let decoded = client_with(json);

		assert_eq!(settled_stage(&decoded, &[]).await, (CallStage::Decode, "none"));

		let mismatch = client_with(RecordingTransport::replying(200, Some("text/plain"), "hi"));

		assert_eq!(settled_stage(&mismatch, &[]).await, (CallStage::Decode, "decode"));

		let missing = client_with(RecordingTransport::replying(
			404,
			Some("application/json"),
			r#"{"errorMessage":"missing"}"#,
		));

		assert_eq!(settled_stage(&missing, &[]).await, (CallStage::Dispatch, "client_error"));

		let refused = client_with(Arc::new(RecordingTransport::default()));

		assert_eq!(settled_stage(&refused, &[]).await, (CallStage::Dispatch, "transport"));

		let rejected = Client::builder("http://localhost")
			.transport(RecordingTransport::replying(204, None, ""))
			.updater(request_updater(|_| Err(Error::updater("request updater failure"))))
			.build()
			.expect("Fixture client should build.");

		assert_eq!(settled_stage(&rejected, &[]).await, (CallStage::Compose, "updater"));
	}

	#[tokio::test]
	async fn with_context_leaves_original_untouched() {
		let transport = RecordingTransport::replying(204, None, "");
		let client = ClientBuilder::<String>::new("http://localhost")
			.transport(transport.clone())
			.context_updater(crate::compose::context_updater(|ctx: Option<&String>, req| {
				Ok(req.set_bearer(ctx.map(String::as_str).unwrap_or("none"))?)
			}))
			.build()
			.expect("Fixture client should build.");
		let derived = client.with_context("ctx1".to_owned());

		derived.delete(&[]).await.expect("Derived DELETE should succeed.");

		assert_eq!(transport.last_request().header(AUTHORIZATION.as_str()), Some("Bearer ctx1"));

		client.delete(&[]).await.expect("Original DELETE should succeed.");

		assert_eq!(transport.last_request().header(AUTHORIZATION.as_str()), Some("Bearer none"));
		assert!(client.context().is_none());
		assert_eq!(derived.context().map(String::as_str), Some("ctx1"));
	}

	#[tokio::test]
	async fn rest_client_trait_delegates_to_verbs() {
		async fn fetch<C>(client: &C) -> Result<String>
		where
			C: RestClient,
		{
			let mut text = String::new();

			client.get(Destination::text(&mut text), &[]).await?;

			Ok(text)
		}

		let transport = RecordingTransport::replying(200, Some("text/html"), "<p>hi</p>");
		let client = client_with(transport);

		assert_eq!(fetch(&client).await.expect("Trait GET should succeed."), "<p>hi</p>");
	}
}
