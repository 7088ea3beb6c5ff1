// self
use crate::{
	_prelude::*,
	client::Client,
	compose::{ContextUpdater, RequestUpdater},
	error::ConfigError,
	http::{HttpTransport, ReqwestTransport},
};

/// Builder for [`Client`] values.
///
/// The base URL is parsed in [`ClientBuilder::build`]; everything else is infallible.
pub struct ClientBuilder<Ctx = ()> {
	/// Raw base URL every request starts from.
	pub base_url: String,
	/// Per-request timeout applied on every verb.
	pub timeout: Duration,
	/// Optional `User-Agent` for the default reqwest transport.
	pub user_agent: Option<String>,
	/// Custom transport; the reqwest transport is used when unset.
	pub transport: Option<Arc<dyn HttpTransport>>,
	/// Static request-updaters, in registration order.
	pub updaters: Vec<RequestUpdater>,
	/// Context-bound request-updaters, in registration order.
	pub context_updaters: Vec<ContextUpdater<Ctx>>,
}
impl<Ctx> ClientBuilder<Ctx>
where
	Ctx: 'static + Send + Sync,
{
	const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

	/// Creates a new builder targeting `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			timeout: Self::DEFAULT_TIMEOUT,
			user_agent: None,
			transport: None,
			updaters: Vec::new(),
			context_updaters: Vec::new(),
		}
	}

	/// Overrides the per-request timeout (defaults to 30 seconds).
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Sets the `User-Agent` of the default transport.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Replaces the default reqwest transport.
	pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Appends a static request-updater.
	pub fn updater(mut self, updater: RequestUpdater) -> Self {
		self.updaters.push(updater);

		self
	}

	/// Appends multiple static request-updaters.
	pub fn updaters<I>(mut self, updaters: I) -> Self
	where
		I: IntoIterator<Item = RequestUpdater>,
	{
		self.updaters.extend(updaters);

		self
	}

	/// Appends a context-bound request-updater.
	pub fn context_updater(mut self, updater: ContextUpdater<Ctx>) -> Self {
		self.context_updaters.push(updater);

		self
	}

	/// Validates the configuration and builds the client.
	pub fn build(self) -> Result<Client<Ctx>> {
		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { url: self.base_url.clone(), source })?;
		let transport = match self.transport {
			Some(transport) => transport,
			None => {
				let mut builder = ReqwestClient::builder();

				if let Some(user_agent) = &self.user_agent {
					builder = builder.user_agent(user_agent);
				}

				Arc::new(ReqwestTransport::with_client(builder.build().map_err(ConfigError::from)?))
			},
		};

		Ok(Client {
			base_url,
			timeout: self.timeout,
			transport,
			updaters: self.updaters.into(),
			context_updaters: self.context_updaters.into(),
			context: None,
		})
	}
}
impl<Ctx> Debug for ClientBuilder<Ctx> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.field("user_agent", &self.user_agent)
			.field("custom_transport", &self.transport.is_some())
			.field("updaters", &self.updaters.len())
			.field("context_updaters", &self.context_updaters.len())
			.finish()
	}
}
