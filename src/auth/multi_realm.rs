//! Multi-realm OIDC client: fetches a bearer token from a provider before every call.
//!
//! A [`MultiRealmClient`] without a realm asks [`OidcTokenProvider::provide_token`]; a client
//! derived with [`MultiRealmClient::for_realm`] asks
//! [`OidcTokenProvider::provide_token_for_realm`]. The token is appended as the last per-call
//! plugin, so it overrides any `Authorization` header set by earlier plugins. Provider errors are
//! returned as [`Error::Provider`] and nothing is sent.

// self
use crate::{
	_prelude::*,
	client::{Client, RestClient, RestFuture},
	compose::Plugin,
	decode::Destination,
	error::BoxError,
};

/// Boxed future returned by [`OidcTokenProvider`] methods.
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<String, BoxError>> + 'a + Send>>;

/// Source of OIDC access tokens, either for a default realm or for a named one.
///
/// Implementations own caching and refresh; the client calls them once per request and never
/// retries.
pub trait OidcTokenProvider
where
	Self: Send + Sync,
{
	/// Returns a token for the provider's default realm.
	fn provide_token(&self) -> TokenFuture<'_>;

	/// Returns a token for `realm`.
	fn provide_token_for_realm<'a>(&'a self, realm: &'a str) -> TokenFuture<'a>;
}

/// REST client authenticating every call with a token from an [`OidcTokenProvider`].
///
/// Realm-scoped clients share the underlying [`Client`] and provider with their parent.
pub struct MultiRealmClient<P = dyn OidcTokenProvider>
where
	P: ?Sized,
{
	client: Client,
	provider: Arc<P>,
	realm: String,
}
impl<P> MultiRealmClient<P>
where
	P: ?Sized + OidcTokenProvider,
{
	/// Creates a realm-less client for `base_url`.
	pub fn new(base_url: &str, timeout: Duration, provider: Arc<P>) -> Result<Self> {
		Ok(Self::with_client(Client::new(base_url, timeout, [])?, provider))
	}

	/// Wraps an existing [`Client`].
	pub fn with_client(client: Client, provider: Arc<P>) -> Self {
		Self { client, provider, realm: String::new() }
	}

	/// Returns a client sharing this one's base client and provider, scoped to `realm`.
	///
	/// An empty realm selects the provider's default token again.
	pub fn for_realm(&self, realm: impl Into<String>) -> Self {
		Self { client: self.client.clone(), provider: self.provider.clone(), realm: realm.into() }
	}

	/// Realm this client requests tokens for (empty for the default realm).
	pub fn realm(&self) -> &str {
		&self.realm
	}

	/// Underlying base client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Issues a `GET` and decodes the body into `destination`.
	pub async fn get<T>(&self, destination: Destination<'_, T>, plugins: &[Plugin]) -> Result<()>
	where
		T: DeserializeOwned,
	{
		let plugins = self.with_realm_auth(plugins).await?;

		self.client.get(destination, &plugins).await
	}

	/// Issues a `POST`, decodes the body into `destination`, and returns the `Location` header.
	pub async fn post<T>(
		&self,
		destination: Destination<'_, T>,
		plugins: &[Plugin],
	) -> Result<String>
	where
		T: DeserializeOwned,
	{
		let plugins = self.with_realm_auth(plugins).await?;

		self.client.post(destination, &plugins).await
	}

	/// Issues a `PUT`.
	pub async fn put(&self, plugins: &[Plugin]) -> Result<()> {
		let plugins = self.with_realm_auth(plugins).await?;

		self.client.put(&plugins).await
	}

	/// Issues a `DELETE`.
	pub async fn delete(&self, plugins: &[Plugin]) -> Result<()> {
		let plugins = self.with_realm_auth(plugins).await?;

		self.client.delete(&plugins).await
	}

	async fn with_realm_auth(&self, plugins: &[Plugin]) -> Result<Vec<Plugin>> {
		#[cfg(feature = "tracing")]
		tracing::debug!(realm = %self.realm, "requesting token from OIDC provider");

		let token = if self.realm.is_empty() {
			self.provider.provide_token().await
		} else {
			self.provider.provide_token_for_realm(&self.realm).await
		}
		.map_err(Error::Provider)?;
		let mut plugins = plugins.to_vec();

		plugins.push(Plugin::bearer(token));

		Ok(plugins)
	}
}
impl<P> Clone for MultiRealmClient<P>
where
	P: ?Sized,
{
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			provider: self.provider.clone(),
			realm: self.realm.clone(),
		}
	}
}
impl<P> Debug for MultiRealmClient<P>
where
	P: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MultiRealmClient")
			.field("client", &self.client)
			.field("realm", &self.realm)
			.finish()
	}
}
impl<P> RestClient for MultiRealmClient<P>
where
	P: ?Sized + OidcTokenProvider,
{
	fn get<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, ()>
	where
		T: 'a + Send + DeserializeOwned,
	{
		Box::pin(MultiRealmClient::get(self, destination, plugins))
	}

	fn post<'a, T>(
		&'a self,
		destination: Destination<'a, T>,
		plugins: &'a [Plugin],
	) -> RestFuture<'a, String>
	where
		T: 'a + Send + DeserializeOwned,
	{
		Box::pin(MultiRealmClient::post(self, destination, plugins))
	}

	fn put<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()> {
		Box::pin(MultiRealmClient::put(self, plugins))
	}

	fn delete<'a>(&'a self, plugins: &'a [Plugin]) -> RestFuture<'a, ()> {
		Box::pin(MultiRealmClient::delete(self, plugins))
	}
}
