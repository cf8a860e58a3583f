//! The tenant client and its capability sets.
//!
//! [`Client`] holds only shared collaborators (resolver, store, endpoints, transport, error
//! mapping). Tenant credentials and tokens never live on it; each call binds them into a fresh
//! [`CallContext`](crate::context::CallContext) that is moved into the operation. Capabilities
//! are split across submodules, each contributing its own `impl Client` block:
//!
//! - credential acquisition and tenant lookup,
//! - the token guard with its single retry on invalidation,
//! - the dispatch surface (tenant-scoped, direct, and positional shapes),
//! - tickets,
//! - user authorization.

pub mod dispatch;
pub mod oauth;

mod credential;
mod guard;
mod ticket;

pub use dispatch::*;
pub use oauth::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{self, ApiRequest, TransportErrorMapper},
	http::ApiHttpClient,
	remote::{ApiEndpoints, DefaultErrorClassifier, ErrorClassifier},
	resolver::TenantResolver,
	store::TokenStore,
};
#[cfg(feature = "reqwest")]
use crate::{api::ReqwestTransportErrorMapper, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestTenantClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Multi-tenant client for a token-authenticated remote API.
pub struct Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Tenant configuration lookup.
	pub resolver: Arc<dyn TenantResolver>,
	/// Store holding bearer tokens, tickets, and user tokens.
	pub store: Arc<dyn TokenStore>,
	/// Remote endpoints.
	pub endpoints: ApiEndpoints,
	/// Maps error envelopes into semantic kinds.
	pub classifier: Arc<dyn ErrorClassifier>,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		resolver: Arc<dyn TenantResolver>,
		store: Arc<dyn TokenStore>,
		endpoints: ApiEndpoints,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			resolver,
			store,
			endpoints,
			classifier: Arc::new(DefaultErrorClassifier),
		}
	}

	/// Replaces the error classifier.
	pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
		self.classifier = classifier;

		self
	}

	/// Builds a request URL for a path relative to the API base.
	pub fn url(&self, path: &'static str) -> Result<Url> {
		Ok(self.endpoints.url(path)?)
	}

	/// Executes `request` on the configured transport and decodes the body as `T`.
	pub async fn send<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		api::send(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			self.classifier.as_ref(),
			request,
		)
		.await
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(
		resolver: Arc<dyn TenantResolver>,
		store: Arc<dyn TokenStore>,
		endpoints: ApiEndpoints,
	) -> Self {
		Self::with_http_client(
			resolver,
			store,
			endpoints,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			resolver: self.resolver.clone(),
			store: self.store.clone(),
			endpoints: self.endpoints.clone(),
			classifier: self.classifier.clone(),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client").field("endpoints", &self.endpoints).finish_non_exhaustive()
	}
}
