//! Storage contracts and built-in store implementations for cached credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OAuthKey, OAuthToken, TenantId, Ticket, TicketKind},
};

/// Boxed future returned by every store and resolver method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for tenant bearer tokens, tickets, and user tokens.
///
/// Presence is the validity signal: the client reuses whatever [`TokenStore::get_token`] returns
/// without comparing its lifetime with the clock. Stores that want to honor `expires_in` drop
/// stale records themselves (see [`MemoryStore::with_expiry_eviction`]). Implementations are
/// shared by every in-flight call and own their concurrency safety.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the cached bearer token for `tenant`.
	fn get_token<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<AccessToken>>;

	/// Persists or replaces the bearer token for `tenant`.
	fn save_token<'a>(&'a self, tenant: &'a TenantId, token: AccessToken) -> StoreFuture<'a, ()>;

	/// Fetches the cached ticket of `kind` for `tenant`.
	fn get_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
	) -> StoreFuture<'a, Option<Ticket>>;

	/// Persists or replaces the ticket of `kind` for `tenant`.
	fn save_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
		ticket: Ticket,
	) -> StoreFuture<'a, ()>;

	/// Fetches the user token stored under `key`.
	fn get_oauth_token<'a>(&'a self, key: &'a OAuthKey) -> StoreFuture<'a, Option<OAuthToken>>;

	/// Persists or replaces the user token stored under `key`.
	fn save_oauth_token<'a>(&'a self, key: &'a OAuthKey, token: OAuthToken) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Key identifying a cached ticket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketKey {
	/// Tenant the ticket was issued for.
	pub tenant: TenantId,
	/// Ticket class.
	pub kind: TicketKind,
}
impl TicketKey {
	/// Builds a key for the tenant/kind pair.
	pub fn new(tenant: &TenantId, kind: TicketKind) -> Self {
		Self { tenant: tenant.to_owned(), kind }
	}
}

/// Record maps shared by the built-in stores.
#[derive(Clone, Debug, Default)]
pub(crate) struct Records {
	pub(crate) tokens: HashMap<TenantId, AccessToken>,
	pub(crate) tickets: HashMap<TicketKey, Ticket>,
	pub(crate) oauth: HashMap<OAuthKey, OAuthToken>,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn ticket_keys_distinguish_kinds() {
		let tenant = TenantId::new("t1").expect("Tenant fixture should be valid.");

		assert_ne!(
			TicketKey::new(&tenant, TicketKind::Jsapi),
			TicketKey::new(&tenant, TicketKind::WxCard)
		);
		assert_eq!(TicketKey::new(&tenant, TicketKind::default()).kind, TicketKind::Jsapi);
	}
}
