//! Thread-safe in-memory [`TokenStore`] implementation for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OAuthKey, OAuthToken, TenantId, Ticket, TicketKind},
	store::{Records, StoreFuture, TicketKey, TokenStore},
};

/// Keeps every record in-process behind a [`RwLock`].
///
/// By default records live until replaced. [`MemoryStore::with_expiry_eviction`] makes reads
/// drop records whose `expires_in` has elapsed, so the next call re-acquires.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	records: Arc<RwLock<Records>>,
	evict_expired: bool,
}
impl MemoryStore {
	/// Returns a store that forgets records once their seconds-to-live has elapsed.
	pub fn with_expiry_eviction() -> Self {
		Self { evict_expired: true, ..Default::default() }
	}

	/// Number of cached tenant bearer tokens.
	pub fn token_count(&self) -> usize {
		self.records.read().tokens.len()
	}

	fn read_live<K, V>(
		&self,
		map: &mut HashMap<K, V>,
		key: &K,
		is_expired: impl FnOnce(&V, OffsetDateTime) -> bool,
	) -> Option<V>
	where
		K: Eq + Hash,
		V: Clone,
	{
		let now = OffsetDateTime::now_utc();

		if self.evict_expired && map.get(key).is_some_and(|value| is_expired(value, now)) {
			map.remove(key);

			return None;
		}

		map.get(key).cloned()
	}
}
impl TokenStore for MemoryStore {
	fn get_token<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<AccessToken>> {
		Box::pin(async move {
			let mut guard = self.records.write();

			Ok(self.read_live(&mut guard.tokens, tenant, AccessToken::is_expired_at))
		})
	}

	fn save_token<'a>(&'a self, tenant: &'a TenantId, token: AccessToken) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.records.write().tokens.insert(tenant.to_owned(), token);

			Ok(())
		})
	}

	fn get_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
	) -> StoreFuture<'a, Option<Ticket>> {
		Box::pin(async move {
			let key = TicketKey::new(tenant, kind);
			let mut guard = self.records.write();

			Ok(self.read_live(&mut guard.tickets, &key, Ticket::is_expired_at))
		})
	}

	fn save_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
		ticket: Ticket,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.records.write().tickets.insert(TicketKey::new(tenant, kind), ticket);

			Ok(())
		})
	}

	fn get_oauth_token<'a>(&'a self, key: &'a OAuthKey) -> StoreFuture<'a, Option<OAuthToken>> {
		Box::pin(async move {
			let mut guard = self.records.write();

			Ok(self.read_live(&mut guard.oauth, key, OAuthToken::is_expired_at))
		})
	}

	fn save_oauth_token<'a>(&'a self, key: &'a OAuthKey, token: OAuthToken) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.records.write().oauth.insert(key.to_owned(), token);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::OpenId;

	fn tenant(value: &str) -> TenantId {
		TenantId::new(value).expect("Tenant fixture should be valid.")
	}

	fn stale_token() -> AccessToken {
		AccessToken::new("stale", 60)
			.with_obtained_at(OffsetDateTime::now_utc() - Duration::minutes(5))
	}

	#[tokio::test]
	async fn tokens_are_partitioned_per_tenant() {
		let store = MemoryStore::default();
		let (a, b) = (tenant("a"), tenant("b"));

		store
			.save_token(&a, AccessToken::new("token-a", 7200))
			.await
			.expect("Save should succeed.");

		let cached = store.get_token(&a).await.expect("Read should succeed.");

		assert_eq!(cached.map(|t| t.access_token.expose().to_owned()).as_deref(), Some("token-a"));
		assert!(store.get_token(&b).await.expect("Read should succeed.").is_none());
		assert_eq!(store.token_count(), 1);
	}

	#[tokio::test]
	async fn presence_is_validity_by_default() {
		let store = MemoryStore::default();
		let t = tenant("t1");

		store.save_token(&t, stale_token()).await.expect("Save should succeed.");

		assert!(
			store.get_token(&t).await.expect("Read should succeed.").is_some(),
			"Default store must not judge expiry."
		);
	}

	#[tokio::test]
	async fn eviction_drops_expired_records() {
		let store = MemoryStore::with_expiry_eviction();
		let t = tenant("t1");

		store.save_token(&t, stale_token()).await.expect("Save should succeed.");

		assert!(store.get_token(&t).await.expect("Read should succeed.").is_none());
		assert_eq!(store.token_count(), 0);

		store.save_token(&t, AccessToken::new("fresh", 7200)).await.expect("Save should succeed.");

		assert!(store.get_token(&t).await.expect("Read should succeed.").is_some());
	}

	#[tokio::test]
	async fn tickets_are_keyed_by_kind() {
		let store = MemoryStore::default();
		let t = tenant("t1");

		store
			.save_ticket(&t, TicketKind::Jsapi, Ticket::new(TicketKind::Jsapi, "js", 7200))
			.await
			.expect("Save should succeed.");

		assert!(store.get_ticket(&t, TicketKind::Jsapi).await.expect("Read.").is_some());
		assert!(store.get_ticket(&t, TicketKind::WxCard).await.expect("Read.").is_none());
	}

	#[tokio::test]
	async fn oauth_tokens_are_keyed_by_tenant_and_user() {
		let store = MemoryStore::default();
		let openid = OpenId::new("user-1").expect("OpenId fixture should be valid.");
		let key_a = OAuthKey::new(tenant("a"), openid.clone());
		let key_b = OAuthKey::new(tenant("b"), openid.clone());
		let token = OAuthToken::builder(openid)
			.access_token("user-token")
			.expires_in(7200)
			.build()
			.expect("OAuth token fixture should build.");

		store.save_oauth_token(&key_a, token).await.expect("Save should succeed.");

		assert!(store.get_oauth_token(&key_a).await.expect("Read.").is_some());
		assert!(store.get_oauth_token(&key_b).await.expect("Read.").is_none());
	}
}
