// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use httpmock::prelude::*;
// self
use tenant_broker::{
	_preludet::*,
	auth::{AccessToken, TenantId},
	store::{FileStore, MemoryStore, TokenStore},
};

fn tenant_id(value: &str) -> TenantId {
	TenantId::new(value).expect("Tenant identifier fixture should be valid.")
}

fn snapshot_path(label: &str) -> PathBuf {
	env::temp_dir().join(format!(
		"tenant_broker_store_it_{label}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	))
}

#[tokio::test]
async fn file_store_shares_tokens_across_client_restarts() {
	let server = MockServer::start_async().await;
	let path = snapshot_path("restart");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token").query_param("appid", "A1");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"persisted","expires_in":7200}"#);
		})
		.await;

	for _ in 0..2 {
		let store: Arc<dyn TokenStore> =
			Arc::new(FileStore::open(&path).expect("File store should open."));
		let client = build_reqwest_test_client_with_store(
			&server.base_url(),
			[tenant("t1", "A1", "S1")],
			store,
		);
		let token = client.latest_token("t1").await.expect("Token lookup should succeed.");

		assert_eq!(token.access_token.expose(), "persisted");
	}

	token_mock.assert_calls_async(1).await;

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn expiry_eviction_store_reacquires_stale_tokens() {
	let server = MockServer::start_async().await;
	let backend = Arc::new(MemoryStore::with_expiry_eviction());
	let store: Arc<dyn TokenStore> = backend.clone();
	let client =
		build_reqwest_test_client_with_store(&server.base_url(), [tenant("t1", "A1", "S1")], store);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh","expires_in":7200}"#);
		})
		.await;
	let stale = AccessToken::new("stale", 60)
		.with_obtained_at(OffsetDateTime::now_utc() - Duration::hours(1));

	backend.save_token(&tenant_id("t1"), stale).await.expect("Seeding the store should succeed.");

	let token = client.latest_token("t1").await.expect("Token lookup should succeed.");

	assert_eq!(token.access_token.expose(), "fresh");
	assert_eq!(backend.token_count(), 1);

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn default_memory_store_trusts_stored_tokens() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url(), [tenant("t1", "A1", "S1")]);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh","expires_in":7200}"#);
		})
		.await;
	let stale = AccessToken::new("stale", 60)
		.with_obtained_at(OffsetDateTime::now_utc() - Duration::hours(1));

	store.save_token(&tenant_id("t1"), stale).await.expect("Seeding the store should succeed.");

	let token = client.latest_token("t1").await.expect("Token lookup should succeed.");

	assert_eq!(token.access_token.expose(), "stale");

	token_mock.assert_calls_async(0).await;
}
