//! Demonstrates tenant-scoped dispatch against a mock platform: the first call acquires and
//! caches a bearer token, the second reuses it, and an unknown tenant is rejected.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use tenant_broker::{
	api::ReqwestTransportErrorMapper,
	auth::TenantConfig,
	error::Error,
	flows::Client,
	http::ReqwestHttpClient,
	remote::ApiEndpoints,
	reqwest,
	resolver::{StaticTenantResolver, TenantResolver},
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token").query_param("appid", "wx-demo");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"demo-access","expires_in":7200}"#);
		})
		.await;
	let update_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/card/update").query_param("access_token", "demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"errcode":0,"errmsg":"ok","send_check":false}"#);
		})
		.await;
	let resolver: Arc<dyn TenantResolver> = Arc::new(StaticTenantResolver::from_configs([
		TenantConfig::new("acme", "wx-demo", "demo-secret")?,
	]));
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let endpoints = ApiEndpoints::builder()
		.base(Url::parse(&server.base_url())?)
		.authorize(Url::parse(&server.url("/connect/oauth2/authorize"))?)
		.allow_insecure(true)
		.build()?;
	let http_client = ReqwestHttpClient::with_client(reqwest::Client::builder().build()?);
	let client = <Client<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
		resolver,
		store,
		endpoints,
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	);
	let payload = json!({ "card_id": "card-1", "base_info": { "title": "Demo" } });

	for _ in 0..2 {
		let response = client
			.dispatch("acme", |ctx| {
				let client = &client;
				let payload = payload.clone();

				async move { client.update_card(ctx, payload).await }
			})
			.await?;

		println!("Card update answered: {response}.");
	}

	match client.dispatch("ghost", |ctx| client.update_card(ctx, json!({}))).await {
		Err(Error::Permission { tenant }) => println!("Tenant `{tenant}` was rejected."),
		other => println!("Unexpected outcome: {other:?}."),
	}

	token_mock.assert_calls_async(1).await;
	update_mock.assert_calls_async(2).await;

	Ok(())
}
