// crates.io
use httpmock::prelude::*;
// self
use tenant_broker::{
	_preludet::*,
	auth::{OAuthScope, OpenId, TenantId},
	error::ConfigError,
	remote::{ApiErrorKind, ErrorCode},
};

fn openid(value: &str) -> OpenId {
	OpenId::new(value).expect("OpenId fixture should be valid.")
}

fn tenant_id(value: &str) -> TenantId {
	TenantId::new(value).expect("Tenant identifier fixture should be valid.")
}

#[tokio::test]
async fn exchange_code_stores_token_used_by_profile_fetch() {
	let server = MockServer::start_async().await;
	let (client, _store) =
		build_reqwest_test_client(&server.base_url(), [tenant("t1", "A1", "S1")]);
	let exchange_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/oauth2/access_token")
				.query_param("appid", "A1")
				.query_param("secret", "S1")
				.query_param("code", "CODE")
				.query_param("grant_type", "authorization_code");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"user-token","expires_in":7200,"refresh_token":"refresh-1",
				"openid":"o1","scope":"snsapi_userinfo","unionid":"u1"}"#,
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/userinfo")
				.query_param("access_token", "user-token")
				.query_param("openid", "o1")
				.query_param("lang", "zh_CN");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"openid":"o1","nickname":"Ann","unionid":"u1"}"#);
		})
		.await;
	let token = client.exchange_code("t1", "CODE").await.expect("Code exchange should succeed.");

	assert_eq!(token.openid.as_ref(), "o1");
	assert_eq!(token.unionid.as_deref(), Some("u1"));
	assert!(token.scope.contains(OAuthScope::USER_INFO));
	assert_eq!(token.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-1"));

	let stored = client
		.oauth_token(&tenant_id("t1"), &openid("o1"))
		.await
		.expect("Reading the user token should succeed.")
		.expect("The exchanged token should be stored.");

	assert_eq!(stored.access_token.expose(), "user-token");

	let profile =
		client.fetch_profile("t1", &openid("o1")).await.expect("Profile fetch should succeed.");

	assert_eq!(profile.openid.as_ref(), "o1");
	assert_eq!(profile.extra["nickname"], "Ann");

	exchange_mock.assert_calls_async(1).await;
	profile_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn profile_fetch_without_stored_token_fails_without_io() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(
		&server.base_url(),
		[tenant("t1", "A1", "S1"), tenant("t2", "A2", "S2")],
	);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/oauth2/access_token").query_param("appid", "A1");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"user-token","expires_in":7200,"openid":"o1",
				"scope":"snsapi_base"}"#,
			);
		})
		.await;

	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/userinfo");
			then.status(200).header("content-type", "application/json").body(r#"{"openid":"o1"}"#);
		})
		.await;

	client.exchange_code("t1", "CODE").await.expect("Code exchange should succeed.");

	let err = client
		.fetch_profile("t2", &openid("o1"))
		.await
		.expect_err("User tokens must not leak across tenants.");

	assert!(matches!(
		err,
		Error::OAuthTokenMissing { ref tenant, ref openid }
			if tenant.as_ref() == "t2" && openid.as_ref() == "o1"
	));

	profile_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn refresh_keeps_only_returned_refresh_token() {
	let server = MockServer::start_async().await;
	let (client, _store) =
		build_reqwest_test_client(&server.base_url(), [tenant("t1", "A1", "S1")]);
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/oauth2/refresh_token")
				.query_param("appid", "A1")
				.query_param("grant_type", "refresh_token")
				.query_param("refresh_token", "refresh-1");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"user-token-2","expires_in":7200,"openid":"o1",
				"scope":"snsapi_base","unionid":"u1"}"#,
			);
		})
		.await;
	let token = client
		.refresh_oauth_token("t1", "refresh-1")
		.await
		.expect("Refresh should succeed.");

	assert_eq!(token.access_token.expose(), "user-token-2");
	assert!(token.refresh_token.is_none());
	assert!(token.unionid.is_none());

	let stored = client
		.oauth_token(&tenant_id("t1"), &openid("o1"))
		.await
		.expect("Reading the user token should succeed.")
		.expect("The refreshed token should be stored.");

	assert_eq!(stored.access_token.expose(), "user-token-2");

	refresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_code_is_classified_and_not_stored() {
	let server = MockServer::start_async().await;
	let (client, _store) =
		build_reqwest_test_client(&server.base_url(), [tenant("t1", "A1", "S1")]);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/oauth2/access_token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"errcode":40029,"errmsg":"invalid code"}"#);
		})
		.await;

	let err = client.exchange_code("t1", "BAD").await.expect_err("Invalid code should fail.");
	let api = err.as_api().expect("Rejected code should be a remote error.");

	assert_eq!(api.code, ErrorCode::InvalidCode);
	assert_eq!(api.kind, ApiErrorKind::InvalidGrant);
	assert!(!err.is_invalid_credential());
}

#[tokio::test]
async fn authorize_url_carries_tenant_identity_and_state() {
	let server = MockServer::start_async().await;
	let (client, _store) =
		build_reqwest_test_client(&server.base_url(), [tenant("t1", "A1", "S1")]);
	let redirect = "https://app.example.com/callback";
	let request = client
		.authorize_url("t1", redirect, OAuthScope::user_info(), Some("xyz"))
		.await
		.expect("Authorize URL should build.");
	let pairs: Vec<(String, String)> = request.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(request.authorize_url.path(), "/connect/oauth2/authorize");
	assert_eq!(request.authorize_url.fragment(), Some("wechat_redirect"));
	assert_eq!(
		pairs,
		vec![
			("appid".into(), "A1".into()),
			("redirect_uri".into(), redirect.into()),
			("response_type".into(), "code".into()),
			("scope".into(), "snsapi_userinfo".into()),
			("state".into(), "xyz".into()),
		]
	);

	request.validate_state("xyz").expect("Matching state should validate.");

	assert!(request.validate_state("other").is_err());

	let generated = client
		.authorize_url("t1", redirect, OAuthScope::base(), None)
		.await
		.expect("Authorize URL with a generated state should build.");

	assert_eq!(generated.state.len(), 16);
	assert!(generated.state.chars().all(|c| c.is_ascii_alphanumeric()));

	let err = client
		.authorize_url("t1", "not a url", OAuthScope::base(), None)
		.await
		.expect_err("Invalid redirect should fail.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidRedirect { .. })));

	let err = client
		.authorize_url("ghost", redirect, OAuthScope::base(), None)
		.await
		.expect_err("Unknown tenant should fail.");

	assert!(matches!(err, Error::Permission { .. }));
}
