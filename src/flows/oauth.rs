//! User authorization: authorize URLs, code exchange, refresh, and profile lookup.
//!
//! User tokens are stored per `(tenant, openid)`. None of these calls go through the token
//! guard and none retry.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	api::{ApiRequest, TransportErrorMapper},
	auth::{OAuthKey, OAuthScope, OAuthToken, OpenId, TenantConfig, TenantId},
	error::{ConfigError, DecodeError},
	flows::Client,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	remote::{OAUTH_ACCESS_TOKEN_PATH, OAUTH_REFRESH_TOKEN_PATH, USER_INFO_PATH},
};

const STATE_LEN: usize = 16;
const PROFILE_LANG: &str = "zh_CN";

/// Authorize URL plus the state value the redirect handler must see again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Tenant whose application asks for authorization.
	pub tenant: TenantId,
	/// Opaque value round-tripped through the redirect.
	pub state: String,
	/// Where the user lands after authorizing.
	pub redirect_uri: Url,
	/// Requested scopes.
	pub scope: OAuthScope,
	/// URL to send the user to.
	pub authorize_url: Url,
}
impl AuthorizationRequest {
	/// Checks the `state` returned to the redirect handler.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::invalid_param("authorization state mismatch"))
		}
	}
}

/// User profile returned by the profile endpoint.
///
/// Only the identifiers are typed; every other field is kept verbatim in [`UserProfile::extra`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// User identifier within the tenant's application.
	pub openid: OpenId,
	/// Cross-application identifier, when the platform returns one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unionid: Option<String>,
	/// Remaining profile fields.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, JsonValue>,
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
	#[serde(default)]
	access_token: String,
	expires_in: u64,
	#[serde(default)]
	refresh_token: Option<String>,
	openid: OpenId,
	#[serde(default)]
	scope: OAuthScope,
	#[serde(default)]
	unionid: Option<String>,
}
impl OAuthTokenResponse {
	fn into_token(self, endpoint: &'static str, keep_unionid: bool) -> Result<OAuthToken> {
		if self.access_token.is_empty() {
			return Err(DecodeError::EmptyField { endpoint, field: "access_token" }.into());
		}

		let mut builder = OAuthToken::builder(self.openid)
			.access_token(self.access_token)
			.expires_in(self.expires_in)
			.scope(self.scope);

		if let Some(refresh) = self.refresh_token.filter(|value| !value.is_empty()) {
			builder = builder.refresh_token(refresh);
		}
		if let Some(unionid) = self.unionid.filter(|_| keep_unionid) {
			builder = builder.unionid(unionid);
		}

		builder.build().map_err(|e| Error::invalid_param(e.to_string()))
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the URL that sends a user to the tenant's authorization page.
	///
	/// A random alphanumeric state is generated when `state` is `None`.
	pub async fn authorize_url(
		&self,
		tenant: &str,
		redirect_uri: &str,
		scope: OAuthScope,
		state: Option<&str>,
	) -> Result<AuthorizationRequest> {
		let config = self.require_tenant(tenant).await?;
		let redirect_uri =
			Url::parse(redirect_uri).map_err(|source| ConfigError::InvalidRedirect { source })?;
		let state = state.map_or_else(|| random_string(STATE_LEN), str::to_owned);
		let mut authorize_url = self.endpoints.authorize.clone();

		authorize_url
			.query_pairs_mut()
			.append_pair("appid", &config.app_id)
			.append_pair("redirect_uri", redirect_uri.as_str())
			.append_pair("response_type", "code")
			.append_pair("scope", &scope.normalized())
			.append_pair("state", &state);
		authorize_url.set_fragment(Some("wechat_redirect"));

		Ok(AuthorizationRequest { tenant: config.id, state, redirect_uri, scope, authorize_url })
	}

	/// Exchanges an authorization code for a user token and stores it.
	pub async fn exchange_code(&self, tenant: &str, code: &str) -> Result<OAuthToken> {
		const KIND: CallKind = CallKind::OAuthExchange;

		let span = CallSpan::new(KIND, "exchange_code");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let config = self.require_tenant(tenant).await?;
				let request =
					ApiRequest::get("oauth_access_token", self.url(OAUTH_ACCESS_TOKEN_PATH)?)
						.query("appid", &config.app_id)
						.query("secret", config.app_secret.expose())
						.query("code", code)
						.query("grant_type", "authorization_code");
				let response: OAuthTokenResponse = self.send(request).await?;
				let token = response.into_token("oauth_access_token", true)?;

				self.store_user_token(&config, token).await
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Trades a refresh token for a new user token and stores it.
	///
	/// The new record carries a refresh token only when the endpoint returns one.
	pub async fn refresh_oauth_token(
		&self,
		tenant: &str,
		refresh_token: &str,
	) -> Result<OAuthToken> {
		const KIND: CallKind = CallKind::OAuthRefresh;

		let span = CallSpan::new(KIND, "refresh_oauth_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let config = self.require_tenant(tenant).await?;
				let request =
					ApiRequest::get("oauth_refresh_token", self.url(OAUTH_REFRESH_TOKEN_PATH)?)
						.query("appid", &config.app_id)
						.query("grant_type", "refresh_token")
						.query("refresh_token", refresh_token);
				let response: OAuthTokenResponse = self.send(request).await?;
				let token = response.into_token("oauth_refresh_token", false)?;

				self.store_user_token(&config, token).await
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Fetches a user's profile with their stored user token.
	///
	/// Fails with [`Error::OAuthTokenMissing`] when no token is stored; nothing is acquired on
	/// the caller's behalf.
	pub async fn fetch_profile(&self, tenant: &str, openid: &OpenId) -> Result<UserProfile> {
		const KIND: CallKind = CallKind::Profile;

		let span = CallSpan::new(KIND, "fetch_profile");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let config = self.require_tenant(tenant).await?;
				let key = OAuthKey::new(config.id, openid.to_owned());
				let Some(token) = self.store.get_oauth_token(&key).await? else {
					return Err(Error::OAuthTokenMissing { tenant: key.tenant, openid: key.openid });
				};
				let request = ApiRequest::get("userinfo", self.url(USER_INFO_PATH)?)
					.query("access_token", token.access_token.expose())
					.query("openid", &key.openid)
					.query("lang", PROFILE_LANG);

				self.send(request).await
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Returns the stored user token for `(tenant, openid)`, if any.
	pub async fn oauth_token(
		&self,
		tenant: &TenantId,
		openid: &OpenId,
	) -> Result<Option<OAuthToken>> {
		let key = OAuthKey::new(tenant.to_owned(), openid.to_owned());

		Ok(self.store.get_oauth_token(&key).await?)
	}

	async fn store_user_token(
		&self,
		config: &TenantConfig,
		token: OAuthToken,
	) -> Result<OAuthToken> {
		let key = OAuthKey::new(config.id.clone(), token.openid.clone());

		self.store.save_oauth_token(&key, token.clone()).await?;

		Ok(token)
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
