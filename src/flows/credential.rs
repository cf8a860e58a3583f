//! Tenant lookup and credential exchange.
//!
//! [`Client::acquire_token`] trades a tenant's application identity and secret for a fresh
//! bearer token and persists it. Any failure before persistence is reported as
//! [`Error::CredentialExchange`] and leaves the store untouched.

// self
use crate::{
	_prelude::*,
	api::{ApiRequest, TransportErrorMapper},
	auth::{AccessToken, TenantConfig, TenantId},
	error::DecodeError,
	flows::Client,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	remote::TOKEN_PATH,
};

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	expires_in: u64,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Looks up a tenant's configuration.
	pub async fn resolve_tenant(&self, tenant: &TenantId) -> Result<Option<TenantConfig>> {
		Ok(self.resolver.resolve(tenant).await?)
	}

	/// Exchanges the tenant's credentials for a fresh bearer token and persists it.
	///
	/// The cache is not consulted. Use [`Client::latest_token`] for cached-or-acquired semantics.
	pub async fn acquire_token(&self, config: &TenantConfig) -> Result<AccessToken> {
		self.acquire(config, false).await
	}

	/// Returns the tenant's cached bearer token, acquiring one when the store has none.
	pub async fn latest_token(&self, tenant: &str) -> Result<AccessToken> {
		let config = self.require_tenant(tenant).await?;

		self.cached_or_acquire(&config).await
	}

	/// Resolves `tenant`, treating malformed and unknown ids alike as a permission failure.
	pub(crate) async fn require_tenant(&self, tenant: &str) -> Result<TenantConfig> {
		let resolved = match TenantId::new(tenant) {
			Ok(id) => self.resolve_tenant(&id).await?,
			Err(_) => None,
		};

		resolved.ok_or_else(|| {
			obs::trace_permission_denied(tenant);

			Error::Permission { tenant: tenant.to_owned() }
		})
	}

	pub(crate) async fn cached_or_acquire(&self, config: &TenantConfig) -> Result<AccessToken> {
		match self.store.get_token(&config.id).await? {
			Some(token) => Ok(token),
			None => self.acquire(config, false).await,
		}
	}

	pub(crate) async fn acquire(&self, config: &TenantConfig, forced: bool) -> Result<AccessToken> {
		const KIND: CallKind = CallKind::Acquire;

		let span = CallSpan::new(KIND, "acquire_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token =
					self.exchange_credentials(config).await.map_err(|source| {
						Error::CredentialExchange {
							tenant: config.id.clone(),
							source: Box::new(source),
						}
					})?;

				self.store.save_token(&config.id, token.clone()).await?;
				obs::trace_acquired(&config.id, forced);

				Ok(token)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	async fn exchange_credentials(&self, config: &TenantConfig) -> Result<AccessToken> {
		let request = ApiRequest::get("token", self.url(TOKEN_PATH)?)
			.query("grant_type", "client_credential")
			.query("appid", &config.app_id)
			.query("secret", config.app_secret.expose());
		let response: TokenResponse = self.send(request).await?;

		if response.access_token.is_empty() {
			return Err(DecodeError::EmptyField { endpoint: "token", field: "access_token" }.into());
		}

		Ok(AccessToken::new(response.access_token, response.expires_in))
	}
}
