//! Per-call credential context threaded from dispatch through the token guard into operations.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AppId, TenantConfig, TenantId, TokenSecret},
};

/// Credentials bound to exactly one attempt of one dispatched call.
///
/// A context is built from a resolved [`TenantConfig`] plus the token selected for the attempt
/// and is moved into the operation. Nothing on the client holds tenant state, so concurrent
/// calls for different tenants cannot observe each other's credentials.
#[derive(Clone)]
pub struct CallContext {
	tenant: TenantId,
	app_id: AppId,
	app_secret: TokenSecret,
	token: AccessToken,
}
impl CallContext {
	/// Binds `token` to the tenant's credentials.
	pub fn bind(config: &TenantConfig, token: AccessToken) -> Self {
		Self {
			tenant: config.id.clone(),
			app_id: config.app_id.clone(),
			app_secret: config.app_secret.clone(),
			token,
		}
	}

	/// Tenant the call runs for.
	pub fn tenant(&self) -> &TenantId {
		&self.tenant
	}

	/// Application identity of the tenant.
	pub fn app_id(&self) -> &AppId {
		&self.app_id
	}

	/// Application secret of the tenant.
	pub fn app_secret(&self) -> &TokenSecret {
		&self.app_secret
	}

	/// Token record bound to this attempt.
	pub fn token(&self) -> &AccessToken {
		&self.token
	}

	/// Raw bearer value for the `access_token` query parameter.
	pub fn access_token(&self) -> &str {
		self.token.access_token.expose()
	}
}
impl Debug for CallContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallContext")
			.field("tenant", &self.tenant)
			.field("app_id", &self.app_id)
			.field("app_secret", &"<redacted>")
			.field("token", &self.token)
			.finish()
	}
}
