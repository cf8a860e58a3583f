//! Tenant credential records resolved before every tenant-scoped call.

// self
use crate::{
	_prelude::*,
	auth::{AppId, IdentifierError, TenantId, TokenSecret},
};

/// Application identity and secret for one hosted account.
///
/// Values are immutable once resolved; the dispatch layer only reads them and copies the
/// fields it needs into a per-call [`CallContext`](crate::context::CallContext).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
	/// Tenant identifier.
	pub id: TenantId,
	/// Application identity used for credential exchange.
	#[serde(alias = "appid")]
	pub app_id: AppId,
	/// Application secret used for credential exchange.
	#[serde(alias = "appsecret", alias = "secret")]
	pub app_secret: TokenSecret,
}
impl TenantConfig {
	/// Validates and assembles a tenant record.
	pub fn new(
		id: impl AsRef<str>,
		app_id: impl AsRef<str>,
		app_secret: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		Ok(Self {
			id: TenantId::new(id)?,
			app_id: AppId::new(app_id)?,
			app_secret: TokenSecret::new(app_secret),
		})
	}
}
impl Debug for TenantConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TenantConfig")
			.field("id", &self.id)
			.field("app_id", &self.app_id)
			.field("app_secret", &"<redacted>")
			.finish()
	}
}
