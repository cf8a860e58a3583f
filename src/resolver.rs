//! Tenant configuration lookup.

// std
use std::{fs, path::Path};
// self
use crate::{
	_prelude::*,
	auth::{TenantConfig, TenantId},
	error::ConfigError,
	store::StoreFuture,
};

/// Maps a tenant id to its application credentials.
///
/// No caching contract is implied; the client asks once per dispatched call.
pub trait TenantResolver
where
	Self: Send + Sync,
{
	/// Returns the tenant's configuration, or `None` when the tenant is unknown.
	fn resolve<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<TenantConfig>>;
}

/// Resolver backed by an in-process table.
#[derive(Debug, Default)]
pub struct StaticTenantResolver {
	tenants: RwLock<HashMap<TenantId, TenantConfig>>,
}
impl StaticTenantResolver {
	/// Builds a resolver seeded with `configs`; later duplicates replace earlier ones.
	pub fn from_configs(configs: impl IntoIterator<Item = TenantConfig>) -> Self {
		let tenants = configs.into_iter().map(|config| (config.id.clone(), config)).collect();

		Self { tenants: RwLock::new(tenants) }
	}

	/// Loads a JSON array of tenant configurations.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let bytes = fs::read(path).map_err(|e| ConfigError::TenantConfig {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		Self::from_json_slice(&bytes).map_err(|e| ConfigError::TenantConfig {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	/// Parses a JSON array of tenant configurations.
	pub fn from_json_slice(
		bytes: &[u8],
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(bytes);
		let configs: Vec<TenantConfig> = serde_path_to_error::deserialize(&mut de)?;

		Ok(Self::from_configs(configs))
	}

	/// Adds or replaces a tenant.
	pub fn insert(&self, config: TenantConfig) -> Option<TenantConfig> {
		self.tenants.write().insert(config.id.clone(), config)
	}

	/// Removes a tenant.
	pub fn remove(&self, tenant: &TenantId) -> Option<TenantConfig> {
		self.tenants.write().remove(tenant)
	}
}
impl TenantResolver for StaticTenantResolver {
	fn resolve<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<TenantConfig>> {
		Box::pin(async move { Ok(self.tenants.read().get(tenant).cloned()) })
	}
}
