//! File-backed [`TokenStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OAuthKey, OAuthToken, TenantId, Ticket, TicketKind},
	store::{Records, StoreError, StoreFuture, TicketKey, TokenStore},
};

/// On-disk layout; maps are flattened into pairs because JSON object keys must be strings.
#[derive(Default, Serialize, Deserialize)]
struct Snapshot {
	#[serde(default)]
	tokens: Vec<(TenantId, AccessToken)>,
	#[serde(default)]
	tickets: Vec<(TicketKey, Ticket)>,
	#[serde(default)]
	oauth: Vec<(OAuthKey, OAuthToken)>,
}
impl From<Snapshot> for Records {
	fn from(snapshot: Snapshot) -> Self {
		Self {
			tokens: snapshot.tokens.into_iter().collect(),
			tickets: snapshot.tickets.into_iter().collect(),
			oauth: snapshot.oauth.into_iter().collect(),
		}
	}
}
impl From<&Records> for Snapshot {
	fn from(records: &Records) -> Self {
		Self {
			tokens: records.tokens.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
			tickets: records.tickets.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
			oauth: records.oauth.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
		}
	}
}

/// Persists every record to a JSON file after each write.
///
/// Reads are served from memory. Writes replace the file through a temporary sibling and a
/// rename so a crash never leaves a half-written snapshot behind.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Records>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let records = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(records)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Records, StoreError> {
		if !path.exists() {
			return Ok(Records::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(Records::default());
		}

		let snapshot: Snapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(snapshot.into())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, records: &Records) -> Result<(), StoreError> {
		let serialized = serde_json::to_vec_pretty(&Snapshot::from(records)).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize snapshot: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Applies `apply` to a staged copy and publishes it only once the snapshot is on disk.
	fn write_with(&self, apply: impl FnOnce(&mut Records)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut staged = guard.clone();

		apply(&mut staged);
		self.persist_locked(&staged)?;
		*guard = staged;

		Ok(())
	}
}
impl TokenStore for FileStore {
	fn get_token<'a>(&'a self, tenant: &'a TenantId) -> StoreFuture<'a, Option<AccessToken>> {
		Box::pin(async move { Ok(self.inner.read().tokens.get(tenant).cloned()) })
	}

	fn save_token<'a>(&'a self, tenant: &'a TenantId, token: AccessToken) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.write_with(|records| {
				records.tokens.insert(tenant.to_owned(), token);
			})
		})
	}

	fn get_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
	) -> StoreFuture<'a, Option<Ticket>> {
		Box::pin(async move {
			Ok(self.inner.read().tickets.get(&TicketKey::new(tenant, kind)).cloned())
		})
	}

	fn save_ticket<'a>(
		&'a self,
		tenant: &'a TenantId,
		kind: TicketKind,
		ticket: Ticket,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.write_with(|records| {
				records.tickets.insert(TicketKey::new(tenant, kind), ticket);
			})
		})
	}

	fn get_oauth_token<'a>(&'a self, key: &'a OAuthKey) -> StoreFuture<'a, Option<OAuthToken>> {
		Box::pin(async move { Ok(self.inner.read().oauth.get(key).cloned()) })
	}

	fn save_oauth_token<'a>(&'a self, key: &'a OAuthKey, token: OAuthToken) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.write_with(|records| {
				records.oauth.insert(key.to_owned(), token);
			})
		})
	}
}
