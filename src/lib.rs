//! Multi-tenant credential dispatch for token-authenticated APIs: resolve tenants, cache bearer
//! tokens per tenant, bind them into per-call contexts, and recover once from invalidated tokens.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod context;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod ops;
pub mod remote;
pub mod resolver;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::ReqwestTransportErrorMapper,
		auth::TenantConfig,
		flows::Client,
		http::ReqwestHttpClient,
		remote::ApiEndpoints,
		resolver::{StaticTenantResolver, TenantResolver},
		store::{MemoryStore, TokenStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Endpoints rooted at a mock server base URL (plain HTTP allowed).
	pub fn test_endpoints(base: &str) -> ApiEndpoints {
		let base = Url::parse(base).expect("Mock server base URL should parse.");
		let authorize = base.join("connect/oauth2/authorize").expect("Authorize URL should join.");

		ApiEndpoints::builder()
			.base(base)
			.authorize(authorize)
			.allow_insecure(true)
			.build()
			.expect("Mock endpoints should validate.")
	}

	/// Constructs a [`Client`] backed by a static resolver seeded with `tenants`, an in-memory
	/// store, and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		base: &str,
		tenants: impl IntoIterator<Item = TenantConfig>,
	) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();

		(build_reqwest_test_client_with_store(base, tenants, store), store_backend)
	}

	/// Same as [`build_reqwest_test_client`] but with a caller-provided store.
	pub fn build_reqwest_test_client_with_store(
		base: &str,
		tenants: impl IntoIterator<Item = TenantConfig>,
		store: Arc<dyn TokenStore>,
	) -> ReqwestTestClient {
		let resolver: Arc<dyn TenantResolver> =
			Arc::new(StaticTenantResolver::from_configs(tenants));

		Client::with_http_client(
			resolver,
			store,
			test_endpoints(base),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds a tenant fixture, panicking on invalid identifiers.
	pub fn tenant(id: &str, app_id: &str, app_secret: &str) -> TenantConfig {
		TenantConfig::new(id, app_id, app_secret).expect("Tenant fixture should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
