//! Endpoint configuration shared by every flow.
//!
//! [`ApiEndpoints`] holds two validated URLs: the API base every relative endpoint path is
//! joined onto, and the user-authorization page end users are redirected to.

// self
use crate::{_prelude::*, error::ConfigError};

/// Relative path of the credential exchange endpoint.
pub const TOKEN_PATH: &str = "cgi-bin/token";
/// Relative path of the ticket endpoint.
pub const TICKET_PATH: &str = "cgi-bin/ticket/getticket";
/// Relative path of the authorization-code exchange endpoint.
pub const OAUTH_ACCESS_TOKEN_PATH: &str = "sns/oauth2/access_token";
/// Relative path of the user-token refresh endpoint.
pub const OAUTH_REFRESH_TOKEN_PATH: &str = "sns/oauth2/refresh_token";
/// Relative path of the user profile endpoint.
pub const USER_INFO_PATH: &str = "sns/userinfo";

const DEFAULT_BASE: &str = "https://api.weixin.qq.com/";
const DEFAULT_AUTHORIZE: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";

/// Errors raised while constructing or validating endpoints.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EndpointError {
	/// A URL could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	Invalid {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless insecure endpoints are explicitly allowed.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The base URL cannot have paths joined onto it.
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Validated endpoint set consumed by flows.
///
/// Deserialization accepts the same fields as [`ApiEndpointsBuilder`] (all optional) and runs
/// [`ApiEndpointsBuilder::build`], so a configured value is held to the same rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ApiEndpointsConfig")]
pub struct ApiEndpoints {
	/// Base URL (always ending in `/`) that relative endpoint paths are joined onto.
	pub base: Url,
	/// User-authorization page.
	pub authorize: Url,
}
impl ApiEndpoints {
	/// Creates a new builder.
	pub fn builder() -> ApiEndpointsBuilder {
		ApiEndpointsBuilder::default()
	}

	/// Joins a relative path onto [`Self::base`].
	pub fn url(&self, path: &'static str) -> Result<Url, ConfigError> {
		self.base.join(path).map_err(|source| ConfigError::InvalidEndpoint { path, source })
	}
}

/// Builder for [`ApiEndpoints`] values.
#[derive(Debug, Default)]
pub struct ApiEndpointsBuilder {
	/// API base URL; defaults to the public platform host.
	pub base: Option<Url>,
	/// User-authorization page; defaults to the public platform page.
	pub authorize: Option<Url>,
	/// Skips the HTTPS requirement (local mocks and tests).
	pub allow_insecure: bool,
}
impl ApiEndpointsBuilder {
	/// Sets the API base URL.
	pub fn base(mut self, url: Url) -> Self {
		self.base = Some(url);

		self
	}

	/// Sets the user-authorization page.
	pub fn authorize(mut self, url: Url) -> Self {
		self.authorize = Some(url);

		self
	}

	/// Allows plain-HTTP endpoints.
	pub fn allow_insecure(mut self, allow: bool) -> Self {
		self.allow_insecure = allow;

		self
	}

	/// Consumes the builder and validates the resulting endpoints.
	pub fn build(self) -> Result<ApiEndpoints, EndpointError> {
		let mut base = resolve("base", self.base, DEFAULT_BASE)?;
		let authorize = resolve("authorize", self.authorize, DEFAULT_AUTHORIZE)?;

		if base.cannot_be_a_base() {
			return Err(EndpointError::CannotBeABase { endpoint: "base", url: base.to_string() });
		}
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		validate_endpoint("base", &base, self.allow_insecure)?;
		validate_endpoint("authorize", &authorize, self.allow_insecure)?;

		Ok(ApiEndpoints { base, authorize })
	}
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiEndpointsConfig {
	#[serde(default)]
	base: Option<Url>,
	#[serde(default)]
	authorize: Option<Url>,
	#[serde(default)]
	allow_insecure: bool,
}
impl TryFrom<ApiEndpointsConfig> for ApiEndpoints {
	type Error = EndpointError;

	fn try_from(config: ApiEndpointsConfig) -> Result<Self, Self::Error> {
		ApiEndpointsBuilder {
			base: config.base,
			authorize: config.authorize,
			allow_insecure: config.allow_insecure,
		}
		.build()
	}
}

fn resolve(
	name: &'static str,
	configured: Option<Url>,
	default: &str,
) -> Result<Url, EndpointError> {
	match configured {
		Some(url) => Ok(url),
		None =>
			Url::parse(default).map_err(|source| EndpointError::Invalid { endpoint: name, source }),
	}
}

fn validate_endpoint(
	name: &'static str,
	url: &Url,
	allow_insecure: bool,
) -> Result<(), EndpointError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if allow_insecure => Ok(()),
		_ => Err(EndpointError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}
