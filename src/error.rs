//! Crate-level error types shared across flows, stores, and the transport boundary.

// self
use crate::{
	_prelude::*,
	auth::{OpenId, TenantId, TicketKind},
	remote::{ApiErrorKind, ErrorCode},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure (token store or tenant resolver).
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Remote API answered with an error envelope.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Tenant identifier was supplied but could not be resolved.
	#[error("No permission for tenant `{tenant}`.")]
	Permission {
		/// Identifier exactly as supplied by the caller.
		tenant: String,
	},
	/// Exchanging the tenant's application credentials for a bearer token failed.
	#[error("Credential exchange failed for tenant `{tenant}`.")]
	CredentialExchange {
		/// Tenant whose credentials were exchanged.
		tenant: TenantId,
		/// Underlying transport, envelope, or decoding failure.
		#[source]
		source: Box<Error>,
	},
	/// An operation received a structurally invalid payload.
	#[error("Invalid parameter: {reason}.")]
	InvalidParam {
		/// Human-readable description of the violation.
		reason: String,
	},
	/// Ticket endpoint returned no ticket.
	#[error("Ticket endpoint returned no {kind} ticket for tenant `{tenant}`.")]
	TicketFetch {
		/// Tenant the ticket was requested for.
		tenant: TenantId,
		/// Requested ticket kind.
		kind: TicketKind,
	},
	/// No user authorization token is stored for the requested user.
	#[error("No OAuth token is stored for user `{openid}` of tenant `{tenant}`.")]
	OAuthTokenMissing {
		/// Tenant the user authorized.
		tenant: TenantId,
		/// User identifier.
		openid: OpenId,
	},
}
impl Error {
	/// Returns `true` when the remote side rejected the bearer token bound to the call.
	pub fn is_invalid_credential(&self) -> bool {
		matches!(self, Self::Api(api) if api.kind == ApiErrorKind::InvalidCredential)
	}

	/// Returns the remote error, if this error carries one.
	pub fn as_api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(api) => Some(api),
			Self::CredentialExchange { source, .. } => source.as_api(),
			_ => None,
		}
	}

	pub(crate) fn invalid_param(reason: impl Into<String>) -> Self {
		Self::InvalidParam { reason: reason.into() }
	}
}

/// Remote error envelope (`errcode` + `errmsg`) decoded at the transport boundary.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Remote API returned error {code}: {message}.")]
pub struct ApiError {
	/// Decoded protocol error code.
	pub code: ErrorCode,
	/// Semantic classification used by the token guard.
	pub kind: ApiErrorKind,
	/// Remote `errmsg`, or an empty string when absent.
	pub message: String,
	/// HTTP status code, when available.
	pub status: Option<u16>,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint path could not be joined onto the configured base URL.
	#[error("Endpoint `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	SerializePayload(#[source] serde_json::Error),
	/// Tenant configuration could not be loaded.
	#[error("Tenant configuration could not be loaded: {message}.")]
	TenantConfig {
		/// Human-readable error payload.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Response bodies that are not the JSON the caller expected.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON for the expected shape.
	#[error("Endpoint `{endpoint}` returned malformed JSON.")]
	Json {
		/// Endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Body decoded but a required field was empty.
	#[error("Endpoint `{endpoint}` returned an empty `{field}`.")]
	EmptyField {
		/// Endpoint label.
		endpoint: &'static str,
		/// Offending field name.
		field: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote API.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a typed error.
	#[error("HTTP client error occurred while calling the remote API: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
