//! Protocol error codes and the classifier hook that maps them into semantic kinds.
//!
//! Raw `errcode` values are decoded once, at the response-parsing boundary, so business logic
//! only ever matches on [`ApiErrorKind`].

// self
use crate::_prelude::*;

/// Numeric `errcode` values the crate recognizes by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	/// `-1`: the platform is busy.
	SystemBusy,
	/// `40001`: the bearer token is invalid or was superseded by a newer one.
	InvalidCredential,
	/// `40013`: the application identity is unknown.
	InvalidAppId,
	/// `40014`: the bearer token is malformed.
	InvalidAccessToken,
	/// `40029`: the authorization code is invalid.
	InvalidCode,
	/// `40030`: the refresh token is invalid.
	InvalidRefreshToken,
	/// `40125`: the application secret is wrong.
	InvalidAppSecret,
	/// `40163`: the authorization code was already used.
	CodeUsed,
	/// `42001`: the bearer token expired.
	AccessTokenExpired,
	/// `42002`: the refresh token expired.
	RefreshTokenExpired,
	/// `45009`: the daily call quota is exhausted.
	QuotaExceeded,
	/// Any other code.
	Other(i64),
}
impl ErrorCode {
	/// Returns the numeric wire value.
	pub const fn as_i64(self) -> i64 {
		match self {
			ErrorCode::SystemBusy => -1,
			ErrorCode::InvalidCredential => 40001,
			ErrorCode::InvalidAppId => 40013,
			ErrorCode::InvalidAccessToken => 40014,
			ErrorCode::InvalidCode => 40029,
			ErrorCode::InvalidRefreshToken => 40030,
			ErrorCode::InvalidAppSecret => 40125,
			ErrorCode::CodeUsed => 40163,
			ErrorCode::AccessTokenExpired => 42001,
			ErrorCode::RefreshTokenExpired => 42002,
			ErrorCode::QuotaExceeded => 45009,
			ErrorCode::Other(code) => code,
		}
	}
}
impl From<i64> for ErrorCode {
	fn from(code: i64) -> Self {
		match code {
			-1 => ErrorCode::SystemBusy,
			40001 => ErrorCode::InvalidCredential,
			40013 => ErrorCode::InvalidAppId,
			40014 => ErrorCode::InvalidAccessToken,
			40029 => ErrorCode::InvalidCode,
			40030 => ErrorCode::InvalidRefreshToken,
			40125 => ErrorCode::InvalidAppSecret,
			40163 => ErrorCode::CodeUsed,
			42001 => ErrorCode::AccessTokenExpired,
			42002 => ErrorCode::RefreshTokenExpired,
			45009 => ErrorCode::QuotaExceeded,
			other => ErrorCode::Other(other),
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.as_i64())
	}
}

/// Semantic categories assigned to remote errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
	/// The bound bearer token was rejected; the token guard retries once on this kind.
	InvalidCredential,
	/// The application identity or secret was rejected.
	InvalidClient,
	/// An authorization code or refresh token was rejected.
	InvalidGrant,
	/// The platform asked the caller to come back later.
	Transient,
	/// Anything else; surfaced unchanged.
	Other,
}

/// Context passed to [`ErrorClassifier::classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiErrorContext<'a> {
	/// Label of the endpoint that answered.
	pub endpoint: &'static str,
	/// Decoded `errcode`.
	pub code: ErrorCode,
	/// Remote `errmsg`.
	pub message: &'a str,
	/// HTTP status code, when available.
	pub http_status: Option<u16>,
}

/// Hook mapping remote error envelopes into [`ApiErrorKind`].
pub trait ErrorClassifier: Send + Sync {
	/// Classifies one error envelope.
	fn classify(&self, ctx: &ApiErrorContext<'_>) -> ApiErrorKind;
}

/// Classifier matching the platform's documented codes.
///
/// Only `40001` counts as the invalidation signal. Malformed (`40014`) or expired (`42001`)
/// tokens are reported as [`ApiErrorKind::Other`]; swap in a custom classifier to widen the
/// retry trigger.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorClassifier;
impl ErrorClassifier for DefaultErrorClassifier {
	fn classify(&self, ctx: &ApiErrorContext<'_>) -> ApiErrorKind {
		match ctx.code {
			ErrorCode::InvalidCredential => ApiErrorKind::InvalidCredential,
			ErrorCode::InvalidAppId | ErrorCode::InvalidAppSecret => ApiErrorKind::InvalidClient,
			ErrorCode::InvalidCode
			| ErrorCode::CodeUsed
			| ErrorCode::InvalidRefreshToken
			| ErrorCode::RefreshTokenExpired => ApiErrorKind::InvalidGrant,
			ErrorCode::SystemBusy | ErrorCode::QuotaExceeded => ApiErrorKind::Transient,
			ErrorCode::InvalidAccessToken | ErrorCode::AccessTokenExpired | ErrorCode::Other(_) =>
				ApiErrorKind::Other,
		}
	}
}
