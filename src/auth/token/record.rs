//! Cached bearer tokens, tickets, and user-authorization token records.
//!
//! Every record keeps the remote `expires_in` value as a relative seconds-to-live together
//! with the instant it was obtained. The dispatch layer never compares either against the
//! clock; store implementations may use [`AccessToken::is_expired_at`] and friends to decide
//! whether a record is still present.

// self
use crate::{
	_prelude::*,
	auth::{OAuthScope, OpenId, TenantId, token::secret::TokenSecret},
};

/// Errors produced by [`OAuthTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum OAuthTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no `expires_in` was provided.
	#[error("Expiry must be supplied via expires_in.")]
	MissingExpiry,
}

/// Tenant-level bearer token obtained through credential exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer token appended to outbound calls.
	pub access_token: TokenSecret,
	/// Seconds-to-live reported by the credential exchange.
	pub expires_in: u64,
	/// Instant the token was received.
	pub obtained_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token stamped with the current clock.
	pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			expires_in,
			obtained_at: OffsetDateTime::now_utc(),
		}
	}

	/// Overrides the obtained-at instant.
	pub fn with_obtained_at(mut self, instant: OffsetDateTime) -> Self {
		self.obtained_at = instant;

		self
	}

	/// Instant after which the remote side stops honoring the token.
	pub fn expires_at(&self) -> OffsetDateTime {
		deadline(self.obtained_at, self.expires_in)
	}

	/// Returns `true` when the token outlived its seconds-to-live at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("obtained_at", &self.obtained_at)
			.finish()
	}
}

/// Ticket classes issued by the ticket endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
	/// Ticket used to sign web page SDK configuration.
	#[default]
	Jsapi,
	/// Ticket used by card APIs.
	WxCard,
}
impl TicketKind {
	/// Returns the `type` query value understood by the remote API.
	pub const fn as_str(self) -> &'static str {
		match self {
			TicketKind::Jsapi => "jsapi",
			TicketKind::WxCard => "wx_card",
		}
	}
}
impl Display for TicketKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Cached ticket scoped by tenant and [`TicketKind`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
	/// Ticket class.
	pub kind: TicketKind,
	/// Ticket value.
	pub ticket: TokenSecret,
	/// Seconds-to-live reported by the ticket endpoint.
	pub expires_in: u64,
	/// Instant the ticket was received.
	pub obtained_at: OffsetDateTime,
}
impl Ticket {
	/// Creates a ticket stamped with the current clock.
	pub fn new(kind: TicketKind, ticket: impl Into<String>, expires_in: u64) -> Self {
		Self {
			kind,
			ticket: TokenSecret::new(ticket),
			expires_in,
			obtained_at: OffsetDateTime::now_utc(),
		}
	}

	/// Returns `true` when the ticket outlived its seconds-to-live at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= deadline(self.obtained_at, self.expires_in)
	}
}
impl Debug for Ticket {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Ticket")
			.field("kind", &self.kind)
			.field("ticket", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("obtained_at", &self.obtained_at)
			.finish()
	}
}

/// Key for stored user-authorization tokens.
///
/// Tokens are partitioned per tenant so two hosted accounts that happen to see the same user
/// identifier never share a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OAuthKey {
	/// Tenant whose application the user authorized.
	pub tenant: TenantId,
	/// User identifier within that application.
	pub openid: OpenId,
}
impl OAuthKey {
	/// Builds a key for the tenant/user pair.
	pub fn new(tenant: TenantId, openid: OpenId) -> Self {
		Self { tenant, openid }
	}
}

/// User-scoped token obtained through authorization-code exchange or refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
	/// User-scoped bearer token.
	pub access_token: TokenSecret,
	/// Seconds-to-live reported by the endpoint.
	pub expires_in: u64,
	/// Refresh secret, when the endpoint supplied one.
	pub refresh_token: Option<TokenSecret>,
	/// User identifier the token belongs to.
	pub openid: OpenId,
	/// Granted scopes.
	pub scope: OAuthScope,
	/// Cross-application user identifier, when the endpoint supplied one.
	pub unionid: Option<String>,
	/// Instant the token was received.
	pub obtained_at: OffsetDateTime,
}
impl OAuthToken {
	/// Returns a builder for the provided user.
	pub fn builder(openid: OpenId) -> OAuthTokenBuilder {
		OAuthTokenBuilder::new(openid)
	}

	/// Returns `true` when the token outlived its seconds-to-live at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= deadline(self.obtained_at, self.expires_in)
	}
}
impl Debug for OAuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthToken")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("openid", &self.openid)
			.field("scope", &self.scope)
			.field("unionid", &self.unionid)
			.field("obtained_at", &self.obtained_at)
			.finish()
	}
}

/// Builder for [`OAuthToken`].
#[derive(Clone, Debug)]
pub struct OAuthTokenBuilder {
	openid: OpenId,
	access_token: Option<TokenSecret>,
	expires_in: Option<u64>,
	refresh_token: Option<TokenSecret>,
	scope: OAuthScope,
	unionid: Option<String>,
	obtained_at: Option<OffsetDateTime>,
}
impl OAuthTokenBuilder {
	fn new(openid: OpenId) -> Self {
		Self {
			openid,
			access_token: None,
			expires_in: None,
			refresh_token: None,
			scope: OAuthScope::default(),
			unionid: None,
			obtained_at: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the relative seconds-to-live.
	pub fn expires_in(mut self, seconds: u64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: OAuthScope) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the cross-application user identifier.
	pub fn unionid(mut self, unionid: impl Into<String>) -> Self {
		self.unionid = Some(unionid.into());

		self
	}

	/// Sets the obtained-at instant (defaults to the current clock).
	pub fn obtained_at(mut self, instant: OffsetDateTime) -> Self {
		self.obtained_at = Some(instant);

		self
	}

	/// Consumes the builder and produces an [`OAuthToken`].
	pub fn build(self) -> Result<OAuthToken, OAuthTokenBuilderError> {
		let access_token = self.access_token.ok_or(OAuthTokenBuilderError::MissingAccessToken)?;
		let expires_in = self.expires_in.ok_or(OAuthTokenBuilderError::MissingExpiry)?;

		Ok(OAuthToken {
			access_token,
			expires_in,
			refresh_token: self.refresh_token,
			openid: self.openid,
			scope: self.scope,
			unionid: self.unionid,
			obtained_at: self.obtained_at.unwrap_or_else(OffsetDateTime::now_utc),
		})
	}
}

fn deadline(obtained_at: OffsetDateTime, expires_in: u64) -> OffsetDateTime {
	let ttl = i64::try_from(expires_in).unwrap_or(i64::MAX);

	obtained_at.saturating_add(Duration::seconds(ttl))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn access_token_deadline_is_relative_to_obtained_at() {
		let token = AccessToken::new("bearer", 7200)
			.with_obtained_at(macros::datetime!(2025-01-01 00:00 UTC));

		assert_eq!(token.expires_at(), macros::datetime!(2025-01-01 02:00 UTC));
		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 01:59 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 02:00 UTC)));
	}

	#[test]
	fn oversized_ttl_saturates() {
		let token = AccessToken::new("bearer", u64::MAX);

		assert!(!token.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn oauth_builder_requires_token_and_expiry() {
		let openid = OpenId::new("o-user-1").expect("OpenId fixture should be valid.");
		let err = OAuthToken::builder(openid.clone())
			.expires_in(7200)
			.build()
			.expect_err("Builder should reject a missing access token.");

		assert_eq!(err, OAuthTokenBuilderError::MissingAccessToken);

		let err = OAuthToken::builder(openid.clone())
			.access_token("user-token")
			.build()
			.expect_err("Builder should reject a missing expiry.");

		assert_eq!(err, OAuthTokenBuilderError::MissingExpiry);

		let token = OAuthToken::builder(openid)
			.access_token("user-token")
			.expires_in(7200)
			.scope(OAuthScope::user_info())
			.build()
			.expect("Builder should succeed with required fields.");

		assert!(token.refresh_token.is_none());
		assert!(token.unionid.is_none());
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let openid = OpenId::new("o-user-2").expect("OpenId fixture should be valid.");
		let token = OAuthToken::builder(openid)
			.access_token("user-token-secret")
			.refresh_token("refresh-secret")
			.expires_in(60)
			.build()
			.expect("Builder should succeed.");
		let ticket = Ticket::new(TicketKind::Jsapi, "ticket-secret", 60);
		let rendered = format!("{token:?} {ticket:?}");

		assert!(!rendered.contains("user-token-secret"));
		assert!(!rendered.contains("refresh-secret"));
		assert!(!rendered.contains("ticket-secret"));
	}

	#[test]
	fn records_round_trip_through_json() {
		let token = AccessToken::new("bearer", 7200);
		let json = serde_json::to_string(&token).expect("Access token should serialize.");
		let back: AccessToken = serde_json::from_str(&json).expect("Access token should parse.");

		assert_eq!(back.access_token.expose(), "bearer");
		assert_eq!(back.expires_in, 7200);
		assert_eq!(TicketKind::WxCard.as_str(), "wx_card");
	}
}
