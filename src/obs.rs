//! Optional observability helpers for tenant calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `tenant_broker.call` with the `call` (kind)
//!   and `stage` (call site) fields, plus the events in [`trace_acquired`], [`trace_retry`], and
//!   [`trace_permission_denied`].
//! - Enable `metrics` to increment the `tenant_broker_call_total` counter for every
//!   attempt/success/failure/retry, labeled by `call` + `outcome`.
//!
//! Both features compile to no-ops when disabled. Only identifiers are ever recorded; secrets and
//! bearer values stay out of every field.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Credential exchange for a tenant bearer token.
	Acquire,
	/// Guarded operation dispatched for a tenant.
	Dispatch,
	/// Ticket fetch.
	Ticket,
	/// Authorization-code exchange.
	OAuthExchange,
	/// User token refresh.
	OAuthRefresh,
	/// User profile fetch.
	Profile,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Acquire => "acquire",
			CallKind::Dispatch => "dispatch",
			CallKind::Ticket => "ticket",
			CallKind::OAuthExchange => "oauth_exchange",
			CallKind::OAuthRefresh => "oauth_refresh",
			CallKind::Profile => "profile",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// The invalidation signal triggered the forced re-acquisition.
	Retry,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
		}
	}

	/// Maps a finished result onto [`CallOutcome::Success`] or [`CallOutcome::Failure`].
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(CallKind::OAuthExchange.to_string(), "oauth_exchange");
		assert_eq!(CallOutcome::Retry.to_string(), "retry");
		assert_eq!(CallOutcome::of::<(), ()>(&Ok(())), CallOutcome::Success);
		assert_eq!(CallOutcome::of::<(), ()>(&Err(())), CallOutcome::Failure);
	}
}
