//! The token guard: bind a token, run the operation, recover once from invalidation.
//!
//! One guarded call moves through these states:
//!
//! ```text
//! NoToken -> Bound (cache hit)         | NoToken -> Acquiring -> Bound
//! Bound -> Invoked -> Delivered        | Bound -> Invoked -> InvalidSignal
//! InvalidSignal -> Acquiring (forced) -> Bound -> Invoked -> Delivered
//! ```
//!
//! The second invocation is terminal whatever it returns. Nothing survives the call except what
//! the store holds.

// self
use crate::{
	_prelude::*,
	api::TransportErrorMapper,
	auth::TenantConfig,
	context::CallContext,
	flows::Client,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs `op` with a bearer token bound into a fresh [`CallContext`].
	///
	/// The token comes from the store when present, otherwise from a credential exchange whose
	/// failure is returned without invoking `op`. When `op` fails with an error classified as
	/// [`ApiErrorKind::InvalidCredential`](crate::remote::ApiErrorKind::InvalidCredential), a new
	/// token is acquired (bypassing the store) and `op` runs exactly once more; that second result
	/// is returned as-is.
	pub async fn with_token<F, Fut, T>(&self, config: &TenantConfig, op: F) -> Result<T>
	where
		F: Fn(CallContext) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		const KIND: CallKind = CallKind::Dispatch;

		let span = CallSpan::new(KIND, "with_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let token = self.cached_or_acquire(config).await?;

				match op(CallContext::bind(config, token)).await {
					Err(e) if e.is_invalid_credential() => {
						obs::trace_retry(&config.id);
						obs::record_call_outcome(KIND, CallOutcome::Retry);

						let token = self.acquire(config, true).await?;

						op(CallContext::bind(config, token)).await
					},
					delivered => delivered,
				}
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}
}
